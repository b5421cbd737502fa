use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::EnergyValuationError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::EnergyValuationResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Input for the discounted valuation of a simulated cash-flow path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationInput {
    /// Undiscounted net cash flow per year (index 0 = year 1)
    pub net_flows: Vec<Money>,
    /// Discounted net cash flow per year, same length and order
    pub discounted_flows: Vec<Money>,
    /// Initial investment paid at time 0; not discounted further
    pub investment: Money,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Payback outcome. "Not recovered" is a valid business result within the
/// horizon, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaybackPeriod {
    /// Cumulative undiscounted net flow first exceeded the investment in
    /// this year (1-based)
    Recovered { year: u32 },
    /// Cumulative net flow never exceeded the investment within the horizon
    NotRecovered,
}

/// Discounted valuation of a project cash-flow path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationOutput {
    /// Net Present Value = −investment + Σ discounted flows
    pub npv: Money,
    /// Years until cumulative undiscounted net flow exceeds the investment
    pub payback: PaybackPeriod,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compute NPV and payback period for a simulated net-flow path.
///
/// NPV is taken over the discounted flows; the payback search runs over the
/// UNDISCOUNTED cumulative net flow. The asymmetry is deliberate: NPV
/// answers what the project is worth, payback answers when the cash outlay
/// is recovered.
pub fn evaluate_project(
    input: &ValuationInput,
) -> EnergyValuationResult<ComputationOutput<ValuationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let npv = -input.investment + input.discounted_flows.iter().sum::<Money>();

    let mut cumulative = 0.0_f64;
    let mut payback = PaybackPeriod::NotRecovered;
    for (i, flow) in input.net_flows.iter().enumerate() {
        cumulative += flow;
        if cumulative > input.investment {
            payback = PaybackPeriod::Recovered {
                year: (i + 1) as u32,
            };
            break;
        }
    }

    if npv < 0.0 {
        warnings.push(format!(
            "Negative NPV of {npv:.2} — the project destroys value at this discount rate"
        ));
    }
    if payback == PaybackPeriod::NotRecovered {
        warnings.push(format!(
            "Investment of {} is not recovered within the {}-year horizon",
            input.investment,
            input.net_flows.len()
        ));
    }

    let output = ValuationOutput { npv, payback };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Discounted Cash-Flow Valuation (NPV + Payback)",
        &serde_json::json!({
            "investment": input.investment,
            "horizon_years": input.net_flows.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate the valuation input.
///
/// A zero investment is accepted: with no outlay, the first positive flow
/// recovers it immediately. Only negative investments are rejected.
fn validate_input(input: &ValuationInput) -> EnergyValuationResult<()> {
    if input.net_flows.is_empty() {
        return Err(EnergyValuationError::InvalidParameter {
            field: "net_flows".into(),
            reason: "At least one cash flow is required".into(),
        });
    }

    if input.net_flows.len() != input.discounted_flows.len() {
        return Err(EnergyValuationError::InvalidParameter {
            field: "discounted_flows".into(),
            reason: format!(
                "Discounted series length ({}) does not match net-flow length ({})",
                input.discounted_flows.len(),
                input.net_flows.len()
            ),
        });
    }

    if input.investment < 0.0 || !input.investment.is_finite() {
        return Err(EnergyValuationError::InvalidParameter {
            field: "investment".into(),
            reason: "Investment must be a non-negative finite number".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: the flat 3-year solar example (324 net per year at 10%).
    fn flat_example() -> ValuationInput {
        ValuationInput {
            net_flows: vec![324.0, 324.0, 324.0],
            discounted_flows: vec![324.0 / 1.1, 324.0 / 1.21, 324.0 / 1.331],
            investment: 80.0,
        }
    }

    #[test]
    fn test_worked_example_npv() {
        let result = evaluate_project(&flat_example()).unwrap();
        let expected = -80.0 + 324.0 / 1.1 + 324.0 / 1.21 + 324.0 / 1.331;
        assert!((result.result.npv - expected).abs() < 1e-9);
    }

    #[test]
    fn test_worked_example_payback_year_one() {
        let result = evaluate_project(&flat_example()).unwrap();
        // 324 > 80 already in year 1
        assert_eq!(result.result.payback, PaybackPeriod::Recovered { year: 1 });
    }

    #[test]
    fn test_payback_accumulates_across_years() {
        let input = ValuationInput {
            net_flows: vec![40.0, 40.0, 40.0],
            discounted_flows: vec![40.0 / 1.1, 40.0 / 1.21, 40.0 / 1.331],
            investment: 100.0,
        };
        let result = evaluate_project(&input).unwrap();
        // Cumulative: 40, 80, 120 — first exceeds 100 in year 3
        assert_eq!(result.result.payback, PaybackPeriod::Recovered { year: 3 });
    }

    #[test]
    fn test_payback_uses_undiscounted_flows() {
        // Discounted cumulative never reaches 110, undiscounted does in year 3.
        let input = ValuationInput {
            net_flows: vec![40.0, 40.0, 40.0],
            discounted_flows: vec![30.0, 25.0, 20.0],
            investment: 110.0,
        };
        let result = evaluate_project(&input).unwrap();
        assert_eq!(result.result.payback, PaybackPeriod::Recovered { year: 3 });
    }

    #[test]
    fn test_not_recovered_is_a_result_not_an_error() {
        let input = ValuationInput {
            net_flows: vec![10.0, 10.0, 10.0],
            discounted_flows: vec![10.0 / 1.1, 10.0 / 1.21, 10.0 / 1.331],
            investment: 100.0,
        };
        let result = evaluate_project(&input).unwrap();
        assert_eq!(result.result.payback, PaybackPeriod::NotRecovered);
        // NPV is still computed and returned
        let expected = -100.0 + 10.0 / 1.1 + 10.0 / 1.21 + 10.0 / 1.331;
        assert!((result.result.npv - expected).abs() < 1e-9);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("not recovered")));
    }

    #[test]
    fn test_zero_investment_pays_back_in_year_one() {
        let input = ValuationInput {
            net_flows: vec![5.0, 5.0],
            discounted_flows: vec![5.0 / 1.1, 5.0 / 1.21],
            investment: 0.0,
        };
        let result = evaluate_project(&input).unwrap();
        assert_eq!(result.result.payback, PaybackPeriod::Recovered { year: 1 });
    }

    #[test]
    fn test_flow_exactly_equal_to_investment_does_not_recover() {
        // Payback requires strictly exceeding the investment.
        let input = ValuationInput {
            net_flows: vec![100.0],
            discounted_flows: vec![100.0 / 1.1],
            investment: 100.0,
        };
        let result = evaluate_project(&input).unwrap();
        assert_eq!(result.result.payback, PaybackPeriod::NotRecovered);
    }

    #[test]
    fn test_negative_npv_warns() {
        let input = ValuationInput {
            net_flows: vec![10.0],
            discounted_flows: vec![10.0 / 1.1],
            investment: 50.0,
        };
        let result = evaluate_project(&input).unwrap();
        assert!(result.result.npv < 0.0);
        assert!(result.warnings.iter().any(|w| w.contains("Negative NPV")));
    }

    #[test]
    fn test_negative_investment_rejected() {
        let mut input = flat_example();
        input.investment = -10.0;
        let result = evaluate_project(&input);
        assert!(result.is_err());
        match result.unwrap_err() {
            EnergyValuationError::InvalidParameter { field, .. } => {
                assert_eq!(field, "investment");
            }
            other => panic!("Expected InvalidParameter, got: {other:?}"),
        }
    }

    #[test]
    fn test_empty_flows_rejected() {
        let input = ValuationInput {
            net_flows: vec![],
            discounted_flows: vec![],
            investment: 10.0,
        };
        assert!(evaluate_project(&input).is_err());
    }

    #[test]
    fn test_mismatched_series_lengths_rejected() {
        let input = ValuationInput {
            net_flows: vec![10.0, 10.0],
            discounted_flows: vec![9.0],
            investment: 10.0,
        };
        assert!(evaluate_project(&input).is_err());
    }

    #[test]
    fn test_simulated_flat_project_end_to_end() {
        use crate::simulation::{simulate_cash_flows, SimulationInput};
        use crate::types::ParameterSet;

        let simulated = simulate_cash_flows(&SimulationInput {
            parameters: ParameterSet {
                investment: 80.0,
                horizon_years: 3,
                discount_rate: 0.10,
                base_production: 12.0,
                base_price: 45.0,
                growth_rate: 0.0,
                price_volatility: 0.0,
            },
            seed: None,
        })
        .unwrap();

        let result = evaluate_project(&ValuationInput {
            net_flows: simulated.result.net_flows(),
            discounted_flows: simulated.result.discounted_flows(),
            investment: 80.0,
        })
        .unwrap();

        let expected = -80.0 + 324.0 / 1.1 + 324.0 / 1.21 + 324.0 / 1.331;
        assert!((result.result.npv - expected).abs() < 1e-6);
        assert_eq!(result.result.payback, PaybackPeriod::Recovered { year: 1 });
    }

    #[test]
    fn test_payback_serializes_with_status_tag() {
        let recovered = serde_json::to_value(PaybackPeriod::Recovered { year: 3 }).unwrap();
        assert_eq!(recovered["status"], "recovered");
        assert_eq!(recovered["year"], 3);

        let not_recovered = serde_json::to_value(PaybackPeriod::NotRecovered).unwrap();
        assert_eq!(not_recovered["status"], "not_recovered");
    }
}
