use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::Uniform;
use std::time::Instant;

use crate::error::EnergyValuationError;
use crate::types::{with_metadata, ComputationOutput, Money, ParameterSet, Rate};
use crate::EnergyValuationResult;

/// Operating costs are modeled as a fixed share of revenue. A flat-ratio
/// simplification; no cost structure beyond this is modeled.
pub const COST_RATIO: Rate = 0.40;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Top-level input for the cash-flow simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    /// Economic and production assumptions
    pub parameters: ParameterSet,
    /// Optional seed for reproducibility. Without a seed the price path is
    /// drawn from the system entropy source and differs run to run.
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One simulated project year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRecord {
    /// Year number (1-based)
    pub year: u32,
    /// Production volume (millions of m³)
    pub production: f64,
    /// Realized unit price ($/m³)
    pub price: Money,
    /// Gross revenue = production × price
    pub revenue: Money,
    /// Operating costs = COST_RATIO × revenue
    pub cost: Money,
    /// Net cash flow = revenue − cost
    pub net_flow: Money,
    /// Net flow discounted to present value at the parameter discount rate
    pub discounted_flow: Money,
}

/// Full simulated projection, one record per year of the horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub records: Vec<YearRecord>,
}

impl SimulationOutput {
    pub fn years(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.year).collect()
    }

    pub fn prices(&self) -> Vec<Money> {
        self.records.iter().map(|r| r.price).collect()
    }

    pub fn net_flows(&self) -> Vec<Money> {
        self.records.iter().map(|r| r.net_flow).collect()
    }

    pub fn discounted_flows(&self) -> Vec<Money> {
        self.records.iter().map(|r| r.discounted_flow).collect()
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Simulate the year-by-year production, price, revenue, cost and cash-flow
/// series for an energy project.
///
/// Production compounds deterministically at the growth rate. The price is
/// stochastic: each year draws an independent uniform shock from
/// [-price_volatility, +price_volatility] around the base price, emulating
/// market noise. Repeated unseeded runs therefore yield different price
/// paths; callers wanting reproducibility must pass a seed.
///
/// The full record set is recomputed from scratch on every call; nothing is
/// cached between runs.
pub fn simulate_cash_flows(
    input: &SimulationInput,
) -> EnergyValuationResult<ComputationOutput<SimulationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let params = &input.parameters;
    validate_parameters(params)?;

    if params.price_volatility > 1.0 {
        warnings.push(format!(
            "Price volatility of {} exceeds 100% — sampled prices can go negative",
            params.price_volatility
        ));
    }

    let mut rng = match input.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let noise = if params.price_volatility > 0.0 {
        let u = Uniform::new(-params.price_volatility, params.price_volatility).map_err(|e| {
            EnergyValuationError::InvalidParameter {
                field: "price_volatility".into(),
                reason: format!("Invalid noise bound: {e}"),
            }
        })?;
        Some(u)
    } else {
        None
    };

    let horizon = params.horizon_years as usize;
    let one_plus_r = 1.0 + params.discount_rate;

    let mut records: Vec<YearRecord> = Vec::with_capacity(horizon);
    let mut production = params.base_production;
    let mut discount = 1.0_f64;

    for year in 1..=params.horizon_years {
        if year > 1 {
            production *= 1.0 + params.growth_rate;
        }

        let shock = match &noise {
            Some(u) => rng.sample(u),
            None => 0.0,
        };
        let price = params.base_price * (1.0 + shock);

        let revenue = production * price;
        let cost = revenue * COST_RATIO;
        let net_flow = revenue - cost;

        discount *= one_plus_r;
        let discounted_flow = net_flow / discount;

        records.push(YearRecord {
            year,
            production,
            price,
            revenue,
            cost,
            net_flow,
            discounted_flow,
        });
    }

    let output = SimulationOutput { records };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Energy Project Cash-Flow Simulation",
        &serde_json::json!({
            "investment": params.investment,
            "horizon_years": params.horizon_years,
            "discount_rate": params.discount_rate,
            "base_production": params.base_production,
            "base_price": params.base_price,
            "growth_rate": params.growth_rate,
            "price_volatility": params.price_volatility,
            "cost_ratio": COST_RATIO,
            "seed": input.seed,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate all parameter constraints.
fn validate_parameters(params: &ParameterSet) -> EnergyValuationResult<()> {
    if params.investment <= 0.0 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "investment".into(),
            reason: "Initial investment must be positive".into(),
        });
    }

    if params.horizon_years < 1 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "horizon_years".into(),
            reason: "Horizon must be at least 1 year".into(),
        });
    }

    if params.base_production <= 0.0 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "base_production".into(),
            reason: "Year-1 production must be positive".into(),
        });
    }

    if params.base_price <= 0.0 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "base_price".into(),
            reason: "Year-1 price must be positive".into(),
        });
    }

    if params.discount_rate <= 0.0 || params.discount_rate >= 1.0 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "discount_rate".into(),
            reason: "Discount rate must be between 0 and 1 (exclusive)".into(),
        });
    }

    if params.growth_rate <= -1.0 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "growth_rate".into(),
            reason: "Growth rate must be greater than -100%".into(),
        });
    }

    if params.price_volatility < 0.0 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "price_volatility".into(),
            reason: "Price volatility cannot be negative".into(),
        });
    }

    if !params.investment.is_finite()
        || !params.base_production.is_finite()
        || !params.base_price.is_finite()
        || !params.growth_rate.is_finite()
        || !params.price_volatility.is_finite()
    {
        return Err(EnergyValuationError::InvalidParameter {
            field: "parameters".into(),
            reason: "Parameters must be finite numbers".into(),
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

    const SEED: u64 = 42;

    /// Helper: deterministic solar-style input (no growth, no noise).
    fn flat_input() -> SimulationInput {
        SimulationInput {
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
        }
    }

    fn noisy_input() -> SimulationInput {
        SimulationInput {
            parameters: ParameterSet {
                investment: 100.0,
                horizon_years: 10,
                discount_rate: 0.10,
                base_production: 10.0,
                base_price: 50.0,
                growth_rate: 0.05,
                price_volatility: 0.10,
            },
            seed: Some(SEED),
        }
    }

    #[test]
    fn test_series_length_matches_horizon() {
        let result = simulate_cash_flows(&noisy_input()).unwrap();
        let out = &result.result;
        assert_eq!(out.records.len(), 10);
        assert_eq!(out.prices().len(), 10);
        assert_eq!(out.net_flows().len(), 10);
        assert_eq!(out.discounted_flows().len(), 10);
        assert_eq!(out.years(), (1..=10).collect::<Vec<u32>>());
    }

    #[test]
    fn test_flat_parameters_give_constant_series() {
        let result = simulate_cash_flows(&flat_input()).unwrap();
        for rec in &result.result.records {
            assert_eq!(rec.production, 12.0);
            assert_eq!(rec.price, 45.0);
            assert_eq!(rec.revenue, 540.0);
            assert_eq!(rec.cost, 216.0);
            assert_eq!(rec.net_flow, 324.0);
        }
    }

    #[test]
    fn test_worked_example_discounting() {
        let result = simulate_cash_flows(&flat_input()).unwrap();
        let disc = result.result.discounted_flows();
        assert!((disc[0] - 324.0 / 1.1).abs() < 1e-9);
        assert!((disc[1] - 324.0 / 1.21).abs() < 1e-9);
        assert!((disc[2] - 324.0 / 1.331).abs() < 1e-9);
    }

    #[test]
    fn test_production_compounds_at_growth_rate() {
        let mut input = flat_input();
        input.parameters.growth_rate = 0.05;
        input.parameters.horizon_years = 3;
        let result = simulate_cash_flows(&input).unwrap();
        let out = &result.result;
        assert!((out.records[0].production - 12.0).abs() < 1e-12);
        assert!((out.records[1].production - 12.0 * 1.05).abs() < 1e-12);
        assert!((out.records[2].production - 12.0 * 1.05 * 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_negative_growth_shrinks_production() {
        let mut input = flat_input();
        input.parameters.growth_rate = -0.10;
        let result = simulate_cash_flows(&input).unwrap();
        let out = &result.result;
        assert!(out.records[2].production < out.records[1].production);
        assert!(out.records[1].production < out.records[0].production);
    }

    #[test]
    fn test_prices_stay_within_volatility_band() {
        let input = noisy_input();
        let result = simulate_cash_flows(&input).unwrap();
        for rec in &result.result.records {
            assert!(rec.price >= 50.0 * 0.9, "price {} below band", rec.price);
            assert!(rec.price <= 50.0 * 1.1, "price {} above band", rec.price);
        }
    }

    #[test]
    fn test_seeded_reproducibility() {
        let input = noisy_input();
        let r1 = simulate_cash_flows(&input).unwrap();
        let r2 = simulate_cash_flows(&input).unwrap();
        assert_eq!(r1.result.prices(), r2.result.prices());
        assert_eq!(r1.result.net_flows(), r2.result.net_flows());
    }

    #[test]
    fn test_different_seeds_give_different_price_paths() {
        let mut a = noisy_input();
        let mut b = noisy_input();
        a.seed = Some(1);
        b.seed = Some(2);
        let ra = simulate_cash_flows(&a).unwrap();
        let rb = simulate_cash_flows(&b).unwrap();
        assert_ne!(ra.result.prices(), rb.result.prices());
    }

    #[test]
    fn test_cost_is_fixed_share_of_revenue() {
        let result = simulate_cash_flows(&noisy_input()).unwrap();
        for rec in &result.result.records {
            assert!((rec.cost - rec.revenue * COST_RATIO).abs() < 1e-9);
            assert!((rec.net_flow - (rec.revenue - rec.cost)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let mut input = flat_input();
        input.parameters.horizon_years = 0;
        let result = simulate_cash_flows(&input);
        assert!(result.is_err());
        match result.unwrap_err() {
            EnergyValuationError::InvalidParameter { field, .. } => {
                assert_eq!(field, "horizon_years");
            }
            other => panic!("Expected InvalidParameter, got: {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_base_magnitudes_rejected() {
        let mut input = flat_input();
        input.parameters.base_production = 0.0;
        assert!(simulate_cash_flows(&input).is_err());

        let mut input = flat_input();
        input.parameters.base_price = -1.0;
        assert!(simulate_cash_flows(&input).is_err());

        let mut input = flat_input();
        input.parameters.investment = 0.0;
        assert!(simulate_cash_flows(&input).is_err());
    }

    #[test]
    fn test_out_of_range_discount_rate_rejected() {
        let mut input = flat_input();
        input.parameters.discount_rate = 0.0;
        assert!(simulate_cash_flows(&input).is_err());

        let mut input = flat_input();
        input.parameters.discount_rate = 1.0;
        assert!(simulate_cash_flows(&input).is_err());
    }

    #[test]
    fn test_negative_volatility_rejected() {
        let mut input = flat_input();
        input.parameters.price_volatility = -0.1;
        assert!(simulate_cash_flows(&input).is_err());
    }

    #[test]
    fn test_excessive_volatility_warns() {
        let mut input = noisy_input();
        input.parameters.price_volatility = 1.5;
        let result = simulate_cash_flows(&input).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("negative")));
    }

    #[test]
    fn test_metadata_precision_field() {
        let result = simulate_cash_flows(&flat_input()).unwrap();
        assert_eq!(result.metadata.precision, "ieee754_f64");
    }
}
