use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::EnergyValuationError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::EnergyValuationResult;

/// Default sweep range: 100 evenly spaced rates from 5% to 20%.
pub const DEFAULT_MIN_RATE: Rate = 0.05;
pub const DEFAULT_MAX_RATE: Rate = 0.20;
pub const DEFAULT_GRID_POINTS: usize = 100;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Input for a discount-rate sensitivity sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    /// The already-simulated net-flow path (index 0 = year 1). The flows are
    /// held fixed across the sweep; only the discount exponent changes.
    pub net_flows: Vec<Money>,
    /// Candidate discount rates, each in (0, 1); evaluated in input order
    pub rates: Vec<Rate>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Present value of the net-flow path at one candidate rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatePoint {
    pub rate: Rate,
    /// Discounted sum of the net flows at this rate. The time-0 investment
    /// is constant across the sweep and not part of this contract.
    pub npv: Money,
}

/// Swept (rate, npv) pairs, one per input rate, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub points: Vec<RatePoint>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Sweep the discount rate across a fixed net-flow path.
///
/// Re-simulating the flows per rate would mix price noise into the result;
/// discounting the same path isolates the rate as the only moving input.
/// Rate points are independent of each other, so the output carries no
/// ordering requirement beyond matching the input order.
pub fn sweep_discount_rates(
    input: &SensitivityInput,
) -> EnergyValuationResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let points: Vec<RatePoint> = input
        .rates
        .iter()
        .map(|&rate| RatePoint {
            rate,
            npv: present_value(&input.net_flows, rate),
        })
        .collect();

    let output = SensitivityOutput { points };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Discount-Rate Sensitivity Sweep",
        &serde_json::json!({
            "horizon_years": input.net_flows.len(),
            "num_rates": input.rates.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Build an evenly spaced ascending rate grid over [min, max].
pub fn rate_grid(min: Rate, max: Rate, points: usize) -> EnergyValuationResult<Vec<Rate>> {
    if points < 2 {
        return Err(EnergyValuationError::InvalidParameter {
            field: "points".into(),
            reason: "Grid needs at least 2 points".into(),
        });
    }
    if !(0.0 < min && min < max && max < 1.0) {
        return Err(EnergyValuationError::InvalidParameter {
            field: "rate_range".into(),
            reason: format!("Rates must satisfy 0 < min < max < 1, got [{min}, {max}]"),
        });
    }

    let step = (max - min) / (points - 1) as f64;
    Ok((0..points).map(|i| min + i as f64 * step).collect())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Present value of flows starting at year 1, via iterative discount factors.
fn present_value(flows: &[Money], rate: Rate) -> Money {
    let one_plus_r = 1.0 + rate;
    let mut discount = 1.0_f64;
    let mut pv = 0.0_f64;
    for flow in flows {
        discount *= one_plus_r;
        pv += flow / discount;
    }
    pv
}

fn validate_input(input: &SensitivityInput) -> EnergyValuationResult<()> {
    if input.net_flows.is_empty() {
        return Err(EnergyValuationError::InvalidParameter {
            field: "net_flows".into(),
            reason: "At least one cash flow is required".into(),
        });
    }

    if input.rates.is_empty() {
        return Err(EnergyValuationError::InvalidParameter {
            field: "rates".into(),
            reason: "At least one candidate rate is required".into(),
        });
    }

    for &rate in &input.rates {
        if !(0.0 < rate && rate < 1.0) {
            return Err(EnergyValuationError::InvalidParameter {
                field: "rates".into(),
                reason: format!("Rates must lie in (0, 1), got {rate}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
