use clap::Args;
use serde_json::Value;

use energy_valuation_core::sensitivity::{self, SensitivityInput};
use energy_valuation_core::simulation;

use super::ProjectArgs;

/// Arguments for the discount-rate sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Lowest discount rate in the sweep
    #[arg(long, default_value_t = sensitivity::DEFAULT_MIN_RATE)]
    pub min_rate: f64,

    /// Highest discount rate in the sweep
    #[arg(long, default_value_t = sensitivity::DEFAULT_MAX_RATE)]
    pub max_rate: f64,

    /// Number of evenly spaced rates
    #[arg(long, default_value_t = sensitivity::DEFAULT_GRID_POINTS)]
    pub points: usize,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = args.project.resolve()?;
    let simulated = simulation::simulate_cash_flows(&input)?;

    let rates = sensitivity::rate_grid(args.min_rate, args.max_rate, args.points)?;
    let sweep_input = SensitivityInput {
        net_flows: simulated.result.net_flows(),
        rates,
    };
    let result = sensitivity::sweep_discount_rates(&sweep_input)?;
    Ok(serde_json::to_value(result)?)
}
