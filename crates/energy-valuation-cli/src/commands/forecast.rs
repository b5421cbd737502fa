use clap::Args;
use serde_json::Value;

use energy_valuation_core::forecast::{self, ForecastInput};
use energy_valuation_core::simulation;

use super::ProjectArgs;

/// Arguments for the price trend fit
#[derive(Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Number of bagged trees in the ensemble
    #[arg(long, default_value_t = 100)]
    pub trees: u32,

    /// Maximum tree depth
    #[arg(long, default_value_t = 16)]
    pub max_depth: u32,

    /// Path to a standalone JSON price series ({"years": [...], "prices": [...]})
    /// instead of simulating one
    #[arg(long)]
    pub series: Option<String>,
}

pub fn run_forecast(args: ForecastArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let forecast_input: ForecastInput = if let Some(ref path) = args.series {
        crate::input::file::read_json(path)?
    } else {
        let input = args.project.resolve()?;
        let simulated = simulation::simulate_cash_flows(&input)?;
        ForecastInput {
            years: simulated.result.years(),
            prices: simulated.result.prices(),
            num_trees: args.trees,
            max_depth: args.max_depth,
            seed: args.project.seed,
        }
    };

    let result = forecast::fit_and_predict(&forecast_input)?;
    Ok(serde_json::to_value(result)?)
}
