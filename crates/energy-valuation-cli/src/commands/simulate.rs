use clap::Args;
use serde_json::Value;

use energy_valuation_core::simulation;

use super::ProjectArgs;

/// Arguments for cash-flow simulation
#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = args.project.resolve()?;
    let result = simulation::simulate_cash_flows(&input)?;
    Ok(serde_json::to_value(result)?)
}
