use clap::Args;
use serde_json::Value;

use energy_valuation_core::simulation;
use energy_valuation_core::valuation::{self, ValuationInput};

use super::ProjectArgs;

/// Arguments for project valuation
#[derive(Args)]
pub struct ValuateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

pub fn run_valuate(args: ValuateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = args.project.resolve()?;
    let simulated = simulation::simulate_cash_flows(&input)?;

    let valuation_input = ValuationInput {
        net_flows: simulated.result.net_flows(),
        discounted_flows: simulated.result.discounted_flows(),
        investment: input.parameters.investment,
    };
    let result = valuation::evaluate_project(&valuation_input)?;
    Ok(serde_json::to_value(result)?)
}
