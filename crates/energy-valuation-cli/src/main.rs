mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::forecast::ForecastArgs;
use commands::sensitivity::SensitivityArgs;
use commands::simulate::SimulateArgs;
use commands::valuate::ValuateArgs;

/// Financial valuation of energy projects
#[derive(Parser)]
#[command(
    name = "epv",
    version,
    about = "Financial valuation of energy projects",
    long_about = "A CLI for simulating and valuing energy projects (solar, wind, \
                  geothermal, refinery). Simulates annual production, prices and \
                  cash flows, computes NPV and payback period, sweeps the discount \
                  rate for sensitivity, and fits price trend regressions."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the year-by-year production, price and cash-flow series
    Simulate(SimulateArgs),
    /// Compute NPV and payback period for a simulated project
    Valuate(ValuateArgs),
    /// Sweep the discount rate and report NPV at each candidate rate
    Sensitivity(SensitivityArgs),
    /// Fit linear and bagged-tree price trend models
    Forecast(ForecastArgs),
    /// List the catalogued project presets
    Presets,
    /// Print the user manual
    Manual,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Valuate(args) => commands::valuate::run_valuate(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Forecast(args) => commands::forecast::run_forecast(args),
        Commands::Presets => commands::presets::run_presets(),
        Commands::Manual => {
            println!("{}", include_str!("../docs/manual.md"));
            return;
        }
        Commands::Version => {
            println!("epv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
