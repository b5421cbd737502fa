pub mod forecast;
pub mod presets;
pub mod sensitivity;
pub mod simulate;
pub mod valuate;

use clap::{Args, ValueEnum};

use energy_valuation_core::presets::ProjectKind;
use energy_valuation_core::simulation::SimulationInput;

use crate::input;

/// Project preset selector.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Solar,
    Wind,
    Geothermal,
    Refinery,
}

impl From<PresetArg> for ProjectKind {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Solar => ProjectKind::Solar,
            PresetArg::Wind => ProjectKind::Wind,
            PresetArg::Geothermal => ProjectKind::Geothermal,
            PresetArg::Refinery => ProjectKind::Refinery,
        }
    }
}

/// Shared project parameter flags. A preset supplies the starting
/// economics; individual flags override single fields.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ProjectArgs {
    /// Named project preset supplying default economics
    #[arg(long, value_enum, default_value = "solar")]
    pub preset: PresetArg,

    /// Initial investment ($ millions)
    #[arg(long)]
    pub investment: Option<f64>,

    /// Project horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Annual discount rate (e.g. 0.10 for 10%)
    #[arg(long)]
    pub discount_rate: Option<f64>,

    /// Year-1 production (millions of m³)
    #[arg(long)]
    pub base_production: Option<f64>,

    /// Year-1 unit price ($/m³)
    #[arg(long)]
    pub base_price: Option<f64>,

    /// Annual production growth rate (may be negative)
    #[arg(long)]
    pub growth_rate: Option<f64>,

    /// Symmetric price noise bound (e.g. 0.10 for ±10%)
    #[arg(long)]
    pub price_volatility: Option<f64>,

    /// Seed for a reproducible price path
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to a JSON simulation input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

impl ProjectArgs {
    /// Resolve the simulation input: JSON file, piped stdin, or
    /// preset-plus-flag-overrides, in that order.
    pub fn resolve(&self) -> Result<SimulationInput, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_json(path);
        }
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(serde_json::from_value(data)?);
        }

        let mut params = ProjectKind::from(self.preset).preset().parameters();
        if let Some(v) = self.investment {
            params.investment = v;
        }
        if let Some(v) = self.years {
            params.horizon_years = v;
        }
        if let Some(v) = self.discount_rate {
            params.discount_rate = v;
        }
        if let Some(v) = self.base_production {
            params.base_production = v;
        }
        if let Some(v) = self.base_price {
            params.base_price = v;
        }
        if let Some(v) = self.growth_rate {
            params.growth_rate = v;
        }
        if let Some(v) = self.price_volatility {
            params.price_volatility = v;
        }

        Ok(SimulationInput {
            parameters: params,
            seed: self.seed,
        })
    }
}
