use serde::{Deserialize, Serialize};

/// All monetary values, in millions of the project currency.
pub type Money = f64;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = f64;

/// Economic and production assumptions driving a single valuation run.
///
/// A pure value object: validation happens at the boundary of the
/// component consuming it, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Initial investment paid at time 0
    pub investment: Money,
    /// Project horizon in years; fixes the length of every derived series
    pub horizon_years: u32,
    /// Annual discount rate
    pub discount_rate: Rate,
    /// Year-1 production volume (millions of m³)
    pub base_production: f64,
    /// Year-1 unit price ($/m³)
    pub base_price: Money,
    /// Annual production growth rate; may be negative
    pub growth_rate: Rate,
    /// Symmetric bound for uniform per-year price noise (0.10 = ±10%)
    pub price_volatility: Rate,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}
