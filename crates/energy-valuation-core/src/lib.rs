pub mod error;
pub mod forecast;
pub mod presets;
pub mod sensitivity;
pub mod simulation;
pub mod types;
pub mod valuation;

pub use error::EnergyValuationError;
pub use types::*;

/// Standard result type for all valuation operations
pub type EnergyValuationResult<T> = Result<T, EnergyValuationError>;
