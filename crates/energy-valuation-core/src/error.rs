use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnergyValuationError {
    #[error("Invalid parameter: {field} — {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Fitting error: {model} — {reason}")]
    FittingError { model: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for EnergyValuationError {
    fn from(e: serde_json::Error) -> Self {
        EnergyValuationError::SerializationError(e.to_string())
    }
}
