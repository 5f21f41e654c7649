use thiserror::Error;

use crate::types::NumericField;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid {field} range [{min}, {max}]: min must be <= max and both must be numbers")]
    InvalidRange { field: NumericField, min: f64, max: f64 },

    #[error("Invalid sample size {0}: must be at least 1")]
    InvalidSampleSize(usize),

    #[error("Unknown {dimension} value: {value:?}")]
    UnknownValue { dimension: &'static str, value: String },

    #[error("Malformed CSV ({origin}): {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
