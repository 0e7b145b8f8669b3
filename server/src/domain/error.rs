//! Filter and query errors

use thiserror::Error;

use crate::data::DataError;

/// A rejected filter mutation; the filter state is left untouched
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown quantity '{0}'")]
    UnknownQuantity(String),

    #[error("quantity '{0}' is not a float quantity")]
    NotFloat(String),

    #[error("quantity '{0}' is not a categorical quantity")]
    NotCategorical(String),

    #[error("range for '{quantity}' must have finite bounds")]
    NonFinite { quantity: String },

    #[error("inverted range for '{quantity}': {lo} > {hi}")]
    InvertedRange { quantity: String, lo: f64, hi: f64 },

    #[error("range [{lo}, {hi}] for '{quantity}' is outside [{min}, {max}]")]
    OutOfRange {
        quantity: String,
        lo: f64,
        hi: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown labels for '{quantity}': {}", labels.join(", "))]
    UnknownLabels {
        quantity: String,
        labels: Vec<String>,
    },
}

/// Failure of a single query execution
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("structure store unavailable: {0}")]
    Connectivity(#[source] DataError),

    #[error("non-numeric value '{value}' in column '{column}' at row {row}")]
    DataIntegrity {
        column: String,
        row: usize,
        value: String,
    },
}

/// A column the catalog names but the store lacks is a wiring mistake,
/// every other store failure is a connectivity failure
impl From<DataError> for QueryError {
    fn from(e: DataError) -> Self {
        match e {
            DataError::UnknownColumn { .. } => Self::Configuration(e.to_string()),
            other => Self::Connectivity(other),
        }
    }
}

impl QueryError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Message shown in the dashboard status line instead of a result count
    pub fn status_text(&self) -> String {
        match self {
            Self::Validation(e) => format!("Invalid filter: {}.", e),
            Self::Configuration(_) => "The dashboard is misconfigured.".to_string(),
            Self::Connectivity(_) => "Could not reach the structure database.".to_string(),
            Self::DataIntegrity { column, .. } => {
                format!("Invalid data in column '{}'.", column)
            }
        }
    }
}
