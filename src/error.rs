//! Error type shared by the loaders and the projection pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("IRR did not converge after {iterations} iterations")]
    NumericNonConvergence { iterations: u32 },

    #[error("IRR has no real root: {0}")]
    NoRealRoot(String),

    #[error("Division undefined in {context}")]
    DivisionUndefined { context: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for outcomes that degrade to an undefined metric instead of failing the run
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ModelError::NumericNonConvergence { .. }
                | ModelError::NoRealRoot(_)
                | ModelError::DivisionUndefined { .. }
        )
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
