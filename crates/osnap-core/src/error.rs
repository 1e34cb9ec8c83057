//! Error taxonomy for the interaction core.

use crate::driver::DriverError;

#[derive(thiserror::Error, Debug)]
pub enum FlowError {
    /// No candidate in the set resolved within the budget, in any frame.
    #[error("no candidate resolved for {candidates}")]
    ElementNotFound { candidates: String },

    /// An action was retried until exhaustion and still failed.
    #[error("action on {descriptor} failed after retries: {source}")]
    ActionFailed {
        descriptor: String,
        source: DriverError,
    },

    /// A required wait exceeded its budget.
    #[error("timed out waiting for {operation}")]
    Timeout { operation: String },

    /// A non-retryable driver failure.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The human input source failed.
    #[error("code input failed: {0}")]
    Input(String),
}

impl FlowError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FlowError::Timeout { .. })
    }
}
