//! Error taxonomy for submissions and benchmark runs

use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = BenchError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Dispatch rejected or not completed (node rejection, transport error, insufficient funds)
    #[error("submission failed: {0}")]
    Submission(String),

    #[error("no confirmation within {0:?}")]
    Timeout(Duration),

    #[error("run cancelled")]
    Cancelled,
}

impl BenchError {
    pub fn submission(err: impl std::fmt::Display) -> Self {
        BenchError::Submission(err.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BenchError::InvalidArgument(_) => "invalid_argument",
            BenchError::Submission(_) => "submission",
            BenchError::Timeout(_) => "timeout",
            BenchError::Cancelled => "cancelled",
        }
    }
}
