use thiserror::Error;

pub type MulticallResult<T> = Result<T, MulticallError>;

/// Errors that can occur while executing batched reads or querying the chain head
#[derive(Error, Debug)]
pub enum MulticallError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("Invalid block number: {0}")]
    InvalidBlockNumber(String),

    #[error("Batch returned {actual} results for {expected} calls")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("Call {index} ({name}) failed and the batch requires success")]
    CallFailed { index: usize, name: String },

    /// Transport failure reported by a [`crate::BatchCallExecutor`] implementation
    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
