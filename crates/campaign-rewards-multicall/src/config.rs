use crate::{MulticallError, MulticallResult};

/// Configuration for splitting large read batches
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of calls sent to the inner executor in one batch
    pub max_calls_per_batch: usize,

    /// Maximum number of chunks in flight at once
    pub max_parallel_batches: usize,
}

impl BatchConfig {
    pub fn validate(&self) -> MulticallResult<()> {
        if self.max_calls_per_batch == 0 {
            return Err(MulticallError::Config(
                "max_calls_per_batch must be at least 1".to_string(),
            ));
        }
        if self.max_parallel_batches == 0 {
            return Err(MulticallError::Config(
                "max_parallel_batches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_calls_per_batch: 50,
            max_parallel_batches: 4,
        }
    }
}
