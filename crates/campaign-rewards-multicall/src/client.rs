use crate::{
    Abi, BatchConfig, BatchResult, Call, CallOptions, ChainId, MulticallError, MulticallResult,
};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

/// Executes many contract reads in one round trip
///
/// Implementations return exactly one entry per call, in request order. With
/// `require_success = false` a failed call becomes `None` and the rest of the
/// batch still resolves.
#[async_trait]
pub trait BatchCallExecutor: Send + Sync {
    async fn call(
        &self,
        abi: &Abi,
        calls: &[Call],
        chain_id: ChainId,
        options: CallOptions,
    ) -> MulticallResult<BatchResult>;
}

#[async_trait]
impl<T: BatchCallExecutor + ?Sized> BatchCallExecutor for Arc<T> {
    async fn call(
        &self,
        abi: &Abi,
        calls: &[Call],
        chain_id: ChainId,
        options: CallOptions,
    ) -> MulticallResult<BatchResult> {
        (**self).call(abi, calls, chain_id, options).await
    }
}

/// Splits oversized batches into chunks and runs a bounded number in parallel
pub struct ChunkedBatchExecutor {
    inner: Arc<dyn BatchCallExecutor>,
    config: BatchConfig,
}

impl ChunkedBatchExecutor {
    /// Create a new executor with default configuration
    pub fn new(inner: Arc<dyn BatchCallExecutor>) -> Self {
        Self {
            inner,
            config: BatchConfig::default(),
        }
    }

    /// Create a new executor with custom configuration
    pub fn with_config(
        inner: Arc<dyn BatchCallExecutor>,
        config: BatchConfig,
    ) -> MulticallResult<Self> {
        config.validate()?;
        Ok(Self { inner, config })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

#[async_trait]
impl BatchCallExecutor for ChunkedBatchExecutor {
    async fn call(
        &self,
        abi: &Abi,
        calls: &[Call],
        chain_id: ChainId,
        options: CallOptions,
    ) -> MulticallResult<BatchResult> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let chunks: Vec<&[Call]> = calls.chunks(self.config.max_calls_per_batch).collect();
        let group_count = chunks.len().div_ceil(self.config.max_parallel_batches);
        let mut results = Vec::with_capacity(calls.len());

        for (group_idx, group) in chunks.chunks(self.config.max_parallel_batches).enumerate() {
            debug!(
                "Executing read group {} of {} ({} chunks) on chain {}",
                group_idx + 1,
                group_count,
                group.len(),
                chain_id
            );

            let group_futures = group
                .iter()
                .map(|chunk| self.inner.call(abi, chunk, chain_id, options));
            let outputs = try_join_all(group_futures).await?;

            for (chunk, output) in group.iter().zip(outputs) {
                if output.len() != chunk.len() {
                    return Err(MulticallError::ResultCountMismatch {
                        expected: chunk.len(),
                        actual: output.len(),
                    });
                }
                results.extend(output);
            }
        }

        if options.require_success {
            if let Some(index) = results.iter().position(Option::is_none) {
                return Err(MulticallError::CallFailed {
                    index,
                    name: calls[index].name.clone(),
                });
            }
        }

        debug!(
            "Executed {} calls in {} chunks",
            results.len(),
            chunks.len()
        );
        Ok(results)
    }
}
