use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::chain::{Block, ChainClient, ClientError};

/// Attempt budget and backoff base for transient block-fetch failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            base_delay: Duration::from_millis(400),
        }
    }
}

/// Fetch one block, retrying failures with exponential backoff. Causes are
/// not distinguished here; once the attempt budget is spent only the most
/// recent error is reported.
pub async fn fetch_block_with_retry(
    client: &dyn ChainClient,
    height: u64,
    policy: &RetryPolicy,
) -> Result<Block, ClientError> {
    let backoff = ExponentialBuilder::default()
        .with_min_delay(policy.base_delay)
        .with_max_times(policy.attempts.saturating_sub(1) as usize);

    let mut attempt = 0u32;
    (|| client.get_block(height))
        .retry(backoff)
        .notify(|err: &ClientError, delay: Duration| {
            attempt += 1;
            warn!(
                "[height {}] retrying block fetch (attempt {}, next in {:?}): {}",
                height, attempt, delay, err
            );
        })
        .await
}
