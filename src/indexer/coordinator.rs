use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::indexer::pending::{PendingPolicy, PendingSet};
use crate::indexer::IndexError;

/// Run `worker` over every height with at most `parallelism` in flight.
///
/// Heights whose worker failed because the node has not produced the block
/// yet are collected per batch and re-run together once the batch drains;
/// `policy` bounds how many such rounds are attempted. Any other failure is
/// fatal: the batch still drains fully (in-flight siblings are never
/// cancelled) and the first such error is returned.
pub async fn for_each_block<W, Fut>(
    heights: Vec<u64>,
    parallelism: usize,
    policy: PendingPolicy,
    worker: W,
) -> Result<(), IndexError>
where
    W: Fn(u64) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), IndexError>> + Send + 'static,
{
    let gate = Arc::new(Semaphore::new(parallelism));
    let mut pending = PendingSet::new(heights, policy);

    loop {
        let batch = pending.take_batch();
        if batch.is_empty() {
            return Ok(());
        }
        if pending.rounds() > 0 {
            info!("Re-running {} pending heights (round {})", batch.len(), pending.rounds());
        }

        let mut tasks = JoinSet::new();
        for height in batch {
            // Admission gate: block here until a slot frees, and hold the
            // permit for the task's whole unit of work so downstream write
            // pressure stays bounded by the same budget as the fetches.
            let permit = gate.clone().acquire_owned().await.expect("admission gate closed");
            let work = worker(height);
            tasks.spawn(async move {
                let result = work.await;
                drop(permit);
                (height, result)
            });
        }

        let mut fatal: Option<IndexError> = None;
        let mut retry_later: Vec<u64> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((height, Ok(()))) => debug!("[height {}] indexed", height),
                Ok((height, Err(err))) if err.is_pending() => {
                    debug!("[height {}] block not produced yet, queued for retry", height);
                    retry_later.push(height);
                }
                Ok((height, Err(err))) => {
                    error!("[height {}] failed to index block: {}", height, err);
                    if fatal.is_none() {
                        fatal = Some(IndexError::Block {
                            height,
                            source: Box::new(err),
                        });
                    }
                }
                Err(err) => {
                    if fatal.is_none() {
                        fatal = Some(IndexError::Task(err.to_string()));
                    }
                }
            }
        }

        if let Some(err) = fatal {
            return Err(err);
        }
        if retry_later.is_empty() {
            return Ok(());
        }
        retry_later.sort_unstable();
        pending.requeue(retry_later)?;
        sleep(pending.round_delay()).await;
    }
}
