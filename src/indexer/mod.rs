pub mod coordinator;
pub mod fetch;
pub mod pending;
pub mod persister;

use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::chain::client::is_block_pending;
use crate::chain::{ChainClient, ClientError};
use crate::config::Config;
use crate::db;
use self::fetch::RetryPolicy;
use self::pending::PendingPolicy;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("chain client error: {0}")]
    Client(#[from] ClientError),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("[height {height}] failed to index block: {source}")]
    Block {
        height: u64,
        #[source]
        source: Box<IndexError>,
    },

    #[error("worker task failed: {0}")]
    Task(String),

    #[error("blocks still pending after {rounds} rounds: {heights:?}")]
    PendingExhausted { heights: Vec<u64>, rounds: u32 },
}

impl IndexError {
    /// True when the underlying failure means the block does not exist yet.
    pub fn is_pending(&self) -> bool {
        match self {
            IndexError::Client(err) => is_block_pending(err),
            _ => false,
        }
    }
}

/// Composition root for the pipeline: fetch-with-retry feeding the persister,
/// fanned out over heights by the coordinator.
pub struct Indexer {
    client: Arc<dyn ChainClient>,
    pool: SqlitePool,
    chain_id: String,
    retry: RetryPolicy,
    pending: PendingPolicy,
}

impl Indexer {
    pub fn new(client: Arc<dyn ChainClient>, pool: SqlitePool, config: &Config) -> Self {
        Self {
            client,
            pool,
            chain_id: config.chain_id.clone(),
            retry: RetryPolicy {
                attempts: config.retry_attempts,
                base_delay: config.retry_base_delay,
            },
            pending: PendingPolicy {
                max_rounds: config.pending_max_rounds,
                round_delay: config.pending_round_delay,
            },
        }
    }

    /// One height's unit of work: fetch the block, then persist its
    /// transactions and recognized messages.
    pub async fn index_block(&self, height: u64) -> Result<(), IndexError> {
        let block = fetch::fetch_block_with_retry(self.client.as_ref(), height, &self.retry).await?;
        persister::persist_block(self.client.as_ref(), &self.pool, &self.chain_id, &block).await;
        Ok(())
    }

    /// Index a set of heights with at most `parallelism` blocks in flight,
    /// re-running heights whose blocks the node has not produced yet.
    pub async fn index_range(self: Arc<Self>, heights: Vec<u64>, parallelism: usize) -> Result<(), IndexError> {
        info!(
            "Starting block queries for {} ({} heights, parallelism {})",
            self.chain_id,
            heights.len(),
            parallelism
        );
        let pending = self.pending.clone();
        let indexer = self;
        coordinator::for_each_block(heights, parallelism, pending, move |height| {
            let indexer = indexer.clone();
            async move { indexer.index_block(height).await }
        })
        .await
    }

    /// Highest indexed height for this chain, `None` when nothing is indexed yet.
    pub async fn last_indexed_height(&self) -> Result<Option<i64>, sqlx::Error> {
        db::tx::last_indexed_height(&self.pool, &self.chain_id).await
    }
}
