use std::time::Duration;

use crate::indexer::IndexError;

/// Bounds on re-running heights the chain has not produced yet.
#[derive(Debug, Clone)]
pub struct PendingPolicy {
    pub max_rounds: u32,
    pub round_delay: Duration,
}

impl Default for PendingPolicy {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            round_delay: Duration::from_secs(1),
        }
    }
}

/// Heights waiting on the chain, with the number of re-queue rounds they
/// have been through. Requeueing past the policy ceiling is an error, so a
/// height that never materializes cannot spin the coordinator forever.
#[derive(Debug)]
pub struct PendingSet {
    heights: Vec<u64>,
    rounds: u32,
    policy: PendingPolicy,
}

impl PendingSet {
    pub fn new(heights: Vec<u64>, policy: PendingPolicy) -> Self {
        Self {
            heights,
            rounds: 0,
            policy,
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn round_delay(&self) -> Duration {
        self.policy.round_delay
    }

    /// Take the current batch, leaving the set empty until `requeue`.
    pub fn take_batch(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.heights)
    }

    /// Put back heights whose blocks are still pending, counting the round.
    pub fn requeue(&mut self, heights: Vec<u64>) -> Result<(), IndexError> {
        self.rounds += 1;
        if self.rounds >= self.policy.max_rounds {
            return Err(IndexError::PendingExhausted {
                heights,
                rounds: self.rounds,
            });
        }
        self.heights = heights;
        Ok(())
    }
}
