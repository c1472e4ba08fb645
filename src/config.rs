// Configuration for:
// - Tendermint RPC endpoint URL
// - Database connection string
// - Chain identity (chain id, bech32 account prefix)
// - Indexing range, parallelism, retry and pending-block policies

use dotenv::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rpc_url: String,
    pub chain_id: String,
    pub account_prefix: String,
    pub start_height: u64,
    pub end_height: u64,
    pub parallelism: usize,
    pub rpc_timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_base_delay: Duration,
    pub pending_max_rounds: u32,
    pub pending_round_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:indexer.db".to_string());
        let rpc_url = env::var("RPC_URL")
            .unwrap_or_else(|_| "http://localhost:26657".to_string());
        let chain_id = env::var("CHAIN_ID").unwrap_or_else(|_| "osmosis-1".to_string());
        let account_prefix = env::var("ACCOUNT_PREFIX").unwrap_or_else(|_| "osmo".to_string());
        let start_height = env::var("START_HEIGHT")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .unwrap_or(1);
        let end_height = env::var("END_HEIGHT")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .unwrap_or(0);
        let parallelism = env::var("PARALLELISM")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100);
        let rpc_timeout_secs = env::var("RPC_TIMEOUT_SECS")
            .map(|v| v.parse().unwrap_or(30))
            .unwrap_or(30);
        let retry_attempts = env::var("RETRY_ATTEMPTS")
            .map(|v| v.parse().unwrap_or(5))
            .unwrap_or(5);
        let retry_base_delay = env::var("RETRY_BASE_DELAY_MS")
            .unwrap_or_else(|_| "400".to_string())
            .parse()
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(400));
        let pending_max_rounds = env::var("PENDING_MAX_ROUNDS")
            .map(|v| v.parse().unwrap_or(10))
            .unwrap_or(10);
        let pending_round_delay = env::var("PENDING_ROUND_DELAY_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(1));

        Self {
            database_url,
            rpc_url,
            chain_id,
            account_prefix,
            start_height,
            end_height,
            parallelism,
            rpc_timeout_secs,
            retry_attempts,
            retry_base_delay,
            pending_max_rounds,
            pending_round_delay,
        }
    }
}
