// Shared fixtures: an in-memory store and a scriptable chain client.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use prost::Message;
use prost_types::Any;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::chain::codec::{self, AuthInfo, Coin, Fee, MsgTransfer, TxBody, TxRaw};
use crate::chain::{Block, ChainClient, ClientError, DecodedTx, TxResult};
use crate::config::Config;
use crate::db;

/// One-connection in-memory database with the full schema applied.
pub async fn setup_pool() -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("failed to open in-memory database");
    db::migration::run_migrations(&pool).await.expect("migrations failed");
    pool
}

/// Config tuned for tests: single fetch attempt so pending failures surface
/// to the coordinator immediately, and millisecond-scale delays.
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        rpc_url: "http://localhost:26657".to_string(),
        chain_id: "test-1".to_string(),
        account_prefix: "cosmos".to_string(),
        start_height: 1,
        end_height: 0,
        parallelism: 2,
        rpc_timeout_secs: 5,
        retry_attempts: 1,
        retry_base_delay: Duration::from_millis(1),
        pending_max_rounds: 5,
        pending_round_delay: Duration::from_millis(5),
    }
}

pub fn tx_hash(raw: &[u8]) -> Vec<u8> {
    Sha256::digest(raw).to_vec()
}

pub fn encode_tx(messages: Vec<Any>, fee: Option<Coin>) -> Vec<u8> {
    let body = TxBody {
        messages,
        memo: String::new(),
    };
    let auth = AuthInfo {
        fee: Some(Fee {
            amount: fee.into_iter().collect(),
            gas_limit: 200_000,
        }),
    };
    TxRaw {
        body_bytes: body.encode_to_vec(),
        auth_info_bytes: auth.encode_to_vec(),
        signatures: vec![],
    }
    .encode_to_vec()
}

pub fn encode_transfer_tx(sender: &str, receiver: &str, amount: &str, denom: &str) -> Vec<u8> {
    let msg = MsgTransfer {
        source_port: "transfer".to_string(),
        source_channel: "channel-0".to_string(),
        token: Some(Coin {
            denom: denom.to_string(),
            amount: amount.to_string(),
        }),
        sender: sender.to_string(),
        receiver: receiver.to_string(),
        timeout_timestamp: 0,
    };
    let any = Any {
        type_url: codec::MSG_TRANSFER_URL.to_string(),
        value: msg.encode_to_vec(),
    };
    encode_tx(
        vec![any],
        Some(Coin {
            denom: "uatom".to_string(),
            amount: "500".to_string(),
        }),
    )
}

pub fn block_with_txs(height: u64, txs: Vec<Vec<u8>>) -> Block {
    Block {
        chain_id: "test-1".to_string(),
        height,
        time: 1_700_000_000 + height as i64,
        txs,
    }
}

/// The error signature a node reports for a height it has not produced yet.
pub fn pending_error() -> ClientError {
    ClientError::Rpc {
        code: -32603,
        message: "Internal error: height 99 must be less than or equal to the current blockchain height: 98"
            .to_string(),
    }
}

/// Scriptable chain client: serves canned blocks and tx results, and can be
/// told to report a height as pending for its first N fetches.
#[derive(Default)]
pub struct MockChainClient {
    blocks: HashMap<u64, Block>,
    results: HashMap<Vec<u8>, TxResult>,
    pending_for: HashMap<u64, u32>,
    calls: Mutex<HashMap<u64, u32>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.insert(block.height, block);
        self
    }

    pub fn with_result(mut self, hash: Vec<u8>, result: TxResult) -> Self {
        self.results.insert(hash, result);
        self
    }

    /// Report `height` as not-yet-produced for its first `times` fetches.
    pub fn with_pending(mut self, height: u64, times: u32) -> Self {
        self.pending_for.insert(height, times);
        self
    }

    pub fn get_block_calls(&self, height: u64) -> u32 {
        *self.calls.lock().unwrap().get(&height).unwrap_or(&0)
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_block(&self, height: u64) -> Result<Block, ClientError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let call = calls.entry(height).or_insert(0);
            *call += 1;
            *call
        };
        if let Some(&times) = self.pending_for.get(&height) {
            if call <= times {
                return Err(pending_error());
            }
        }
        self.blocks.get(&height).cloned().ok_or_else(|| ClientError::Rpc {
            code: -32603,
            message: format!("block {} not found", height),
        })
    }

    fn decode_tx(&self, bytes: &[u8]) -> Result<DecodedTx, ClientError> {
        codec::decode_tx(bytes).map_err(ClientError::from)
    }

    async fn query_tx_result(&self, hash: &[u8]) -> Result<TxResult, ClientError> {
        self.results.get(hash).cloned().ok_or_else(|| ClientError::Rpc {
            code: -32603,
            message: format!("tx 0x{} not found", hex::encode_upper(hash)),
        })
    }

    fn encode_address(&self, account: &[u8]) -> Result<String, ClientError> {
        let hrp = bech32::Hrp::parse("cosmos").map_err(|err| ClientError::Address(err.to_string()))?;
        bech32::encode::<bech32::Bech32>(hrp, account).map_err(|err| ClientError::Address(err.to_string()))
    }
}
