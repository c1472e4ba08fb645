use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bech32::{Bech32, Hrp};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::chain::codec;
use crate::chain::models::{Block, DecodedTx, TxResult};
use crate::config::Config;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed RPC response: {0}")]
    Malformed(String),

    #[error("Failed to decode transaction: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Invalid account address: {0}")]
    Address(String),
}

/// Error fragment the node returns for a height it has not produced yet.
/// This is the only place that knows the wording; if the RPC layer ever
/// rephrases it, this constant (and its test) is the thing to update.
const BLOCK_PENDING_FRAGMENT: &str = "must be less than or equal to the current blockchain height";

/// True when the error means "this height's block does not exist yet",
/// as opposed to a permanent failure.
pub fn is_block_pending(err: &ClientError) -> bool {
    matches!(err, ClientError::Rpc { message, .. } if message.contains(BLOCK_PENDING_FRAGMENT))
}

/// The chain-facing collaborators the indexing pipeline consumes.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch the full block at a height: header fields plus raw transactions.
    async fn get_block(&self, height: u64) -> Result<Block, ClientError>;

    /// Decode raw transaction bytes into fee and ordered messages.
    fn decode_tx(&self, bytes: &[u8]) -> Result<DecodedTx, ClientError>;

    /// Look up the execution result of a committed transaction by hash.
    async fn query_tx_result(&self, hash: &[u8]) -> Result<TxResult, ClientError>;

    /// Bech32-encode raw account bytes with the chain's account prefix.
    fn encode_address(&self, account: &[u8]) -> Result<String, ClientError>;
}

/// Tendermint JSON-RPC client over plain HTTP GET endpoints.
pub struct HttpChainClient {
    http: reqwest::Client,
    rpc_url: String,
    account_prefix: String,
}

impl HttpChainClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.rpc_timeout_secs);
        info!("Initializing chain client with RPC endpoint: {}, timeout: {:?}", config.rpc_url, timeout);

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.trim_end_matches('/').to_string(),
            account_prefix: config.account_prefix.clone(),
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}/{}", self.rpc_url, path);
        let envelope: RpcEnvelope<T> = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = envelope.error {
            let message = if err.data.is_empty() {
                err.message
            } else {
                format!("{}: {}", err.message, err.data)
            };
            return Err(ClientError::Rpc { code: err.code, message });
        }

        envelope.result.ok_or_else(|| {
            ClientError::Malformed(format!("{} response carried neither result nor error", path))
        })
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn get_block(&self, height: u64) -> Result<Block, ClientError> {
        let resp: BlockResponse = self
            .call("block", &[("height", height.to_string())])
            .await?;

        let header = resp.block.header;
        let time = chrono::DateTime::parse_from_rfc3339(&header.time)
            .map_err(|err| ClientError::Malformed(format!("bad block time {:?}: {}", header.time, err)))?
            .timestamp();
        let height = header
            .height
            .parse()
            .map_err(|err| ClientError::Malformed(format!("bad block height {:?}: {}", header.height, err)))?;

        let mut txs = Vec::with_capacity(resp.block.data.txs.len());
        for encoded in &resp.block.data.txs {
            let bytes = BASE64
                .decode(encoded)
                .map_err(|err| ClientError::Malformed(format!("bad tx payload in block {}: {}", height, err)))?;
            txs.push(bytes);
        }

        Ok(Block {
            chain_id: header.chain_id,
            height,
            time,
            txs,
        })
    }

    fn decode_tx(&self, bytes: &[u8]) -> Result<DecodedTx, ClientError> {
        codec::decode_tx(bytes).map_err(ClientError::from)
    }

    async fn query_tx_result(&self, hash: &[u8]) -> Result<TxResult, ClientError> {
        let param = format!("0x{}", hex::encode_upper(hash));
        let resp: TxResponse = self.call("tx", &[("hash", param)]).await?;

        let result = resp.tx_result;
        Ok(TxResult {
            code: result.code,
            log: result.log,
            gas_used: parse_gas("gas_used", &result.gas_used)?,
            gas_wanted: parse_gas("gas_wanted", &result.gas_wanted)?,
        })
    }

    fn encode_address(&self, account: &[u8]) -> Result<String, ClientError> {
        let hrp = Hrp::parse(&self.account_prefix).map_err(|err| ClientError::Address(err.to_string()))?;
        bech32::encode::<Bech32>(hrp, account).map_err(|err| ClientError::Address(err.to_string()))
    }
}

// Gas counters arrive as decimal strings over JSON-RPC.
fn parse_gas(field: &str, value: &str) -> Result<i64, ClientError> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|err| ClientError::Malformed(format!("bad {} {:?}: {}", field, value, err)))
}

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: String,
}

#[derive(Deserialize)]
struct BlockResponse {
    block: RawBlock,
}

#[derive(Deserialize)]
struct RawBlock {
    header: RawHeader,
    data: RawBlockData,
}

#[derive(Deserialize)]
struct RawHeader {
    chain_id: String,
    height: String,
    time: String,
}

#[derive(Deserialize)]
struct RawBlockData {
    #[serde(default)]
    txs: Vec<String>,
}

#[derive(Deserialize)]
struct TxResponse {
    tx_result: RawTxResult,
}

#[derive(Deserialize)]
struct RawTxResult {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    gas_wanted: String,
    #[serde(default)]
    gas_used: String,
}
