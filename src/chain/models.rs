use prost_types::Any;

use crate::chain::codec::Coin;

/// A fetched block: header fields plus the ordered raw transactions.
#[derive(Debug, Clone)]
pub struct Block {
    pub chain_id: String,
    pub height: u64,
    pub time: i64,
    pub txs: Vec<Vec<u8>>,
}

/// A decoded transaction: its fee and ordered protobuf messages.
#[derive(Debug, Clone)]
pub struct DecodedTx {
    pub fee: Option<Coin>,
    pub messages: Vec<Any>,
}

impl DecodedTx {
    /// Fee amount/denom pair, ("0", "") when the transaction carries no fee.
    pub fn fee_parts(&self) -> (String, String) {
        match &self.fee {
            Some(coin) => (coin.amount.clone(), coin.denom.clone()),
            None => ("0".to_string(), String::new()),
        }
    }
}

/// Execution result of a committed transaction.
#[derive(Debug, Clone)]
pub struct TxResult {
    pub code: u32,
    pub log: String,
    pub gas_used: i64,
    pub gas_wanted: i64,
}
