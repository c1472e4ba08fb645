// Row models for the five indexer tables. One struct per table shape;
// the three packet-message tables (recvpacket, timeout, ack) share PacketMsgRow.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxRow {
    pub hash: Vec<u8>,
    pub block_time: i64,
    pub chain_id: String,
    pub block_height: i64,
    pub raw_log: String,
    pub code: i64,
    pub fee_amount: String,
    pub fee_denom: String,
    pub gas_used: i64,
    pub gas_wanted: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRow {
    pub tx_hash: Vec<u8>,
    pub msg_index: i64,
    pub signer: String,
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub denom: String,
    pub src_chan: String,
    pub src_port: String,
    pub route: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketMsgRow {
    pub tx_hash: Vec<u8>,
    pub msg_index: i64,
    pub signer: String,
    pub src_chan: String,
    pub dst_chan: String,
    pub src_port: String,
    pub dst_port: String,
}
