use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::chain::codec::{classify, MsgKind, PacketMsg};
use crate::chain::{Block, ChainClient};
use crate::db;
use crate::db::messages::PacketTable;
use crate::models::{PacketMsgRow, TransferRow, TxRow};

/// Persist every transaction in a block, and each transaction's recognized
/// messages, best-effort. Failures below block granularity are logged and
/// skipped: a transaction that fails to decode or to resolve its execution
/// result produces no rows, and a failed insert does not stop the remaining
/// messages or transactions.
pub async fn persist_block(client: &dyn ChainClient, pool: &SqlitePool, chain_id: &str, block: &Block) {
    let total = block.txs.len();
    for (index, raw) in block.txs.iter().enumerate() {
        let decoded = match client.decode_tx(raw) {
            Ok(tx) => tx,
            Err(err) => {
                // Application-specific txs (DEX swaps, deployments, ...) land here.
                warn!(
                    "[height {}] {{{}/{} txs}} - failed to decode tx: {}",
                    block.height, index + 1, total, err
                );
                continue;
            }
        };

        let hash = Sha256::digest(raw).to_vec();
        let result = match client.query_tx_result(&hash).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    "[height {}] {{{}/{} txs}} - failed to query tx result: {}",
                    block.height, index + 1, total, err
                );
                continue;
            }
        };

        // Failed transactions get their log wrapped in a one-field error
        // object; successful logs pass through verbatim.
        let raw_log = if result.code > 0 {
            serde_json::json!({ "error": result.log }).to_string()
        } else {
            result.log.clone()
        };
        let (fee_amount, fee_denom) = decoded.fee_parts();

        let row = TxRow {
            hash: hash.clone(),
            block_time: block.time,
            chain_id: chain_id.to_string(),
            block_height: block.height as i64,
            raw_log,
            code: result.code as i64,
            fee_amount,
            fee_denom,
            gas_used: result.gas_used,
            gas_wanted: result.gas_wanted,
        };
        match db::tx::insert_tx(pool, &row).await {
            Ok(_) => info!(
                "[height {}] {{{}/{} txs}} - wrote tx to db with {} msgs",
                block.height, index + 1, total, decoded.messages.len()
            ),
            Err(err) => warn!(
                "[height {}] {{{}/{} txs}} - failed to write tx to db: {}",
                block.height, index + 1, total, err
            ),
        }

        for (msg_index, msg) in decoded.messages.iter().enumerate() {
            persist_msg(client, pool, block.height, &hash, msg_index, classify(msg)).await;
        }
    }
}

async fn persist_msg(
    client: &dyn ChainClient,
    pool: &SqlitePool,
    height: u64,
    tx_hash: &[u8],
    msg_index: usize,
    kind: MsgKind,
) {
    match kind {
        MsgKind::Transfer(m) => {
            // Same derivation as re-encoding the message's signer account:
            // falls back to the sender string when it is not a parseable address.
            let signer = m
                .signer
                .as_deref()
                .and_then(|account| client.encode_address(account).ok())
                .unwrap_or_else(|| m.sender.clone());
            let row = TransferRow {
                tx_hash: tx_hash.to_vec(),
                msg_index: msg_index as i64,
                signer,
                sender: m.sender,
                receiver: m.receiver,
                amount: m.amount,
                denom: m.denom,
                src_chan: m.source_channel,
                src_port: m.source_port,
                route: m.route,
            };
            if let Err(err) = db::messages::insert_transfer(pool, &row).await {
                warn!("Failed to insert MsgTransfer at index {} height {}: {}", msg_index, height, err);
            }
        }
        MsgKind::RecvPacket(m) => {
            insert_packet(pool, PacketTable::RecvPacket, height, tx_hash, msg_index, m).await
        }
        MsgKind::Timeout(m) => {
            insert_packet(pool, PacketTable::Timeout, height, tx_hash, msg_index, m).await
        }
        MsgKind::Ack(m) => insert_packet(pool, PacketTable::Ack, height, tx_hash, msg_index, m).await,
        MsgKind::Unrecognized => {}
    }
}

async fn insert_packet(
    pool: &SqlitePool,
    table: PacketTable,
    height: u64,
    tx_hash: &[u8],
    msg_index: usize,
    m: PacketMsg,
) {
    let row = PacketMsgRow {
        tx_hash: tx_hash.to_vec(),
        msg_index: msg_index as i64,
        signer: m.signer,
        src_chan: m.source_channel,
        dst_chan: m.destination_channel,
        src_port: m.source_port,
        dst_port: m.destination_port,
    };
    if let Err(err) = db::messages::insert_packet_msg(pool, table, &row).await {
        warn!(
            "Failed to insert {} row at index {} height {}: {}",
            table.table_name(),
            msg_index,
            height,
            err
        );
    }
}
