use sqlx::{Pool, Sqlite};

use crate::models::{PacketMsgRow, TransferRow};

/// The three packet-message tables share one shape; inserts dispatch through
/// this closed enum, so adding a table is a one-place change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketTable {
    RecvPacket,
    Timeout,
    Ack,
}

impl PacketTable {
    pub fn table_name(self) -> &'static str {
        match self {
            PacketTable::RecvPacket => "msg_recvpacket",
            PacketTable::Timeout => "msg_timeout",
            PacketTable::Ack => "msg_ack",
        }
    }
}

/// Insert a transfer-message row. Returns false when `(tx_hash, msg_index)`
/// was already present and the insert was skipped.
pub async fn insert_transfer(pool: &Pool<Sqlite>, row: &TransferRow) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO msg_transfer (tx_hash, msg_index, amount, denom, src_chan, route, signer, sender, receiver, src_port)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(tx_hash, msg_index) DO NOTHING",
    )
    .bind(&row.tx_hash)
    .bind(row.msg_index)
    .bind(&row.amount)
    .bind(&row.denom)
    .bind(&row.src_chan)
    .bind(&row.route)
    .bind(&row.signer)
    .bind(&row.sender)
    .bind(&row.receiver)
    .bind(&row.src_port)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert a packet-message row into the table selected by `table`.
pub async fn insert_packet_msg(
    pool: &Pool<Sqlite>,
    table: PacketTable,
    row: &PacketMsgRow,
) -> Result<bool, sqlx::Error> {
    let query = format!(
        "INSERT INTO {} (tx_hash, msg_index, signer, src_chan, dst_chan, src_port, dst_port)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(tx_hash, msg_index) DO NOTHING",
        table.table_name()
    );
    let result = sqlx::query(&query)
        .bind(&row.tx_hash)
        .bind(row.msg_index)
        .bind(&row.signer)
        .bind(&row.src_chan)
        .bind(&row.dst_chan)
        .bind(&row.src_port)
        .bind(&row.dst_port)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
