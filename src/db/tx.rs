use sqlx::{Pool, Sqlite};

use crate::models::TxRow;

/// Insert a transaction row. Returns false when the hash was already indexed
/// and the insert was skipped.
pub async fn insert_tx(pool: &Pool<Sqlite>, tx: &TxRow) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO txs (hash, block_time, chain_id, block_height, raw_log, code, gas_used, gas_wanted, fee_amount, fee_denom)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(hash) DO NOTHING",
    )
    .bind(&tx.hash)
    .bind(tx.block_time)
    .bind(&tx.chain_id)
    .bind(tx.block_height)
    .bind(&tx.raw_log)
    .bind(tx.code)
    .bind(tx.gas_used)
    .bind(tx.gas_wanted)
    .bind(&tx.fee_amount)
    .bind(&tx.fee_denom)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Highest indexed height for a chain, `None` when the chain has no rows.
pub async fn last_indexed_height(pool: &Pool<Sqlite>, chain_id: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT MAX(block_height) FROM txs WHERE chain_id = ?")
        .bind(chain_id)
        .fetch_one(pool)
        .await
}
