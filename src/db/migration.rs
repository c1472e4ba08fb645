use sqlx::SqlitePool;
use tracing::info;

const TXS: &str = "CREATE TABLE IF NOT EXISTS txs (
    hash BLOB PRIMARY KEY,
    block_time INTEGER NOT NULL,
    chain_id TEXT NOT NULL,
    block_height INTEGER NOT NULL,
    raw_log TEXT NOT NULL,
    code INTEGER NOT NULL,
    fee_amount TEXT,
    fee_denom TEXT,
    gas_used INTEGER NOT NULL,
    gas_wanted INTEGER NOT NULL
)";

const MSG_TRANSFER: &str = "CREATE TABLE IF NOT EXISTS msg_transfer (
    tx_hash BLOB,
    msg_index INTEGER,
    signer TEXT NOT NULL,
    sender TEXT NOT NULL,
    receiver TEXT NOT NULL,
    amount TEXT NOT NULL,
    denom TEXT NOT NULL,
    src_chan TEXT NOT NULL,
    src_port TEXT NOT NULL,
    route TEXT NOT NULL,
    PRIMARY KEY (tx_hash, msg_index),
    FOREIGN KEY (tx_hash) REFERENCES txs(hash) ON DELETE CASCADE
)";

const MSG_RECVPACKET: &str = "CREATE TABLE IF NOT EXISTS msg_recvpacket (
    tx_hash BLOB,
    msg_index INTEGER,
    signer TEXT NOT NULL,
    src_chan TEXT NOT NULL,
    dst_chan TEXT NOT NULL,
    src_port TEXT NOT NULL,
    dst_port TEXT NOT NULL,
    PRIMARY KEY (tx_hash, msg_index),
    FOREIGN KEY (tx_hash) REFERENCES txs(hash) ON DELETE CASCADE
)";

const MSG_TIMEOUT: &str = "CREATE TABLE IF NOT EXISTS msg_timeout (
    tx_hash BLOB,
    msg_index INTEGER,
    signer TEXT NOT NULL,
    src_chan TEXT NOT NULL,
    dst_chan TEXT NOT NULL,
    src_port TEXT NOT NULL,
    dst_port TEXT NOT NULL,
    PRIMARY KEY (tx_hash, msg_index),
    FOREIGN KEY (tx_hash) REFERENCES txs(hash) ON DELETE CASCADE
)";

const MSG_ACK: &str = "CREATE TABLE IF NOT EXISTS msg_ack (
    tx_hash BLOB,
    msg_index INTEGER,
    signer TEXT NOT NULL,
    src_chan TEXT NOT NULL,
    dst_chan TEXT NOT NULL,
    src_port TEXT NOT NULL,
    dst_port TEXT NOT NULL,
    PRIMARY KEY (tx_hash, msg_index),
    FOREIGN KEY (tx_hash) REFERENCES txs(hash) ON DELETE CASCADE
)";

// Covers the resume query (MAX(block_height) per chain).
const IDX_TXS_CHAIN_HEIGHT: &str =
    "CREATE INDEX IF NOT EXISTS idx_txs_chain_height ON txs(chain_id, block_height)";

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    for statement in [TXS, MSG_TRANSFER, MSG_RECVPACKET, MSG_TIMEOUT, MSG_ACK, IDX_TXS_CHAIN_HEIGHT] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database migrations completed");
    Ok(())
}
