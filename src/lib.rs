pub mod chain;
pub mod config;
pub mod db;
pub mod indexer;
pub mod models;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use chain::{ChainClient, ClientError, HttpChainClient};
pub use indexer::{IndexError, Indexer};
pub use models::{PacketMsgRow, TransferRow, TxRow};
