pub mod client;
pub mod codec;
pub mod models;

// Re-exports for convenience
pub use client::{ChainClient, ClientError, HttpChainClient};
pub use models::{Block, DecodedTx, TxResult};
