// Initialize logging and configuration
// Create the database pool and run migrations
// Build the chain client and indexer
// Resume from the last indexed height and index the configured range

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ibc_indexer::chain::HttpChainClient;
use ibc_indexer::config::Config;
use ibc_indexer::db;
use ibc_indexer::indexer::Indexer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Starting ibc-indexer for {}", config.chain_id);

    let pool = match db::connection::establish_connection(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("failed to connect to db, ensure db server is running & check conn string: {}", err);
            return Err(err.into());
        }
    };
    db::migration::run_migrations(&pool).await?;

    let client = match HttpChainClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!("failed to build chain client for {}: {}", config.chain_id, err);
            return Err(err.into());
        }
    };

    let indexer = Arc::new(Indexer::new(client, pool, &config));

    // Resume past whatever is already indexed for this chain.
    let start = match indexer.last_indexed_height().await? {
        Some(last) => config.start_height.max(last as u64 + 1),
        None => config.start_height,
    };
    if config.end_height < start {
        info!("Nothing to index: end height {} is below start height {}", config.end_height, start);
        return Ok(());
    }

    let heights: Vec<u64> = (start..=config.end_height).collect();
    if let Err(err) = indexer.index_range(heights, config.parallelism).await {
        error!("failed to index blocks: {}", err);
        return Err(err.into());
    }

    info!("Indexed heights {}..={} for {}", start, config.end_height, config.chain_id);
    Ok(())
}
