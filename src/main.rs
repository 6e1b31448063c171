mod aggregator;
mod api;
mod config;
mod error;
mod models;
mod price;
mod subgraph;
mod units;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Stake dashboard starting...");

    // Load configuration
    let cfg = config::load()?;
    info!("Loaded config:");
    info!("  Stake subgraph: {}", cfg.stake_subgraph_url);
    info!("  Token subgraph: {}", cfg.token_subgraph_url);
    info!("  Mint subgraph: {}", cfg.mint_subgraph_url);
    info!("  Price symbol: {}", cfg.price_symbol);
    info!("  Port: {}", cfg.port);
    info!("  Decimals: {}, top-N: {}, rank stakers by: {:?}", cfg.decimals, cfg.top_n, cfg.rank_by);

    // Construct the clients once and hand them to the router
    let state = Arc::new(api::AppState {
        stake: subgraph::SubgraphClient::new(&cfg.stake_subgraph_url)?,
        token: subgraph::SubgraphClient::new(&cfg.token_subgraph_url)?,
        mint: subgraph::SubgraphClient::new(&cfg.mint_subgraph_url)?,
        price: price::PriceClient::new(&cfg.price_api_url, cfg.price_api_key.clone())?,
        price_symbol: cfg.price_symbol.clone(),
        options: aggregator::ReportOptions {
            decimals: cfg.decimals,
            top_n: cfg.top_n,
            rank_by: cfg.rank_by,
        },
    });

    // Spawn API task
    let api_handle = tokio::spawn({
        let cfg = cfg.clone();
        let state = Arc::clone(&state);
        async move { api::serve(cfg, state).await }
    });

    // Graceful shutdown
    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("API exited cleanly"),
            Ok(Err(e)) => error!("API error: {:?}", e),
            Err(e) => error!("API task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("Stake dashboard stopped.");
    Ok(())
}
