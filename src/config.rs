use dotenvy::dotenv;
use eyre::{eyre, Result};
use std::env;

use crate::aggregator::RankBy;

#[derive(Debug, Clone)]
pub struct Config {
    pub stake_subgraph_url: String,
    pub token_subgraph_url: String,
    pub mint_subgraph_url: String,
    pub price_api_url: String,
    pub price_api_key: Option<String>,
    pub price_symbol: String,
    pub port: u16,
    pub decimals: u32,
    pub top_n: usize,
    pub rank_by: RankBy,
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // Load from .env file

    // The three subgraph endpoints have no sane defaults
    let stake_subgraph_url =
        env::var("STAKE_SUBGRAPH_URL").map_err(|_| eyre!("STAKE_SUBGRAPH_URL must be set"))?;
    let token_subgraph_url =
        env::var("TOKEN_SUBGRAPH_URL").map_err(|_| eyre!("TOKEN_SUBGRAPH_URL must be set"))?;
    let mint_subgraph_url =
        env::var("MINT_SUBGRAPH_URL").map_err(|_| eyre!("MINT_SUBGRAPH_URL must be set"))?;

    // Price API (key optional; the quote route errors without it)
    let price_api_url = env::var("COINMARKETCAP_BASE_URL")
        .unwrap_or_else(|_| "https://pro-api.coinmarketcap.com".to_string());
    let price_api_key = env::var("COINMARKETCAP_API_KEY").ok().filter(|k| !k.is_empty());
    let price_symbol = env::var("PRICE_SYMBOL").unwrap_or_else(|_| "USDe".to_string());

    // API port (default: 8080)
    let port = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    // Token base-unit exponent (default: 18)
    let decimals = env::var("TOKEN_DECIMALS")
        .unwrap_or_else(|_| "18".to_string())
        .parse()
        .unwrap_or(18);

    // Ranking depth for top-N groups (default: 10)
    let top_n = env::var("TOP_N")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    // Top-stakers basis: "gross" deposits or "net" of withdrawals
    let rank_by = env::var("RANK_STAKERS_BY")
        .unwrap_or_else(|_| "gross".to_string())
        .parse()
        .unwrap_or(RankBy::Gross);

    Ok(Config {
        stake_subgraph_url,
        token_subgraph_url,
        mint_subgraph_url,
        price_api_url,
        price_api_key,
        price_symbol,
        port,
        decimals,
        top_n,
        rank_by,
    })
}
