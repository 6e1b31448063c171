use eyre::{eyre, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

use crate::models::PriceQuote;

// CoinMarketCap wire shapes, trimmed to the fields the dashboard shows.

#[derive(Debug, Deserialize)]
struct CmcResponse {
    data: HashMap<String, CmcAsset>,
}

#[derive(Debug, Deserialize)]
struct CmcAsset {
    name: String,
    symbol: String,
    circulating_supply: Option<f64>,
    total_supply: Option<f64>,
    platform: Option<CmcPlatform>,
    last_updated: String,
    quote: HashMap<String, CmcQuote>,
}

#[derive(Debug, Deserialize)]
struct CmcPlatform {
    name: String,
    token_address: String,
}

#[derive(Debug, Deserialize)]
struct CmcQuote {
    price: f64,
    volume_24h: f64,
    market_cap: f64,
    percent_change_1h: f64,
    percent_change_24h: f64,
    percent_change_7d: f64,
}

/// Quote client for a CoinMarketCap-compatible price API. The key is
/// optional at startup so the rest of the dashboard works without one; the
/// quote route reports the gap instead.
#[derive(Debug, Clone)]
pub struct PriceClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PriceClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { http, base_url: base_url.into(), api_key })
    }

    /// Fetch the latest USD quote for `symbol` and flatten it.
    pub async fn latest_quote(&self, symbol: &str) -> Result<PriceQuote> {
        let api_key =
            self.api_key.as_deref().ok_or_else(|| eyre!("price API key not configured"))?;
        let endpoint = format!("{}/v1/cryptocurrency/quotes/latest", self.base_url);

        info!("📡 Fetching {} quote → {}", symbol, endpoint);

        let resp = self
            .http
            .get(&endpoint)
            .header("X-CMC_PRO_API_KEY", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("symbol", symbol), ("convert", "USD")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(eyre!("price API error: HTTP {}", resp.status()));
        }

        let body: CmcResponse = resp.json().await?;
        let asset = body
            .data
            .get(symbol)
            .ok_or_else(|| eyre!("price API returned no data for {}", symbol))?;
        let usd = asset
            .quote
            .get("USD")
            .ok_or_else(|| eyre!("price API returned no USD quote for {}", symbol))?;

        Ok(PriceQuote {
            name: asset.name.clone(),
            symbol: asset.symbol.clone(),
            price: usd.price,
            volume_24h: usd.volume_24h,
            market_cap: usd.market_cap,
            percent_change_1h: usd.percent_change_1h,
            percent_change_24h: usd.percent_change_24h,
            percent_change_7d: usd.percent_change_7d,
            circulating_supply: asset.circulating_supply,
            total_supply: asset.total_supply,
            platform: asset.platform.as_ref().map(|p| p.name.clone()),
            token_address: asset.platform.as_ref().map(|p| p.token_address.clone()),
            last_updated: asset.last_updated.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmc_payload_flattens() {
        let body = r#"{
            "data": {
                "USDe": {
                    "name": "Ethena USDe",
                    "symbol": "USDe",
                    "circulating_supply": 2400000000.0,
                    "total_supply": 2400000000.0,
                    "platform": { "name": "Ethereum", "token_address": "0x4c9edd5852cd905f086c759e8383e09bff1e68b3" },
                    "last_updated": "2024-01-01T00:00:00.000Z",
                    "quote": {
                        "USD": {
                            "price": 1.0003,
                            "volume_24h": 42000000.0,
                            "market_cap": 2400000000.0,
                            "percent_change_1h": 0.01,
                            "percent_change_24h": -0.02,
                            "percent_change_7d": 0.05
                        }
                    }
                }
            }
        }"#;
        let parsed: CmcResponse = serde_json::from_str(body).unwrap();
        let asset = &parsed.data["USDe"];
        assert_eq!(asset.symbol, "USDe");
        assert_eq!(asset.quote["USD"].price, 1.0003);
        assert_eq!(asset.platform.as_ref().unwrap().name, "Ethereum");
    }
}
