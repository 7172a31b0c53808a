use crate::api::types::{CoinListEntry, CoinMarket};
use crate::api::MarketDataProvider;
use crate::config::MarketConfig;
use crate::error::{Error, Result};
use crate::models::{PriceQuote, ReferenceToken};
use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn make_request<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("CoinGecko {}: {}", endpoint, e)))?;

        match response.status() {
            status if status.is_success() => response.json::<T>().await.map_err(|e| {
                error!("Failed to parse CoinGecko response: {}", e);
                Error::ApiInvalidFormat(format!("Failed to parse response: {}", e))
            }),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("CoinGecko rate limit hit on {}", endpoint);
                Err(Error::RateLimitExceeded("CoinGecko API rate limit exceeded".to_string()))
            }
            StatusCode::UNAUTHORIZED => Err(Error::ApiAuthFailed("Authentication failed".into())),
            StatusCode::FORBIDDEN => Err(Error::ApiQuotaExceeded("API quota exceeded".into())),
            StatusCode::SERVICE_UNAVAILABLE => Err(Error::ApiMaintenance("API is under maintenance".into())),
            status => {
                let error_msg = format!("API request failed with status: {}", status);
                error!("{}", error_msg);
                Err(Error::ApiError(error_msg))
            }
        }
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn list_tokens(&self) -> Result<Vec<ReferenceToken>> {
        let entries: Vec<CoinListEntry> = self.make_request("coins/list", &[]).await?;
        let total = entries.len();

        let tokens: Vec<ReferenceToken> = entries
            .into_iter()
            .filter(|entry| match entry.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping catalog entry: {}", e);
                    false
                }
            })
            .map(ReferenceToken::from)
            .collect();

        info!("Loaded {} of {} catalog entries", tokens.len(), total);
        Ok(tokens)
    }

    async fn get_quote(&self, id: &str) -> Result<Option<PriceQuote>> {
        let rows: Vec<CoinMarket> = self
            .make_request(
                "coins/markets",
                &[
                    ("vs_currency", "usd"),
                    ("ids", id),
                    ("price_change_percentage", "24h,7d"),
                ],
            )
            .await?;

        rows.into_iter()
            .find(|row| row.id == id)
            .map(CoinMarket::into_quote)
            .transpose()
    }
}
