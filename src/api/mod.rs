use crate::error::{Error, Result};
use crate::models::{PriceQuote, ReferenceToken};
use crate::utils::{retry_with_backoff, Clock, RetryPolicy, TimedCache};
use crate::validation::validate_query;
use async_trait::async_trait;
use chrono::Duration;
use log::info;
use std::fmt;
use std::sync::Arc;

pub mod coingecko;
pub mod matcher;
pub mod types;

pub use coingecko::CoinGeckoClient;

/// How long a fetched asset catalog is served before refetching.
pub const REFERENCE_TTL_MS: i64 = 3_600_000;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Full asset catalog.
    async fn list_tokens(&self) -> Result<Vec<ReferenceToken>>;
    /// Spot price for one catalog id; `None` when the provider has no market.
    async fn get_quote(&self, id: &str) -> Result<Option<PriceQuote>>;
}

/// Price lookups by free-text query, backed by a cached asset catalog.
#[derive(Clone)]
pub struct PriceIndex {
    provider: Arc<dyn MarketDataProvider>,
    catalog: TimedCache<Vec<ReferenceToken>>,
    retry: RetryPolicy,
}

impl fmt::Debug for PriceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceIndex")
            .field("provider", &format_args!("<MarketDataProvider>"))
            .field("catalog", &self.catalog)
            .field("retry", &self.retry)
            .finish()
    }
}

impl PriceIndex {
    pub fn new(provider: Arc<dyn MarketDataProvider>, retry: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            catalog: TimedCache::new("reference list", Duration::milliseconds(REFERENCE_TTL_MS), clock),
            retry,
        }
    }

    pub async fn catalog(&self) -> Result<Vec<ReferenceToken>> {
        let provider = &self.provider;
        let retry = &self.retry;
        self.catalog
            .get_or_fetch(|| async move {
                retry_with_backoff(retry, "coins/list", || provider.list_tokens()).await
            })
            .await
    }

    pub async fn resolve(&self, query: &str) -> Result<Option<ReferenceToken>> {
        let catalog = self.catalog().await?;
        Ok(matcher::find_token(&catalog, query).cloned())
    }

    pub async fn quote(&self, query: &str) -> Result<PriceQuote> {
        validate_query(query)?;
        let token = self
            .resolve(query)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No token matches '{}'", query.trim())))?;
        info!("Resolved '{}' to {}", query.trim(), token.id);

        let provider = &self.provider;
        let id = token.id.as_str();
        retry_with_backoff(&self.retry, "coins/markets", || provider.get_quote(id))
            .await?
            .ok_or_else(|| Error::NotFound(format!("No market data for {}", token.id)))
    }
}
