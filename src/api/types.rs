use crate::error::{Error, Result};
use crate::models::{PriceQuote, ReferenceToken};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of `GET /coins/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinListEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

impl CoinListEntry {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::ApiInvalidData("Empty token ID".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(Error::ApiInvalidData(format!("Empty symbol for token {}", self.id)));
        }
        Ok(())
    }
}

impl From<CoinListEntry> for ReferenceToken {
    fn from(entry: CoinListEntry) -> Self {
        ReferenceToken {
            id: entry.id,
            symbol: entry.symbol,
            name: entry.name,
        }
    }
}

/// Row of `GET /coins/markets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CoinMarket {
    pub fn into_quote(self) -> Result<PriceQuote> {
        let price = self
            .current_price
            .ok_or_else(|| Error::ApiInvalidData(format!("No price available for {}", self.id)))?;
        if !price.is_finite() || price < 0.0 {
            return Err(Error::ApiInvalidData(format!("Invalid price for {}: {}", self.id, price)));
        }
        let volume = self.total_volume.unwrap_or_default();
        if volume < 0.0 {
            return Err(Error::ApiInvalidData(format!("Negative trading volume for {}", self.id)));
        }

        Ok(PriceQuote {
            id: self.id,
            symbol: self.symbol.to_uppercase(),
            name: self.name,
            price_usd: price,
            change_24h: self
                .price_change_percentage_24h_in_currency
                .or(self.price_change_percentage_24h),
            change_7d: self.price_change_percentage_7d_in_currency,
            volume_24h: volume,
            last_updated: self.last_updated.unwrap_or_else(Utc::now),
        })
    }
}
