use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// One entry of the price provider's asset catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceToken {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

impl ReferenceToken {
    pub fn new(id: &str, symbol: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price_usd: f64,
    pub change_24h: Option<f64>,
    pub change_7d: Option<f64>,
    pub volume_24h: f64,
    pub last_updated: DateTime<Utc>,
}

impl PriceQuote {
    pub fn render(&self) -> String {
        let change = |c: Option<f64>| c.map_or_else(|| "n/a".to_string(), |v| format!("{:+.2}%", v));
        format!(
            "{} ({}): ${:.6}\n24h: {}  7d: {}\n24h volume: ${:.0}\nUpdated: {}\n",
            self.name,
            self.symbol,
            self.price_usd,
            change(self.change_24h),
            change(self.change_7d),
            self.volume_24h,
            self.last_updated.format("%Y-%m-%d %H:%M UTC")
        )
    }
}
