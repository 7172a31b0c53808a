use crate::error::{Error, Result};
use crate::utils::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcConfig,
    pub market: MarketConfig,
    pub news: NewsConfig,
    pub retry: RetryConfig,
    pub wallet: WalletConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RpcConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://api.mainnet-beta.solana.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MarketConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: None,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NewsConfig {
    pub newsapi_url: String,
    pub newsapi_key: Option<String>,
    pub newsapi_query: String,
    pub cryptopanic_url: String,
    pub cryptopanic_key: Option<String>,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            newsapi_url: "https://newsapi.org/v2".to_string(),
            newsapi_key: None,
            newsapi_query: "cryptocurrency OR bitcoin OR ethereum OR solana OR defi".to_string(),
            cryptopanic_url: "https://cryptopanic.com/api/v1".to_string(),
            cryptopanic_key: None,
            page_size: 50,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WalletConfig {
    /// Signatures fetched per wallet activity request.
    pub activity_sample_size: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            activity_sample_size: 50,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Overlays endpoint and key settings from the environment (and `.env`).
    pub fn apply_env(mut self) -> Self {
        dotenv::dotenv().ok();
        if let Ok(url) = env::var("SOLANA_RPC_URL") {
            self.rpc.url = url;
        }
        if let Ok(key) = env::var("COINGECKO_API_KEY") {
            self.market.api_key = Some(key);
        }
        if let Ok(key) = env::var("NEWSAPI_KEY") {
            self.news.newsapi_key = Some(key);
        }
        if let Ok(key) = env::var("CRYPTOPANIC_KEY") {
            self.news.cryptopanic_key = Some(key);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc.url.trim().is_empty() {
            return Err(Error::ConfigError("rpc.url cannot be empty".to_string()));
        }
        if self.market.base_url.trim().is_empty() {
            return Err(Error::ConfigError("market.base_url cannot be empty".to_string()));
        }
        if self.wallet.activity_sample_size == 0 {
            return Err(Error::ConfigError("wallet.activity_sample_size must be positive".to_string()));
        }
        Ok(())
    }
}
