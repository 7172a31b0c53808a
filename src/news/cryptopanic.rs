use super::{lexicon_sentiment, NewsSource};
use crate::config::NewsConfig;
use crate::error::{Error, Result};
use crate::models::{NewsArticle, NewsCategory, Sentiment};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    title: String,
    url: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    currencies: Vec<RawCurrency>,
    #[serde(default)]
    votes: Option<RawVotes>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    title: String,
}

#[derive(Debug, Deserialize)]
struct RawCurrency {
    code: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawVotes {
    #[serde(default)]
    positive: u32,
    #[serde(default)]
    negative: u32,
}

fn category_for_code(code: &str) -> Option<NewsCategory> {
    match code.to_uppercase().as_str() {
        "BTC" => Some(NewsCategory::Bitcoin),
        "ETH" => Some(NewsCategory::Ethereum),
        "SOL" => Some(NewsCategory::Solana),
        _ => None,
    }
}

impl RawPost {
    fn into_article(self) -> NewsArticle {
        let mut categories = NewsCategory::detect(&self.title);
        for cat in self.currencies.iter().filter_map(|c| category_for_code(&c.code)) {
            if !categories.contains(&cat) {
                categories.push(cat);
            }
        }

        let votes = self.votes.unwrap_or_default();
        let sentiment = if votes.positive > votes.negative {
            Sentiment::Positive
        } else if votes.negative > votes.positive {
            Sentiment::Negative
        } else {
            lexicon_sentiment(&self.title)
        };

        // The feed has no body text; the currency tags stand in as a summary.
        let summary = if self.currencies.is_empty() {
            String::new()
        } else {
            let codes: Vec<&str> = self.currencies.iter().map(|c| c.code.as_str()).collect();
            format!("Mentions {}", codes.join(", "))
        };

        NewsArticle {
            title: self.title,
            summary,
            source: self
                .source
                .map(|s| s.title)
                .unwrap_or_else(|| "CryptoPanic".to_string()),
            url: self.url,
            published_at: self.published_at,
            categories,
            sentiment,
        }
    }
}

/// Crypto-specific feed with currency tags and community votes.
#[derive(Debug, Clone)]
pub struct CryptoPanicSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CryptoPanicSource {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.cryptopanic_url.trim_end_matches('/').to_string(),
            api_key: config.cryptopanic_key.clone(),
        })
    }
}

#[async_trait]
impl NewsSource for CryptoPanicSource {
    fn name(&self) -> &'static str {
        "CryptoPanic"
    }

    async fn fetch(&self) -> Result<Vec<NewsArticle>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ConfigError("CryptoPanic key is not configured".to_string()))?;

        let response = self
            .client
            .get(format!("{}/posts/", self.base_url))
            .query(&[("auth_token", key), ("kind", "news"), ("public", "true")])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(Error::RateLimitExceeded("CryptoPanic rate limit exceeded".to_string()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::ApiAuthFailed("CryptoPanic rejected the token".to_string()))
            }
            status => return Err(Error::ApiError(format!("CryptoPanic returned {}", status))),
        }

        let body: PostsResponse = response.json().await?;
        let articles: Vec<NewsArticle> = body.results.into_iter().map(RawPost::into_article).collect();
        info!("CryptoPanic returned {} articles", articles.len());
        Ok(articles)
    }
}
