use super::{lexicon_sentiment, NewsSource};
use crate::config::NewsConfig;
use crate::error::{Error, Result};
use crate::models::{NewsArticle, NewsCategory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    source: RawSource,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl RawArticle {
    fn into_article(self) -> Option<NewsArticle> {
        let title = self.title.filter(|t| !t.trim().is_empty() && t != "[Removed]")?;
        let url = self.url?;
        let summary = self.description.unwrap_or_default();
        let text = format!("{} {}", title, summary);
        Some(NewsArticle {
            categories: NewsCategory::detect(&text),
            sentiment: lexicon_sentiment(&text),
            source: self.source.name.unwrap_or_else(|| "NewsAPI".to_string()),
            published_at: self.published_at.unwrap_or_else(Utc::now),
            title,
            summary,
            url,
        })
    }
}

/// Keyword search over general news outlets.
#[derive(Debug, Clone)]
pub struct NewsApiSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    query: String,
    page_size: usize,
}

impl NewsApiSource {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.newsapi_url.trim_end_matches('/').to_string(),
            api_key: config.newsapi_key.clone(),
            query: config.newsapi_query.clone(),
            page_size: config.page_size.min(100),
        })
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &'static str {
        "NewsAPI"
    }

    async fn fetch(&self) -> Result<Vec<NewsArticle>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ConfigError("NewsAPI key is not configured".to_string()))?;

        let page_size = self.page_size.to_string();
        let response = self
            .client
            .get(format!("{}/everything", self.base_url))
            .query(&[
                ("q", self.query.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ])
            .header("X-Api-Key", key)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(Error::RateLimitExceeded("NewsAPI rate limit exceeded".to_string()))
            }
            StatusCode::UNAUTHORIZED => return Err(Error::ApiAuthFailed("NewsAPI rejected the key".to_string())),
            status => return Err(Error::ApiError(format!("NewsAPI returned {}", status))),
        }

        let body: EverythingResponse = response.json().await?;
        if body.status != "ok" {
            return Err(Error::ApiError(body.message.unwrap_or(body.status)));
        }

        let total = body.articles.len();
        let articles: Vec<NewsArticle> = body
            .articles
            .into_iter()
            .filter_map(RawArticle::into_article)
            .collect();
        if articles.len() < total {
            warn!("NewsAPI: dropped {} incomplete articles", total - articles.len());
        }
        info!("NewsAPI returned {} articles", articles.len());
        Ok(articles)
    }
}
