use crate::error::{Error, Result};
use crate::models::{DigestFormat, DigestItem, NewsArticle, NewsCategory, NewsDigest, NewsResponse, Sentiment};
use crate::utils::{Clock, TimedCache};
use crate::validation::validate_news_count;
use async_trait::async_trait;
use chrono::Duration;
use log::{info, warn};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

pub mod cryptopanic;
pub mod newsapi;

pub use cryptopanic::CryptoPanicSource;
pub use newsapi::NewsApiSource;

pub const NEWS_TTL_MS: i64 = 300_000;
pub const TRENDING_LIMIT: usize = 5;
pub const MOBILE_SUMMARY_CHARS: usize = 100;

const MIN_TOPIC_CHARS: usize = 4;
const STOP_WORDS: [&str; 17] = [
    "that", "this", "with", "from", "have", "will", "been", "were", "they", "their", "what", "when", "which",
    "about", "after", "into", "more",
];

const POSITIVE_WORDS: &[&str] = &[
    "surge", "surges", "rally", "rallies", "gain", "gains", "soar", "soars", "bullish", "record", "approved",
    "approval", "adoption", "partnership", "upgrade", "growth", "rise", "rises", "jump", "jumps", "launch",
    "launches",
];
const NEGATIVE_WORDS: &[&str] = &[
    "hack", "hacked", "exploit", "crash", "crashes", "plunge", "plunges", "bearish", "lawsuit", "sues", "fraud",
    "scam", "ban", "bans", "decline", "falls", "drop", "drops", "loss", "losses", "outage", "selloff",
];

/// Keyword-count sentiment for sources that don't carry their own signal.
pub fn lexicon_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let (mut pos, mut neg) = (0usize, 0usize);
    for word in lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        if POSITIVE_WORDS.contains(&word) {
            pos += 1;
        } else if NEGATIVE_WORDS.contains(&word) {
            neg += 1;
        }
    }
    match pos.cmp(&neg) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self) -> Result<Vec<NewsArticle>>;
}

/// Sorts newest first, then keeps the first article for each lowercased
/// title and each url.
pub fn merge_articles(mut articles: Vec<NewsArticle>) -> Vec<NewsArticle> {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let mut titles = HashSet::new();
    let mut urls = HashSet::new();
    articles
        .into_iter()
        .filter(|a| {
            let title = a.title.to_lowercase();
            if titles.contains(&title) || urls.contains(&a.url) {
                return false;
            }
            titles.insert(title);
            urls.insert(a.url.clone());
            true
        })
        .collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Merges two news feeds behind a five-minute cache.
pub struct NewsAggregator {
    primary: Arc<dyn NewsSource>,
    secondary: Arc<dyn NewsSource>,
    cache: TimedCache<NewsResponse>,
    clock: Arc<dyn Clock>,
    splitter: Regex,
}

impl fmt::Debug for NewsAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsAggregator")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .field("cache", &self.cache)
            .finish()
    }
}

impl NewsAggregator {
    pub fn new(primary: Arc<dyn NewsSource>, secondary: Arc<dyn NewsSource>, clock: Arc<dyn Clock>) -> Result<Self> {
        let splitter = Regex::new(r"[^A-Za-z0-9_]+").map_err(|e| Error::ConfigError(e.to_string()))?;
        Ok(Self {
            primary,
            secondary,
            cache: TimedCache::new("news", Duration::milliseconds(NEWS_TTL_MS), clock.clone()),
            clock,
            splitter,
        })
    }

    /// Most frequent words across titles and summaries. Ties keep the order
    /// in which words were first seen.
    pub fn trending_topics(&self, articles: &[NewsArticle]) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for article in articles {
            let text = format!("{} {}", article.title, article.summary).to_lowercase();
            for token in self.splitter.split(&text) {
                if token.chars().count() < MIN_TOPIC_CHARS || STOP_WORDS.contains(&token) {
                    continue;
                }
                let count = counts.entry(token.to_string()).or_insert(0);
                if *count == 0 {
                    order.push(token.to_string());
                }
                *count += 1;
            }
        }

        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.truncate(TRENDING_LIMIT);
        order
    }

    async fn fetch_source(source: &dyn NewsSource) -> Option<Vec<NewsArticle>> {
        match source.fetch().await {
            Ok(articles) => Some(articles),
            Err(e) => {
                warn!("{} fetch failed: {}", source.name(), e);
                None
            }
        }
    }

    async fn fetch_fresh(&self) -> Result<NewsResponse> {
        let (primary, secondary) = tokio::join!(
            Self::fetch_source(self.primary.as_ref()),
            Self::fetch_source(self.secondary.as_ref())
        );
        if primary.is_none() && secondary.is_none() {
            return Err(Error::ApiError("all news sources failed".to_string()));
        }

        let combined: Vec<NewsArticle> = primary
            .unwrap_or_default()
            .into_iter()
            .chain(secondary.unwrap_or_default())
            .collect();
        let total = combined.len();
        let articles = merge_articles(combined);
        info!("Aggregated {} articles ({} duplicates dropped)", articles.len(), total - articles.len());

        Ok(NewsResponse {
            trending_topics: self.trending_topics(&articles),
            articles,
            fetched_at: self.clock.now(),
        })
    }

    /// Current merged feed. A failed source contributes no articles; when
    /// every source fails and nothing is cached the feed is empty.
    pub async fn latest(&self) -> NewsResponse {
        match self.cache.get_or_fetch(|| self.fetch_fresh()).await {
            Ok(response) => response,
            Err(e) => {
                warn!("No news available: {}", e);
                NewsResponse {
                    articles: Vec::new(),
                    trending_topics: Vec::new(),
                    fetched_at: self.clock.now(),
                }
            }
        }
    }

    pub async fn digest(&self, category: NewsCategory, count: usize, format: DigestFormat) -> Result<NewsDigest> {
        validate_news_count(count)?;
        let response = self.latest().await;

        let items = response
            .articles
            .iter()
            .filter(|a| category == NewsCategory::General || a.categories.contains(&category))
            .take(count)
            .map(|a| match format {
                DigestFormat::Mobile => DigestItem {
                    title: a.title.clone(),
                    source: a.source.clone(),
                    summary: truncate_chars(&a.summary, MOBILE_SUMMARY_CHARS),
                    published_at: a.published_at,
                    url: None,
                    categories: None,
                    sentiment: None,
                },
                DigestFormat::Detailed => DigestItem {
                    title: a.title.clone(),
                    source: a.source.clone(),
                    summary: a.summary.clone(),
                    published_at: a.published_at,
                    url: Some(a.url.clone()),
                    categories: Some(a.categories.clone()),
                    sentiment: Some(a.sentiment),
                },
            })
            .collect();

        Ok(NewsDigest {
            category,
            format,
            items,
            trending_topics: response.trending_topics,
            generated_at: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;
    use chrono::{DateTime, TimeZone, Utc};
    use tokio_test::{assert_err, assert_ok};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn article(title: &str, url: &str, minutes_ago: i64, categories: Vec<NewsCategory>) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            summary: String::new(),
            source: "test".to_string(),
            url: url.to_string(),
            published_at: start() - Duration::minutes(minutes_ago),
            categories,
            sentiment: Sentiment::Neutral,
        }
    }

    fn source(name: &'static str, result: Result<Vec<NewsArticle>>) -> Arc<dyn NewsSource> {
        let mut mock = MockNewsSource::new();
        mock.expect_name().return_const(name);
        mock.expect_fetch().return_once(move || result);
        Arc::new(mock)
    }

    fn aggregator(primary: Arc<dyn NewsSource>, secondary: Arc<dyn NewsSource>) -> NewsAggregator {
        let clock = Arc::new(ManualClock::new(start()));
        NewsAggregator::new(primary, secondary, clock).unwrap()
    }

    #[test]
    fn test_merge_sorts_and_dedupes() {
        let merged = merge_articles(vec![
            article("Old story", "https://a/1", 60, vec![]),
            article("Fresh story", "https://a/2", 5, vec![]),
            article("FRESH STORY", "https://b/9", 1, vec![]),
            article("Different title", "https://a/1", 30, vec![]),
        ]);
        let titles: Vec<_> = merged.iter().map(|a| a.title.as_str()).collect();
        // the newest copy of a duplicate wins
        assert_eq!(titles, vec!["FRESH STORY", "Different title"]);
    }

    #[test]
    fn test_trending_drops_short_and_stop_words() {
        let agg = aggregator(source("a", Ok(vec![])), source("b", Ok(vec![])));
        let mut articles = Vec::new();
        for i in 0..3 {
            let mut a = article("DeFi DeFi DeFi NFT", &format!("https://x/{}", i), i, vec![]);
            a.summary = "this will be about staking".to_string();
            articles.push(a);
        }
        let topics = agg.trending_topics(&articles);
        assert_eq!(topics, vec!["defi", "staking"]);
    }

    #[test]
    fn test_trending_splits_on_non_ascii_letters() {
        let agg = aggregator(source("a", Ok(vec![])), source("b", Ok(vec![])));
        let articles = vec![article("naïve staking", "https://x", 0, vec![])];
        assert_eq!(agg.trending_topics(&articles), vec!["staking"]);
    }

    #[test]
    fn test_trending_ties_keep_first_seen() {
        let agg = aggregator(source("a", Ok(vec![])), source("b", Ok(vec![])));
        let articles = vec![article(
            "zeta alpha gamma delta omega sigma kappa",
            "https://x",
            0,
            vec![],
        )];
        assert_eq!(agg.trending_topics(&articles), vec!["zeta", "alpha", "gamma", "delta", "omega"]);
    }

    #[test]
    fn test_lexicon_sentiment() {
        assert_eq!(lexicon_sentiment("Bitcoin surges to record high"), Sentiment::Positive);
        assert_eq!(lexicon_sentiment("Exchange hacked, token crashes"), Sentiment::Negative);
        assert_eq!(lexicon_sentiment("Ethereum developers meet"), Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_failed_source_degrades_to_empty() {
        let agg = aggregator(
            source("a", Err(Error::NetworkError("timeout".into()))),
            source("b", Ok(vec![article("Solana upgrade ships", "https://b/1", 3, vec![NewsCategory::Solana])])),
        );
        let response = agg.latest().await;
        assert_eq!(response.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_empty_feed() {
        let agg = aggregator(
            source("a", Err(Error::NetworkError("timeout".into()))),
            source("b", Err(Error::RateLimitExceeded("slow down".into()))),
        );
        let response = agg.latest().await;
        assert!(response.articles.is_empty());
        assert!(response.trending_topics.is_empty());
    }

    #[tokio::test]
    async fn test_digest_filters_and_formats() {
        let long_summary = "x".repeat(150);
        let mut sol = article("Solana validators upgrade", "https://a/1", 1, vec![NewsCategory::Solana]);
        sol.summary = long_summary.clone();
        let agg = aggregator(
            source(
                "a",
                Ok(vec![
                    sol,
                    article("Bitcoin miners rally", "https://a/2", 2, vec![NewsCategory::Bitcoin]),
                ]),
            ),
            source("b", Ok(vec![])),
        );

        let digest = assert_ok!(agg.digest(NewsCategory::Solana, 5, DigestFormat::Mobile).await);
        assert_eq!(digest.items.len(), 1);
        assert_eq!(digest.items[0].summary.chars().count(), MOBILE_SUMMARY_CHARS);
        assert!(digest.items[0].url.is_none());

        // served from cache, the mock sources only answer once
        let detailed = assert_ok!(agg.digest(NewsCategory::General, 1, DigestFormat::Detailed).await);
        assert_eq!(detailed.items.len(), 1);
        assert_eq!(detailed.items[0].summary, long_summary);
        assert_eq!(detailed.items[0].url.as_deref(), Some("https://a/1"));
        assert_eq!(detailed.items[0].sentiment, Some(Sentiment::Neutral));
    }

    #[tokio::test]
    async fn test_digest_rejects_bad_count() {
        let agg = aggregator(source("a", Ok(vec![])), source("b", Ok(vec![])));
        let err = assert_err!(agg.digest(NewsCategory::General, 0, DigestFormat::Mobile).await);
        assert!(err.is_validation());
        assert_err!(agg.digest(NewsCategory::General, 21, DigestFormat::Mobile).await);
    }
}
