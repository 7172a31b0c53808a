use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub categories: Vec<NewsCategory>,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsResponse {
    pub articles: Vec<NewsArticle>,
    pub trending_topics: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    General,
    Bitcoin,
    Ethereum,
    Solana,
    Defi,
    Nft,
    Regulation,
}

impl NewsCategory {
    pub const TAGGED: [NewsCategory; 6] = [
        NewsCategory::Bitcoin,
        NewsCategory::Ethereum,
        NewsCategory::Solana,
        NewsCategory::Defi,
        NewsCategory::Nft,
        NewsCategory::Regulation,
    ];

    /// Lowercase keywords that tag an article with this category.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            NewsCategory::General => &[],
            NewsCategory::Bitcoin => &["bitcoin", "btc"],
            NewsCategory::Ethereum => &["ethereum", "eth", "ether"],
            NewsCategory::Solana => &["solana", "sol"],
            NewsCategory::Defi => &["defi", "dex", "liquidity", "yield", "lending", "staking"],
            NewsCategory::Nft => &["nft", "nfts", "collectible", "opensea"],
            NewsCategory::Regulation => &["sec", "regulation", "regulator", "lawsuit", "court", "ban", "cftc"],
        }
    }

    /// Categories whose keywords appear as whole words in `text`.
    pub fn detect(text: &str) -> Vec<NewsCategory> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        Self::TAGGED
            .iter()
            .copied()
            .filter(|cat| cat.keywords().iter().any(|k| words.contains(k)))
            .collect()
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NewsCategory::General => "general",
            NewsCategory::Bitcoin => "bitcoin",
            NewsCategory::Ethereum => "ethereum",
            NewsCategory::Solana => "solana",
            NewsCategory::Defi => "defi",
            NewsCategory::Nft => "nft",
            NewsCategory::Regulation => "regulation",
        };
        f.write_str(s)
    }
}

impl FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" | "all" => Ok(NewsCategory::General),
            "bitcoin" | "btc" => Ok(NewsCategory::Bitcoin),
            "ethereum" | "eth" => Ok(NewsCategory::Ethereum),
            "solana" | "sol" => Ok(NewsCategory::Solana),
            "defi" => Ok(NewsCategory::Defi),
            "nft" | "nfts" => Ok(NewsCategory::Nft),
            "regulation" => Ok(NewsCategory::Regulation),
            other => Err(format!("unknown news category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestFormat {
    Mobile,
    Detailed,
}

impl FromStr for DigestFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mobile" => Ok(DigestFormat::Mobile),
            "detailed" => Ok(DigestFormat::Detailed),
            other => Err(format!("unknown digest format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestItem {
    pub title: String,
    pub source: String,
    pub summary: String,
    pub published_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<NewsCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDigest {
    pub category: NewsCategory,
    pub format: DigestFormat,
    pub items: Vec<DigestItem>,
    pub trending_topics: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl NewsDigest {
    pub fn render(&self) -> String {
        let mut out = format!("Crypto news: {} ({} items)\n", self.category, self.items.len());
        for (i, item) in self.items.iter().enumerate() {
            out.push_str(&format!("\n{}. {} [{}]\n", i + 1, item.title, item.source));
            if !item.summary.is_empty() {
                out.push_str(&format!("   {}\n", item.summary));
            }
            if let Some(url) = &item.url {
                out.push_str(&format!("   {}\n", url));
            }
        }
        if !self.trending_topics.is_empty() {
            out.push_str(&format!("\nTrending: {}\n", self.trending_topics.join(", ")));
        }
        out
    }
}
