use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Result of a lookup that may fall back to a placeholder instead of failing.
///
/// Hard failures are still reported through `Result`; `Degraded` carries the
/// placeholder together with the reason the real value is missing, so the
/// caller decides whether that counts as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Lookup<T> {
    Value { value: T },
    Degraded { fallback: T, reason: String },
}

impl<T> Lookup<T> {
    pub fn value(&self) -> &T {
        match self {
            Lookup::Value { value } => value,
            Lookup::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Lookup::Value { value } => value,
            Lookup::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Lookup::Degraded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "DeFi")]
    DeFi,
    #[serde(rename = "NFT")]
    Nft,
    #[serde(rename = "Token Transfer")]
    TokenTransfer,
    Unknown,
}

impl TransactionKind {
    /// Classifies a transaction from its program log output.
    pub fn from_logs<S: AsRef<str>>(logs: &[S]) -> Self {
        let text = logs
            .iter()
            .map(|l| l.as_ref().to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");

        if text.contains("swap") || text.contains("liquidity") {
            TransactionKind::DeFi
        } else if text.contains("nft") || text.contains("mint") {
            TransactionKind::Nft
        } else if text.contains("token") || text.contains("transfer") {
            TransactionKind::TokenTransfer
        } else {
            TransactionKind::Unknown
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionKind::DeFi => "DeFi",
            TransactionKind::Nft => "NFT",
            TransactionKind::TokenTransfer => "Token Transfer",
            TransactionKind::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: TransactionKind,
    /// Change of the wallet's SOL balance; negative for outflows.
    pub amount: f64,
    pub program_ids: Vec<String>,
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// Placeholder for a transaction whose details could not be fetched.
    pub fn unavailable(signature: &str, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            signature: signature.to_string(),
            timestamp,
            kind: TransactionKind::Unknown,
            amount: 0.0,
            program_ids: Vec::new(),
            status: TransactionStatus::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == TransactionStatus::Failed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHolder {
    pub address: String,
    pub balance: u64,
    pub ui_balance: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSupplyInfo {
    pub supply: u64,
    pub ui_supply: f64,
    pub decimals: u8,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
}

/// Everything the risk scorers read about one mint, fetched up front.
///
/// Fetch failures for transactions and supply info are kept as messages so
/// the scorers can report them as factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub mint: String,
    pub holders: Vec<TokenHolder>,
    pub transactions: std::result::Result<Vec<TransactionRecord>, String>,
    pub supply: std::result::Result<TokenSupplyInfo, String>,
}
