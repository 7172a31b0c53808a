//! Token risk scoring.
//!
//! Three independent scorers each start at 100 and subtract fixed penalties:
//! holder concentration, transaction pattern and a liquidity proxy. They are
//! pure functions over a [`ChainSnapshot`], so the snapshot can be fetched
//! once and scored without further I/O.

use crate::models::ChainSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod holders;
pub mod liquidity;
pub mod transactions;

pub use holders::score_holder_concentration;
pub use liquidity::score_liquidity;
pub use transactions::score_transaction_pattern;

pub const HOLDER_WEIGHT: f64 = 0.4;
pub const TRANSACTION_WEIGHT: f64 = 0.3;
pub const LIQUIDITY_WEIGHT: f64 = 0.3;

pub const HOLDER_WARNING: &str = "Warning: could not fetch holder data";
pub const TRANSACTION_WARNING: &str = "Warning: could not fetch transaction data";

/// Output of one scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactorReport {
    pub score: u32,
    pub factors: Vec<String>,
}

impl Default for RiskFactorReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskFactorReport {
    pub fn new() -> Self {
        Self {
            score: 100,
            factors: Vec::new(),
        }
    }

    /// Subtracts `points`, never going below 0, and records why.
    pub fn penalize(&mut self, points: u32, factor: impl Into<String>) {
        self.score = self.score.saturating_sub(points);
        self.factors.push(factor.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "EXTREMELY HIGH")]
    ExtremelyHigh,
}

impl RiskTier {
    /// Scores are safety scores: 100 means no penalty fired.
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            RiskTier::Low
        } else if score >= 60 {
            RiskTier::Medium
        } else if score >= 40 {
            RiskTier::High
        } else {
            RiskTier::ExtremelyHigh
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::ExtremelyHigh => "EXTREMELY HIGH",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub mint: String,
    pub overall_score: u32,
    pub tier: RiskTier,
    pub holder: RiskFactorReport,
    pub transaction: RiskFactorReport,
    pub liquidity: RiskFactorReport,
    pub factors: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

pub fn overall_score(holder: u32, transaction: u32, liquidity: u32) -> u32 {
    let weighted = HOLDER_WEIGHT * holder as f64
        + TRANSACTION_WEIGHT * transaction as f64
        + LIQUIDITY_WEIGHT * liquidity as f64;
    weighted.round().clamp(0.0, 100.0) as u32
}

/// Combines already-computed sub-reports into the final assessment.
pub fn combine(
    mint: &str,
    holder: RiskFactorReport,
    transaction: RiskFactorReport,
    liquidity: RiskFactorReport,
    holders_missing: bool,
) -> RiskAssessment {
    let overall = overall_score(holder.score, transaction.score, liquidity.score);

    let mut factors: Vec<String> = holder
        .factors
        .iter()
        .chain(transaction.factors.iter())
        .chain(liquidity.factors.iter())
        .cloned()
        .collect();
    if holders_missing {
        factors.push(HOLDER_WARNING.to_string());
    }
    if transaction.score == 0 {
        factors.push(TRANSACTION_WARNING.to_string());
    }

    RiskAssessment {
        mint: mint.to_string(),
        overall_score: overall,
        tier: RiskTier::from_score(overall),
        holder,
        transaction,
        liquidity,
        factors,
        assessed_at: Utc::now(),
    }
}

pub fn assess(snapshot: &ChainSnapshot) -> RiskAssessment {
    let holder = score_holder_concentration(&snapshot.holders);
    let transaction = score_transaction_pattern(&snapshot.transactions);
    let liquidity = score_liquidity(&snapshot.transactions, &snapshot.supply);
    combine(
        &snapshot.mint,
        holder,
        transaction,
        liquidity,
        snapshot.holders.is_empty(),
    )
}

impl RiskAssessment {
    pub fn render(&self) -> String {
        let mut out = format!(
            "Risk report for {}\nOverall score: {}/100 ({} risk)\n  holders: {}  transactions: {}  liquidity: {}\n",
            self.mint,
            self.overall_score,
            self.tier,
            self.holder.score,
            self.transaction.score,
            self.liquidity.score
        );
        if self.factors.is_empty() {
            out.push_str("No risk factors detected\n");
        } else {
            out.push_str("Factors:\n");
            for factor in &self.factors {
                out.push_str(&format!("  - {}\n", factor));
            }
        }
        out
    }
}
