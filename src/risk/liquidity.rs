use super::transactions::{observed_span_secs, SAMPLE_SIZE};
use super::RiskFactorReport;
use crate::models::{TokenSupplyInfo, TransactionRecord};
use std::collections::HashSet;

const SECONDS_PER_DAY: f64 = 86_400.0;
const MIN_PROGRAM_DIVERSITY: usize = 3;

/// Average absolute SOL amount moved per transaction, 0 for an empty sample.
pub fn average_amount(transactions: &[TransactionRecord]) -> f64 {
    if transactions.is_empty() {
        return 0.0;
    }
    transactions.iter().map(|t| t.amount.abs()).sum::<f64>() / transactions.len() as f64
}

/// Transactions per day over the observed span. A zero span (one
/// transaction, or identical timestamps) yields 0.
pub fn transactions_per_day(transactions: &[TransactionRecord]) -> f64 {
    let span_days = observed_span_secs(transactions) / SECONDS_PER_DAY;
    if span_days > 0.0 {
        transactions.len() as f64 / span_days
    } else {
        0.0
    }
}

pub fn program_diversity(transactions: &[TransactionRecord]) -> usize {
    transactions
        .iter()
        .flat_map(|t| t.program_ids.iter())
        .collect::<HashSet<_>>()
        .len()
}

/// Liquidity proxy built from trade size, trade frequency, mint and freeze
/// authorities, and program diversity. Without supply info the authority
/// state is unknown, so the score collapses to 0 instead of assuming the
/// authorities were revoked.
pub fn score_liquidity(
    transactions: &Result<Vec<TransactionRecord>, String>,
    supply: &Result<TokenSupplyInfo, String>,
) -> RiskFactorReport {
    let mut report = RiskFactorReport::new();

    let supply = match supply {
        Ok(info) => info,
        Err(e) => {
            report.score = 0;
            report.factors.push(format!("Unable to analyze liquidity: {}", e));
            return report;
        }
    };
    let transactions: &[TransactionRecord] = match transactions {
        Ok(txs) => &txs[..txs.len().min(SAMPLE_SIZE)],
        Err(_) => &[],
    };

    let avg = average_amount(transactions);
    if avg < 0.1 {
        report.penalize(20, format!("Very low average transaction size: {:.4} SOL", avg));
    } else if avg < 1.0 {
        report.penalize(10, format!("Low average transaction size: {:.4} SOL", avg));
    }

    let per_day = transactions_per_day(transactions);
    if per_day < 1.0 {
        report.penalize(15, format!("Very low trading frequency: {:.2} transactions/day", per_day));
    } else if per_day < 10.0 {
        report.penalize(5, format!("Low trading frequency: {:.2} transactions/day", per_day));
    }

    if let Some(authority) = &supply.mint_authority {
        report.penalize(25, format!("Mint authority is active ({}): supply can be inflated", authority));
    }
    if let Some(authority) = &supply.freeze_authority {
        report.penalize(15, format!("Freeze authority is active ({}): holder accounts can be frozen", authority));
    }

    let programs = program_diversity(transactions);
    if programs < MIN_PROGRAM_DIVERSITY {
        report.penalize(10, format!("Low program diversity: {} distinct programs", programs));
    }

    report
}
