use super::RiskFactorReport;
use crate::models::{TransactionKind, TransactionRecord};

pub const SAMPLE_SIZE: usize = 100;

const FAILED_RATIO_LIMIT: f64 = 0.2;
const TRANSFER_RATIO_LIMIT: f64 = 0.8;
const TX_PER_SECOND_LIMIT: f64 = 0.1;

/// Seconds between the oldest and newest timestamped record, 0 when fewer
/// than two records carry a timestamp.
pub fn observed_span_secs(transactions: &[TransactionRecord]) -> f64 {
    let mut stamps = transactions.iter().filter_map(|t| t.timestamp);
    let Some(first) = stamps.next() else {
        return 0.0;
    };
    let (oldest, newest) = stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    (newest - oldest).num_milliseconds() as f64 / 1000.0
}

/// Scores the shape of recent activity. A fetch error collapses the score
/// to 0 rather than scoring a partial picture.
pub fn score_transaction_pattern(transactions: &Result<Vec<TransactionRecord>, String>) -> RiskFactorReport {
    let mut report = RiskFactorReport::new();

    let transactions = match transactions {
        Ok(txs) => txs,
        Err(e) => {
            report.score = 0;
            report.factors.push(format!("Unable to analyze transaction patterns: {}", e));
            return report;
        }
    };

    let sample = &transactions[..transactions.len().min(SAMPLE_SIZE)];
    if sample.is_empty() {
        return report;
    }
    let count = sample.len() as f64;

    let failed = sample.iter().filter(|t| t.is_failed()).count() as f64;
    let failed_ratio = failed / count;
    if failed_ratio > FAILED_RATIO_LIMIT {
        report.penalize(20, format!("High failed transaction rate: {:.1}%", failed_ratio * 100.0));
    }

    let transfers = sample
        .iter()
        .filter(|t| t.kind == TransactionKind::TokenTransfer)
        .count() as f64;
    let transfer_ratio = transfers / count;
    if transfer_ratio > TRANSFER_RATIO_LIMIT {
        report.penalize(
            15,
            format!("Activity dominated by plain token transfers: {:.1}%", transfer_ratio * 100.0),
        );
    }

    let span = observed_span_secs(sample);
    let rate = if span > 0.0 { count / span } else { 0.0 };
    if rate > TX_PER_SECOND_LIMIT {
        report.penalize(10, format!("Unusually high transaction rate: {:.2} tx/s", rate));
    }

    report
}
