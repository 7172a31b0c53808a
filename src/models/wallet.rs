use super::chain::{Lookup, TransactionRecord};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "24h")]
    Last24h,
    #[serde(rename = "7d")]
    Last7d,
    #[serde(rename = "30d")]
    Last30d,
}

impl TimeRange {
    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::Last24h => Duration::hours(24),
            TimeRange::Last7d => Duration::days(7),
            TimeRange::Last30d => Duration::days(30),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeRange::Last24h => "24h",
            TimeRange::Last7d => "7d",
            TimeRange::Last30d => "30d",
        };
        f.write_str(s)
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" | "1d" | "day" => Ok(TimeRange::Last24h),
            "7d" | "week" => Ok(TimeRange::Last7d),
            "30d" | "month" => Ok(TimeRange::Last30d),
            other => Err(format!("unknown time range '{}' (expected 24h, 7d or 30d)", other)),
        }
    }
}

/// Summary of a wallet's recent SOL movements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletActivity {
    pub address: String,
    pub range: TimeRange,
    pub balance: Lookup<f64>,
    pub transaction_count: usize,
    pub successful: usize,
    pub failed: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub inflow: f64,
    pub outflow: f64,
    pub net_change: f64,
    /// Transactions kept in the window although their block time is unknown.
    pub unresolved_timestamps: usize,
    pub transactions: Vec<TransactionRecord>,
    pub generated_at: DateTime<Utc>,
}

impl WalletActivity {
    /// Keeps the transactions inside `range` ending at `now` and totals them.
    pub fn summarize(
        address: &str,
        range: TimeRange,
        balance: Lookup<f64>,
        transactions: Vec<TransactionRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        let since = now - range.duration();
        let transactions: Vec<TransactionRecord> = transactions
            .into_iter()
            .filter(|t| t.timestamp.map_or(true, |ts| ts >= since))
            .collect();

        let mut by_kind = BTreeMap::new();
        let (mut inflow, mut outflow) = (0.0, 0.0);
        let mut failed = 0;
        for tx in &transactions {
            *by_kind.entry(tx.kind.to_string()).or_insert(0) += 1;
            if tx.is_failed() {
                failed += 1;
            }
            if tx.amount > 0.0 {
                inflow += tx.amount;
            } else {
                outflow -= tx.amount;
            }
        }

        Self {
            address: address.to_string(),
            range,
            balance,
            transaction_count: transactions.len(),
            successful: transactions.len() - failed,
            failed,
            by_kind,
            inflow,
            outflow,
            net_change: inflow - outflow,
            unresolved_timestamps: transactions.iter().filter(|t| t.timestamp.is_none()).count(),
            transactions,
            generated_at: now,
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("Wallet {} (last {})\n", self.address, self.range);
        match &self.balance {
            Lookup::Value { value } => out.push_str(&format!("Balance: {:.4} SOL\n", value)),
            Lookup::Degraded { reason, .. } => out.push_str(&format!("Balance: unavailable ({})\n", reason)),
        }
        out.push_str(&format!(
            "Transactions: {} ({} ok, {} failed)\n",
            self.transaction_count, self.successful, self.failed
        ));
        for (kind, count) in &self.by_kind {
            out.push_str(&format!("  {}: {}\n", kind, count));
        }
        out.push_str(&format!(
            "In: {:.4} SOL  Out: {:.4} SOL  Net: {:+.4} SOL\n",
            self.inflow, self.outflow, self.net_change
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionKind, TransactionStatus};
    use chrono::TimeZone;

    fn tx(hours_ago: Option<i64>, kind: TransactionKind, amount: f64, status: TransactionStatus) -> TransactionRecord {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        TransactionRecord {
            signature: format!("sig{:?}", hours_ago),
            timestamp: hours_ago.map(|h| now - Duration::hours(h)),
            kind,
            amount,
            program_ids: vec![],
            status,
        }
    }

    #[test]
    fn test_summarize_window_and_totals() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let txs = vec![
            tx(Some(1), TransactionKind::DeFi, 2.0, TransactionStatus::Success),
            tx(Some(5), TransactionKind::TokenTransfer, -0.5, TransactionStatus::Success),
            tx(None, TransactionKind::Unknown, 0.0, TransactionStatus::Failed),
            tx(Some(48), TransactionKind::DeFi, 10.0, TransactionStatus::Success),
        ];
        let activity = WalletActivity::summarize(
            "wallet",
            TimeRange::Last24h,
            Lookup::Value { value: 3.0 },
            txs,
            now,
        );
        assert_eq!(activity.transaction_count, 3);
        assert_eq!(activity.failed, 1);
        assert_eq!(activity.successful, 2);
        assert_eq!(activity.unresolved_timestamps, 1);
        assert_eq!(activity.by_kind.get("DeFi"), Some(&1));
        assert_eq!(activity.by_kind.get("Token Transfer"), Some(&1));
        assert!((activity.inflow - 2.0).abs() < 1e-9);
        assert!((activity.outflow - 0.5).abs() < 1e-9);
        assert!((activity.net_change - 1.5).abs() < 1e-9);
        assert!(activity.render().contains("Net: +1.5000 SOL"));
    }

    #[test]
    fn test_parse_time_range() {
        assert_eq!("7D".parse::<TimeRange>(), Ok(TimeRange::Last7d));
        assert_eq!("24h".parse::<TimeRange>(), Ok(TimeRange::Last24h));
        assert!("1y".parse::<TimeRange>().is_err());
        assert_eq!(serde_json::to_string(&TimeRange::Last30d).unwrap(), "\"30d\"");
    }
}
