use super::RiskFactorReport;
use crate::models::TokenHolder;

const TOP_HOLDER_EXTREME_PCT: f64 = 50.0;
const TOP_HOLDER_HIGH_PCT: f64 = 30.0;
const TOP10_EXTREME_PCT: f64 = 90.0;
const TOP10_HIGH_PCT: f64 = 70.0;

/// Scores supply concentration among the largest holders. `holders` is
/// expected largest-first, as the RPC endpoint returns them.
pub fn score_holder_concentration(holders: &[TokenHolder]) -> RiskFactorReport {
    let mut report = RiskFactorReport::new();

    if holders.is_empty() {
        report.score = 0;
        report.factors.push("No holder data available to assess concentration".to_string());
        return report;
    }

    let top = holders[0].percentage;
    if top > TOP_HOLDER_EXTREME_PCT {
        report.penalize(30, format!("Extreme concentration: top holder owns {:.2}% of supply", top));
    } else if top > TOP_HOLDER_HIGH_PCT {
        report.penalize(20, format!("High concentration: top holder owns {:.2}% of supply", top));
    }

    let top10: f64 = holders.iter().take(10).map(|h| h.percentage).sum();
    if top10 > TOP10_EXTREME_PCT {
        report.penalize(25, format!("Extreme concentration: top 10 holders own {:.2}% of supply", top10));
    } else if top10 > TOP10_HIGH_PCT {
        report.penalize(15, format!("High concentration: top 10 holders own {:.2}% of supply", top10));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holders(pcts: &[f64]) -> Vec<TokenHolder> {
        pcts.iter()
            .enumerate()
            .map(|(i, &p)| TokenHolder {
                address: format!("holder{}", i),
                balance: (p * 100.0) as u64,
                ui_balance: p,
                percentage: p,
            })
            .collect()
    }

    #[test]
    fn test_empty_holders_short_circuits() {
        let report = score_holder_concentration(&[]);
        assert_eq!(report.score, 0);
        assert_eq!(report.factors.len(), 1);
    }

    #[test]
    fn test_top_holder_boundary_is_strict() {
        // 50.0 + 10 x 5.0: top-10 sum is 95, so only the top-10 penalty applies
        let mut pcts = vec![50.0];
        pcts.extend(std::iter::repeat(5.0).take(10));
        let report = score_holder_concentration(&holders(&pcts));
        assert_eq!(report.score, 100 - 20 - 25);
        assert!(report.factors[0].starts_with("High concentration: top holder"));

        pcts[0] = 50.01;
        let report = score_holder_concentration(&holders(&pcts));
        assert_eq!(report.score, 100 - 30 - 25);
        assert!(report.factors[0].starts_with("Extreme concentration: top holder"));
    }

    #[test]
    fn test_distributed_supply_has_no_penalty() {
        let pcts: Vec<f64> = std::iter::repeat(2.0).take(20).collect();
        let report = score_holder_concentration(&holders(&pcts));
        assert_eq!(report.score, 100);
        assert!(report.factors.is_empty());
    }

    #[test]
    fn test_top10_high_band() {
        // top holder 25%, top 10 = 25 + 9 x 6 = 79%
        let mut pcts = vec![25.0];
        pcts.extend(std::iter::repeat(6.0).take(9));
        pcts.extend(std::iter::repeat(1.0).take(21));
        let report = score_holder_concentration(&holders(&pcts));
        assert_eq!(report.score, 85);
        assert_eq!(report.factors.len(), 1);
    }
}
