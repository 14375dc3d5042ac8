//! Summary statistics for one analysis session.

use crate::models::engine::DEFAULT_SCORE;
use crate::types::alert::AlertLevel;
use crate::types::transaction::Transaction;
use std::collections::BTreeMap;
use tracing::info;

/// Counters and score distribution for a scored batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionMetrics {
    /// Transactions in the batch
    pub transactions_scanned: u64,
    /// Transactions scoring above the threshold
    pub high_risk: u64,
    /// Transactions carrying a scam label
    pub labelled_scams: u64,
    /// Cycles found in the full graph
    pub laundering_loops: u64,
    /// Threshold the high-risk count was taken against
    pub threshold: f64,
    /// Transactions per alert level
    alerts_by_level: BTreeMap<AlertLevel, u64>,
    /// Risk score distribution buckets
    score_buckets: [u64; 10],
}

impl SessionMetrics {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Tally a scored batch. Unscored rows count at the default score.
    pub fn from_transactions(transactions: &[Transaction], threshold: f64) -> Self {
        let mut metrics = Self::new(threshold);
        for tx in transactions {
            metrics.record_transaction(tx.risk_score.unwrap_or(DEFAULT_SCORE), tx.is_scam);
        }
        metrics
    }

    /// Record one scored transaction
    pub fn record_transaction(&mut self, risk_score: f64, is_scam: bool) {
        self.transactions_scanned += 1;
        if risk_score > self.threshold {
            self.high_risk += 1;
        }
        if is_scam {
            self.labelled_scams += 1;
        }

        *self
            .alerts_by_level
            .entry(AlertLevel::from_score(risk_score))
            .or_insert(0) += 1;

        let bucket = (risk_score.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
        self.score_buckets[bucket] += 1;
    }

    pub fn with_cycles(mut self, count: usize) -> Self {
        self.laundering_loops = count as u64;
        self
    }

    /// Get score distribution
    pub fn score_distribution(&self) -> [u64; 10] {
        self.score_buckets
    }

    /// Count at a given alert level
    pub fn alerts_at(&self, level: AlertLevel) -> u64 {
        self.alerts_by_level.get(&level).copied().unwrap_or(0)
    }

    pub fn high_risk_rate(&self) -> f64 {
        if self.transactions_scanned > 0 {
            self.high_risk as f64 / self.transactions_scanned as f64
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let total = self.transactions_scanned;

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║           SCAMGUARD ANALYSIS SESSION - SUMMARY               ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Total Scanned:    {:>8}  │  Labelled Scams:  {:>8}     ║",
            total, self.labelled_scams
        );
        info!(
            "║ High Risk (>{:.2}): {:>7}  │  High Risk Rate: {:>6.1}%     ║",
            self.threshold,
            self.high_risk,
            self.high_risk_rate() * 100.0
        );
        info!(
            "║ Laundering Loops: {:>8}                                   ║",
            self.laundering_loops
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Alert Levels:                                                ║");
        for level in AlertLevel::all().into_iter().rev() {
            let count = self.alerts_at(level);
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", level, count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Risk Score Distribution:                                     ║");
        for (i, &count) in self.score_buckets.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let mut metrics = SessionMetrics::new(0.7);

        metrics.record_transaction(0.95, true);
        metrics.record_transaction(0.8, false);
        metrics.record_transaction(0.7, false);
        metrics.record_transaction(0.1, false);

        assert_eq!(metrics.transactions_scanned, 4);
        assert_eq!(metrics.high_risk, 2);
        assert_eq!(metrics.labelled_scams, 1);
        assert_eq!(metrics.alerts_at(AlertLevel::Critical), 1);
        assert_eq!(metrics.alerts_at(AlertLevel::Warning), 1);
        assert_eq!(metrics.alerts_at(AlertLevel::Clear), 2);
        assert!((metrics.high_risk_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_score_buckets() {
        let mut metrics = SessionMetrics::new(0.5);
        metrics.record_transaction(0.0, false);
        metrics.record_transaction(1.0, false);
        metrics.record_transaction(0.55, false);

        let dist = metrics.score_distribution();
        assert_eq!(dist[0], 1);
        assert_eq!(dist[5], 1);
        assert_eq!(dist[9], 1);
        assert_eq!(dist.iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_unscored_counts_as_default() {
        let batch = vec![Transaction::new(1, 2, 3, 4.0, 5, false)];
        let metrics = SessionMetrics::from_transactions(&batch, 0.7).with_cycles(2);

        assert_eq!(metrics.high_risk, 0);
        assert_eq!(metrics.score_distribution()[5], 1);
        assert_eq!(metrics.laundering_loops, 2);
    }
}
