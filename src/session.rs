//! Analysis session: one batch, one engine, explicit ownership.
//!
//! A session generates its batch, trains its own engine on it and scores
//! every transaction up front. Everything a dashboard needs is then derived
//! from that owned state; nothing is shared between sessions.

use crate::config::AppConfig;
use crate::generator::TransactionGenerator;
use crate::graph::{Cycle, TransactionGraph};
use crate::metrics::SessionMetrics;
use crate::models::engine::{RiskEngine, DEFAULT_SCORE};
use crate::types::alert::FraudAlert;
use crate::types::transaction::{AccountId, Transaction, TxId};
use anyhow::Result;
use tracing::info;

/// Risk view of a single account
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub account: AccountId,
    /// Transactions sent or received, riskiest first
    pub transactions: Vec<Transaction>,
    /// Mean risk over those transactions
    pub mean_risk: f64,
}

/// One analysis run over a freshly generated batch
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    config: AppConfig,
    engine: RiskEngine,
    transactions: Vec<Transaction>,
}

impl AnalysisSession {
    /// Generate `volume` random transactions (plus the injected loop),
    /// train on them and score the batch.
    pub fn start(config: AppConfig, volume: usize) -> Result<Self> {
        config.validate()?;
        let generator = TransactionGenerator::with_config(config.generator.clone())?;
        let transactions = generator.generate(volume);
        Self::from_transactions(config, transactions)
    }

    /// Train and score over a caller-supplied batch
    pub fn from_transactions(config: AppConfig, mut transactions: Vec<Transaction>) -> Result<Self> {
        let mut engine = RiskEngine::with_config(config.forest.clone());
        engine.train(&transactions)?;
        engine.score_batch(&mut transactions)?;

        let session = Self {
            config,
            engine,
            transactions,
        };

        info!(
            transactions = session.transactions.len(),
            high_risk = session.high_risk_count(),
            threshold = session.threshold(),
            "Analysis session ready"
        );

        Ok(session)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// The scored batch, in generation order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn threshold(&self) -> f64 {
        self.config.detection.threshold
    }

    /// Transactions whose score is above the threshold
    pub fn high_risk_count(&self) -> usize {
        self.transactions
            .iter()
            .filter(|tx| risk_of(tx) > self.threshold())
            .count()
    }

    /// Graph over the leading `preview_size` transactions.
    ///
    /// The injected loop sits at the end of the batch, so it only shows up
    /// here when the batch is short enough.
    pub fn preview_graph(&self) -> Result<TransactionGraph> {
        let len = self.config.session.preview_size.min(self.transactions.len());
        self.engine
            .build_graph(&self.transactions[..len], self.threshold())
    }

    /// Graph over the whole batch
    pub fn full_graph(&self) -> Result<TransactionGraph> {
        self.engine.build_graph(&self.transactions, self.threshold())
    }

    /// Every cycle in the full graph
    pub fn laundering_cycles(&self) -> Result<Vec<Cycle>> {
        let graph = self.full_graph()?;
        Ok(self.engine.detect_cycles(&graph))
    }

    /// Transactions touching `account`, or `None` if it never appears
    pub fn account_profile(&self, account: AccountId) -> Option<AccountProfile> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.involves(account))
            .cloned()
            .collect();
        if transactions.is_empty() {
            return None;
        }

        transactions.sort_by(|a, b| risk_of(b).total_cmp(&risk_of(a)));
        let mean_risk =
            transactions.iter().map(risk_of).sum::<f64>() / transactions.len() as f64;

        Some(AccountProfile {
            account,
            transactions,
            mean_risk,
        })
    }

    /// Alert for a transaction of this batch
    pub fn alert_for(&self, tx_id: TxId) -> Option<FraudAlert> {
        self.transactions
            .iter()
            .find(|tx| tx.tx_id == tx_id)
            .map(|tx| FraudAlert::new(tx.tx_id, risk_of(tx), self.threshold()))
    }

    /// Batch statistics, including the number of cycles in the full graph
    pub fn metrics(&self) -> Result<SessionMetrics> {
        let cycles = self.laundering_cycles()?;
        Ok(SessionMetrics::from_transactions(&self.transactions, self.threshold())
            .with_cycles(cycles.len()))
    }
}

fn risk_of(tx: &Transaction) -> f64 {
    tx.risk_score.unwrap_or(DEFAULT_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::INJECTED_ACCOUNTS;
    use crate::types::alert::AlertLevel;

    fn quick_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.forest.n_estimators = 25;
        config
    }

    #[test]
    fn test_start_scores_every_transaction() {
        let session = AnalysisSession::start(quick_config(), 80).unwrap();

        assert_eq!(session.transactions().len(), 83);
        assert!(session.engine().is_trained());
        assert!(session
            .transactions()
            .iter()
            .all(|tx| matches!(tx.risk_score, Some(s) if (0.0..=1.0).contains(&s))));
    }

    #[test]
    fn test_cycles_found() {
        let session = AnalysisSession::start(quick_config(), 100).unwrap();
        let cycles = session.laundering_cycles().unwrap();

        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].is_rotation_of(&INJECTED_ACCOUNTS));
    }

    #[test]
    fn test_preview_is_prefix() {
        let session = AnalysisSession::start(quick_config(), 100).unwrap();
        let preview = session.preview_graph().unwrap();

        assert!(preview.edge_count() <= 40);
        assert!(!preview.contains_account(999));

        let short = AnalysisSession::start(quick_config(), 10).unwrap();
        assert!(short.preview_graph().unwrap().contains_account(999));
    }

    #[test]
    fn test_account_profile() {
        let session = AnalysisSession::start(quick_config(), 60).unwrap();
        let profile = session.account_profile(888).unwrap();

        assert_eq!(profile.transactions.len(), 2);
        assert!(profile.transactions.iter().all(|tx| tx.involves(888)));
        let first = profile.transactions[0].risk_score.unwrap();
        let second = profile.transactions[1].risk_score.unwrap();
        assert!(first >= second);
        assert!((profile.mean_risk - (first + second) / 2.0).abs() < 1e-12);

        assert!(session.account_profile(5).is_none());
    }

    #[test]
    fn test_alert_for() {
        let session = AnalysisSession::start(quick_config(), 60).unwrap();
        let tx = &session.transactions()[3];
        let alert = session.alert_for(tx.tx_id).unwrap();

        assert_eq!(alert.tx_id, tx.tx_id);
        assert_eq!(alert.level, AlertLevel::from_score(tx.risk_score.unwrap()));
        assert!(session.alert_for(42).is_none());
    }

    #[test]
    fn test_metrics() {
        let session = AnalysisSession::start(quick_config(), 120).unwrap();
        let metrics = session.metrics().unwrap();

        assert_eq!(metrics.transactions_scanned, 123);
        assert_eq!(metrics.high_risk as usize, session.high_risk_count());
        assert_eq!(metrics.laundering_loops, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = quick_config();
        config.detection.threshold = 2.0;
        assert!(AnalysisSession::start(config, 10).is_err());
    }
}
