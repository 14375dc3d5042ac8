//! Risk engine: model training, scoring, graph assembly and cycle detection

use crate::config::ForestConfig;
use crate::feature_extractor::{FeatureExtractor, FeatureVector};
use crate::graph::{simple_cycles, Cycle, FlowEdge, TransactionGraph};
use crate::models::forest::RandomForest;
use crate::types::alert::AlertLevel;
use crate::types::transaction::Transaction;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Score returned before a model has been trained
pub const DEFAULT_SCORE: f64 = 0.5;

/// Training state of a [`RiskEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Untrained,
    Trained,
}

/// Scores transactions and analyses the flow graph they form.
///
/// Training takes `&mut self` and scoring `&self`, so a single engine can
/// never be retrained while a score is being computed.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    /// Fitted model, absent until trained
    model: Option<RandomForest>,
    /// Forest hyperparameters used at training time
    forest: ForestConfig,
    extractor: FeatureExtractor,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskEngine {
    /// Create an untrained engine with the default forest settings
    pub fn new() -> Self {
        Self::with_config(ForestConfig::default())
    }

    /// Create an untrained engine with custom forest settings
    pub fn with_config(forest: ForestConfig) -> Self {
        Self {
            model: None,
            forest,
            extractor: FeatureExtractor::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        if self.model.is_some() {
            EngineState::Trained
        } else {
            EngineState::Untrained
        }
    }

    pub fn is_trained(&self) -> bool {
        self.state() == EngineState::Trained
    }

    /// Fit the model on (`amount`, `time_gap_seconds`) against `is_scam`.
    ///
    /// An empty batch leaves the engine untrained. A batch holding a single
    /// class yields a constant model. Neither case is an error; non-finite
    /// feature values are.
    pub fn train(&mut self, transactions: &[Transaction]) -> Result<()> {
        if transactions.is_empty() {
            warn!("No training data, engine stays untrained");
            return Ok(());
        }

        let features = transactions
            .iter()
            .map(|tx| {
                self.extractor
                    .extract(tx)
                    .with_context(|| format!("invalid training row for transaction {}", tx.tx_id))
            })
            .collect::<Result<Vec<FeatureVector>>>()?;
        let labels: Vec<bool> = transactions.iter().map(|tx| tx.is_scam).collect();

        let positives = labels.iter().filter(|&&scam| scam).count();
        if positives == 0 || positives == labels.len() {
            warn!(
                rows = labels.len(),
                positives = positives,
                "Training data holds a single class, model will score a constant"
            );
        }

        let forest = RandomForest::fit(&features, &labels, &self.forest)?;

        info!(
            rows = labels.len(),
            positives = positives,
            trees = forest.n_trees(),
            seed = self.forest.seed,
            "Risk model trained"
        );

        self.model = Some(forest);
        Ok(())
    }

    /// Probability that a transfer with these features is a scam.
    ///
    /// Returns [`DEFAULT_SCORE`] while untrained.
    pub fn score(&self, amount: f64, time_gap: f64) -> Result<f64> {
        let Some(model) = &self.model else {
            return Ok(DEFAULT_SCORE);
        };
        let features = self.extractor.from_values(amount, time_gap)?;
        Ok(model.predict_proba(&features))
    }

    pub fn score_transaction(&self, tx: &Transaction) -> Result<f64> {
        self.score(tx.amount, f64::from(tx.time_gap_seconds))
            .with_context(|| format!("failed to score transaction {}", tx.tx_id))
    }

    /// Fill `risk_score` on every transaction
    pub fn score_batch(&self, transactions: &mut [Transaction]) -> Result<()> {
        for tx in transactions.iter_mut() {
            tx.risk_score = Some(self.score_transaction(tx)?);
        }
        debug!(count = transactions.len(), "Batch scored");
        Ok(())
    }

    /// Assemble the flow graph, re-scoring every transaction.
    ///
    /// `threshold` does not filter edges; callers use it to colour edges
    /// through [`TransactionGraph::high_risk_edges`].
    pub fn build_graph(&self, transactions: &[Transaction], threshold: f64) -> Result<TransactionGraph> {
        let mut graph = TransactionGraph::new();
        for tx in transactions {
            let risk = self.score_transaction(tx)?;
            graph.upsert_edge(
                tx.sender,
                tx.receiver,
                FlowEdge {
                    weight: tx.amount,
                    risk,
                    tx_id: tx.tx_id,
                },
            );
        }

        debug!(
            transactions = transactions.len(),
            accounts = graph.node_count(),
            edges = graph.edge_count(),
            threshold = threshold,
            "Transaction graph built"
        );

        Ok(graph)
    }

    /// Every elementary cycle in `graph`
    pub fn detect_cycles(&self, graph: &TransactionGraph) -> Vec<Cycle> {
        let cycles = simple_cycles(graph);
        if !cycles.is_empty() {
            info!(
                cycles = cycles.len(),
                accounts = graph.node_count(),
                "Circular routing detected"
            );
        }
        cycles
    }

    /// Qualitative alert band for a score
    pub fn classify_alert(score: f64) -> AlertLevel {
        AlertLevel::from_score(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;

    fn small_forest() -> ForestConfig {
        ForestConfig {
            n_estimators: 20,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_untrained_default_score() {
        let engine = RiskEngine::new();
        assert_eq!(engine.state(), EngineState::Untrained);
        assert_eq!(engine.score(123.0, 45.0).unwrap(), 0.5);
        assert_eq!(engine.score(f64::NAN, -1.0).unwrap(), 0.5);
    }

    #[test]
    fn test_train_and_score_range() {
        let batch = generate(150);
        let mut engine = RiskEngine::with_config(small_forest());
        engine.train(&batch).unwrap();

        assert!(engine.is_trained());
        for tx in &batch {
            let score = engine.score_transaction(tx).unwrap();
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_trained_rejects_non_finite() {
        let mut engine = RiskEngine::with_config(small_forest());
        engine.train(&generate(50)).unwrap();

        let err = engine.score(f64::NAN, 10.0).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_empty_training_stays_untrained() {
        let mut engine = RiskEngine::new();
        engine.train(&[]).unwrap();
        assert!(!engine.is_trained());
        assert_eq!(engine.score(1.0, 1.0).unwrap(), DEFAULT_SCORE);
    }

    #[test]
    fn test_single_class_training() {
        let batch: Vec<Transaction> = (0..10)
            .map(|i| Transaction::new(i, 100, 200, 50.0 + i as f64, 10, false))
            .collect();
        let mut engine = RiskEngine::with_config(small_forest());
        engine.train(&batch).unwrap();

        assert!(engine.is_trained());
        assert_eq!(engine.score(5000.0, 3.0).unwrap(), 0.0);
    }

    #[test]
    fn test_build_graph_rescores() {
        let mut batch = generate(30);
        for tx in batch.iter_mut() {
            tx.risk_score = Some(0.99);
        }
        let engine = RiskEngine::new();
        let graph = engine.build_graph(&batch, 0.7).unwrap();

        assert!(graph.edges().all(|flow| flow.edge.risk == DEFAULT_SCORE));
        assert!(graph.high_risk_edges(0.7).is_empty());
    }

    #[test]
    fn test_threshold_does_not_filter() {
        let batch = generate(40);
        let mut engine = RiskEngine::with_config(small_forest());
        engine.train(&batch).unwrap();

        let loose = engine.build_graph(&batch, 0.0).unwrap();
        let strict = engine.build_graph(&batch, 1.0).unwrap();
        assert_eq!(loose.edge_count(), strict.edge_count());
        assert_eq!(loose.node_count(), strict.node_count());
    }

    #[test]
    fn test_classify_alert() {
        assert_eq!(RiskEngine::classify_alert(0.95), AlertLevel::Critical);
        assert_eq!(RiskEngine::classify_alert(0.9), AlertLevel::Warning);
        assert_eq!(RiskEngine::classify_alert(0.7), AlertLevel::Clear);
    }
}
