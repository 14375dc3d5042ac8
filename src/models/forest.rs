//! Seeded random forest over the two transaction features

use crate::config::ForestConfig;
use crate::feature_extractor::{FeatureVector, FEATURE_COUNT};
use crate::models::tree::{DecisionTree, TreeParams};
use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Bagged ensemble of classification trees.
///
/// Each tree is grown on a bootstrap sample and considers
/// `floor(sqrt(features))` candidate features per split. The forest
/// probability is the mean of the per-tree leaf probabilities.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest. The same config and data always give the same forest.
    pub fn fit(features: &[FeatureVector], labels: &[bool], config: &ForestConfig) -> Result<Self> {
        ensure!(
            features.len() == labels.len(),
            "feature rows ({}) and labels ({}) differ in length",
            features.len(),
            labels.len()
        );
        ensure!(!features.is_empty(), "cannot fit a forest on an empty training set");
        ensure!(config.n_estimators > 0, "forest needs at least one tree");

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            max_features: ((FEATURE_COUNT as f64).sqrt() as usize).max(1),
        };

        let mut rng = StdRng::seed_from_u64(config.seed);
        let rows = features.len();
        let trees: Vec<DecisionTree> = (0..config.n_estimators)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..rows).map(|_| rng.gen_range(0..rows)).collect();
                DecisionTree::fit(features, labels, bootstrap, &params, &mut rng)
            })
            .collect();

        debug!(
            trees = trees.len(),
            rows = rows,
            max_depth = trees.iter().map(DecisionTree::depth).max().unwrap_or(0),
            "Random forest fitted"
        );

        Ok(Self { trees })
    }

    /// Mean positive-class probability across trees
    pub fn predict_proba(&self, x: &FeatureVector) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict_proba(x)).sum();
        (sum / self.trees.len() as f64).clamp(0.0, 1.0)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
