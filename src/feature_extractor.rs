//! Feature extraction for risk model training and scoring.
//!
//! The model sees exactly two features, in this order:
//! `amount` and `time_gap_seconds`.

use crate::types::transaction::Transaction;
use anyhow::{ensure, Result};

/// Names of the model input features, in vector order
pub const FEATURE_NAMES: [&str; 2] = ["amount", "time_gap_seconds"];

/// Number of model input features
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Ordered model input
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Feature extractor that turns transactions into model inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a transaction.
    pub fn extract(&self, tx: &Transaction) -> Result<FeatureVector> {
        self.from_values(tx.amount, f64::from(tx.time_gap_seconds))
    }

    /// Build a feature vector from raw values, rejecting NaN and infinities.
    pub fn from_values(&self, amount: f64, time_gap: f64) -> Result<FeatureVector> {
        let features = [amount, time_gap];
        for (name, value) in FEATURE_NAMES.iter().zip(features) {
            ensure!(
                value.is_finite(),
                "feature `{}` must be a finite number, got {}",
                name,
                value
            );
        }
        Ok(features)
    }

    /// Number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order() {
        let extractor = FeatureExtractor::new();
        let tx = Transaction::new(1, 100, 200, 750.5, 42, false);

        assert_eq!(extractor.extract(&tx).unwrap(), [750.5, 42.0]);
        assert_eq!(extractor.feature_count(), 2);
    }

    #[test]
    fn test_non_finite_rejected() {
        let extractor = FeatureExtractor::new();

        let err = extractor.from_values(f64::NAN, 10.0).unwrap_err();
        assert!(err.to_string().contains("amount"));

        let err = extractor.from_values(10.0, f64::INFINITY).unwrap_err();
        assert!(err.to_string().contains("time_gap_seconds"));
    }
}
