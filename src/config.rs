//! Configuration management for the analysis pipeline

use crate::generator::INJECTED_ACCOUNTS;
use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::ops::Range;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub generator: GeneratorConfig,
    pub forest: ForestConfig,
    pub detection: DetectionConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Synthetic transaction generator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Seed for the batch generator
    pub seed: u64,
    /// First transaction id of the random batch
    pub tx_id_base: u64,
    /// Accounts senders are drawn from
    pub sender_accounts: Range<u32>,
    /// Accounts receivers are drawn from (disjoint from senders)
    pub receiver_accounts: Range<u32>,
    /// Transfer amounts
    pub amount: Range<f64>,
    /// Seconds since the reference event
    pub time_gap_seconds: Range<u32>,
    /// Probability a random transaction is labelled as a scam
    pub scam_probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tx_id_base: 1000,
            sender_accounts: 100..160,
            receiver_accounts: 200..260,
            amount: 50.0..10_000.0,
            time_gap_seconds: 1..10_000,
            scam_probability: 0.1,
        }
    }
}

impl GeneratorConfig {
    /// Reject ranges the generator cannot sample from
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.sender_accounts.is_empty() && !self.receiver_accounts.is_empty(),
            "generator account ranges must be non-empty"
        );
        ensure!(
            self.sender_accounts.end <= self.receiver_accounts.start
                || self.receiver_accounts.end <= self.sender_accounts.start,
            "sender accounts {:?} overlap receiver accounts {:?}",
            self.sender_accounts,
            self.receiver_accounts
        );
        for account in INJECTED_ACCOUNTS {
            ensure!(
                !self.sender_accounts.contains(&account)
                    && !self.receiver_accounts.contains(&account),
                "account {} is reserved for the injected cycle",
                account
            );
        }
        ensure!(
            self.amount.start > 0.0
                && self.amount.end.is_finite()
                && self.amount.start < self.amount.end,
            "amount range {:?} must be positive, finite and non-empty",
            self.amount
        );
        ensure!(
            !self.time_gap_seconds.is_empty(),
            "time gap range must be non-empty"
        );
        ensure!(
            (0.0..=1.0).contains(&self.scam_probability),
            "scam probability {} outside [0, 1]",
            self.scam_probability
        );
        Ok(())
    }
}

/// Random forest configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Seed for bootstrap sampling and feature selection
    pub seed: u64,
    /// Maximum tree depth (unbounded when absent)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Risk score above which a transaction counts as high risk
    pub threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}

/// Analysis session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of random transactions per session
    pub volume: usize,
    /// Number of leading transactions in the preview graph
    pub preview_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            volume: 120,
            preview_size: 40,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path, with `SCAMGUARD__` environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("SCAMGUARD").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;

        ensure!(self.forest.n_estimators > 0, "forest needs at least one tree");
        ensure!(
            self.forest.min_samples_split >= 2,
            "min_samples_split must be at least 2"
        );

        ensure!(
            (0.0..=1.0).contains(&self.detection.threshold),
            "detection threshold {} outside [0, 1]",
            self.detection.threshold
        );

        Ok(())
    }
}
