//! ScamGuard Library
//!
//! Synthetic transaction generation, seeded fraud scoring and circular
//! routing detection for demonstrating laundering patterns.

pub mod config;
pub mod feature_extractor;
pub mod generator;
pub mod graph;
pub mod metrics;
pub mod models;
pub mod session;
pub mod types;

pub use config::AppConfig;
pub use feature_extractor::FeatureExtractor;
pub use generator::{generate, TransactionGenerator};
pub use graph::{Cycle, TransactionGraph};
pub use metrics::SessionMetrics;
pub use models::engine::RiskEngine;
pub use session::{AccountProfile, AnalysisSession};
pub use types::{alert::AlertLevel, alert::FraudAlert, transaction::Transaction};
