//! Alert data structures

use crate::types::transaction::TxId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score above which an alert is critical
pub const CRITICAL_SCORE: f64 = 0.9;

/// Score above which an alert is a warning
pub const WARNING_SCORE: f64 = 0.7;

/// Alert level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Clear,
    Warning,
    Critical,
}

impl AlertLevel {
    /// Determine the alert level from a risk score.
    ///
    /// Bands are exclusive on the lower bound: `0.9` is a warning and `0.7`
    /// is clear. Out-of-range and NaN scores fall through the same
    /// comparisons (NaN is clear).
    pub fn from_score(score: f64) -> Self {
        if score > CRITICAL_SCORE {
            AlertLevel::Critical
        } else if score > WARNING_SCORE {
            AlertLevel::Warning
        } else {
            AlertLevel::Clear
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Clear => "CLEAR",
            AlertLevel::Warning => "WARNING",
            AlertLevel::Critical => "CRITICAL",
        }
    }

    /// All levels, least severe first
    pub fn all() -> [AlertLevel; 3] {
        [AlertLevel::Clear, AlertLevel::Warning, AlertLevel::Critical]
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Alert raised for a scored transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAlert {
    /// Unique alert identifier
    pub alert_id: String,

    /// Associated transaction ID
    pub tx_id: TxId,

    /// Risk score (0.0 - 1.0)
    pub risk_score: f64,

    /// Level classification
    pub level: AlertLevel,

    /// Score exceeded the session threshold
    pub flagged: bool,

    /// Alert generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl FraudAlert {
    /// Create a new alert, classifying the score and comparing it to `threshold`
    pub fn new(tx_id: TxId, risk_score: f64, threshold: f64) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            tx_id,
            risk_score,
            level: AlertLevel::from_score(risk_score),
            flagged: risk_score > threshold,
            timestamp: Utc::now(),
        }
    }
}
