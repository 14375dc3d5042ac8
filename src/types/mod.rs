//! Type definitions for the laundering analysis pipeline

pub mod alert;
pub mod transaction;

pub use alert::{AlertLevel, FraudAlert};
pub use transaction::{AccountId, Transaction, TxId};
