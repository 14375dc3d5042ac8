//! Transaction data structures for laundering analysis

use serde::{Deserialize, Serialize};

/// Account identifier (sender or receiver of a transfer)
pub type AccountId = u32;

/// Transaction identifier
pub type TxId = u64;

/// A single transfer between two accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier within a batch
    pub tx_id: TxId,

    /// Sending account
    pub sender: AccountId,

    /// Receiving account (may equal the sender)
    pub receiver: AccountId,

    /// Transferred amount
    pub amount: f64,

    /// Seconds elapsed since the reference event
    pub time_gap_seconds: u32,

    /// Ground-truth label
    pub is_scam: bool,

    /// Fraud probability, set once the batch has been scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
}

impl Transaction {
    /// Create an unscored transaction
    pub fn new(
        tx_id: TxId,
        sender: AccountId,
        receiver: AccountId,
        amount: f64,
        time_gap_seconds: u32,
        is_scam: bool,
    ) -> Self {
        Self {
            tx_id,
            sender,
            receiver,
            amount,
            time_gap_seconds,
            is_scam,
            risk_score: None,
        }
    }

    /// Attach a risk score
    pub fn with_risk_score(mut self, risk_score: f64) -> Self {
        self.risk_score = Some(risk_score);
        self
    }

    /// Whether `account` takes part in this transfer on either side
    pub fn involves(&self, account: AccountId) -> bool {
        self.sender == account || self.receiver == account
    }

    /// Label as the 0/1 target used for training
    pub fn label(&self) -> u8 {
        u8::from(self.is_scam)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_serialization() {
        let tx = Transaction::new(1000, 120, 215, 2500.0, 300, false).with_risk_score(0.12);

        let json = serde_json::to_string(&tx).unwrap();
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();

        assert_eq!(tx, deserialized);
    }

    #[test]
    fn test_unscored_transaction_omits_risk() {
        let tx = Transaction::new(1, 2, 3, 10.0, 5, true);
        let json = serde_json::to_string(&tx).unwrap();

        assert!(!json.contains("risk_score"));
        assert_eq!(tx.label(), 1);
    }

    #[test]
    fn test_involves_either_side() {
        let tx = Transaction::new(1, 7, 9, 10.0, 5, false);

        assert!(tx.involves(7));
        assert!(tx.involves(9));
        assert!(!tx.involves(8));
    }
}
