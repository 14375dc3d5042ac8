//! Synthetic transaction generator
//!
//! Produces a seeded batch of random transfers followed by a fixed
//! three-account laundering loop (999 -> 888 -> 777 -> 999), so every batch
//! carries at least one cycle for the detector to find.

use crate::config::GeneratorConfig;
use crate::types::transaction::{AccountId, Transaction, TxId};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Accounts forming the injected laundering loop, in routing order
pub const INJECTED_ACCOUNTS: [AccountId; 3] = [999, 888, 777];

/// Transaction ids reserved for the injected loop
pub const INJECTED_TX_IDS: [TxId; 3] = [5000, 5001, 5002];

const INJECTED_AMOUNTS: [f64; 3] = [5000.0, 4900.0, 4850.0];
const INJECTED_TIME_GAPS: [u32; 3] = [10, 12, 8];

/// Seeded generator for synthetic transaction batches
#[derive(Debug, Clone, Default)]
pub struct TransactionGenerator {
    config: GeneratorConfig,
}

impl TransactionGenerator {
    /// Create a generator with the built-in ranges and seed
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator from configuration, rejecting ranges it cannot sample
    pub fn with_config(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate `n` random transactions followed by the injected loop.
    ///
    /// The RNG is reseeded on every call, so the same `n` always yields the
    /// same batch.
    pub fn generate(&self, n: usize) -> Vec<Transaction> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut transactions = Vec::with_capacity(n + INJECTED_ACCOUNTS.len());

        for offset in 0..n as u64 {
            transactions.push(self.random_transaction(&mut rng, self.config.tx_id_base + offset));
        }

        let first_free = self.config.tx_id_base + n as u64;
        transactions.extend(Self::injected_cycle(first_free));

        debug!(
            random = n,
            total = transactions.len(),
            seed = self.config.seed,
            "Generated transaction batch"
        );

        transactions
    }

    fn random_transaction(&self, rng: &mut StdRng, tx_id: TxId) -> Transaction {
        let config = &self.config;
        Transaction::new(
            tx_id,
            rng.gen_range(config.sender_accounts.clone()),
            rng.gen_range(config.receiver_accounts.clone()),
            rng.gen_range(config.amount.clone()),
            rng.gen_range(config.time_gap_seconds.clone()),
            rng.gen_bool(config.scam_probability),
        )
    }

    /// The three loop transfers, all labelled as scams.
    ///
    /// They use the reserved ids unless the random batch already reaches
    /// them, in which case they take the next free ids after the batch.
    fn injected_cycle(first_free: TxId) -> Vec<Transaction> {
        let base = if first_free <= INJECTED_TX_IDS[0] {
            INJECTED_TX_IDS[0]
        } else {
            first_free
        };

        (0..INJECTED_ACCOUNTS.len())
            .map(|i| {
                Transaction::new(
                    base + i as u64,
                    INJECTED_ACCOUNTS[i],
                    INJECTED_ACCOUNTS[(i + 1) % INJECTED_ACCOUNTS.len()],
                    INJECTED_AMOUNTS[i],
                    INJECTED_TIME_GAPS[i],
                    true,
                )
            })
            .collect()
    }
}

/// Generate a batch with the default generator
pub fn generate(n: usize) -> Vec<Transaction> {
    TransactionGenerator::new().generate(n)
}
