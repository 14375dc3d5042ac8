//! Directed money-flow graph between accounts.
//!
//! Nodes are account ids; each ordered (sender, receiver) pair holds at most
//! one edge. Inserting a second transfer for the same pair overwrites the
//! edge attributes, so the graph reflects the last transfer seen.

pub mod cycles;

pub use cycles::{simple_cycles, Cycle};

use crate::types::transaction::{AccountId, TxId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Attributes carried by a flow edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowEdge {
    /// Transferred amount
    pub weight: f64,
    /// Risk score computed when the edge was inserted
    pub risk: f64,
    /// Transaction that produced the edge
    pub tx_id: TxId,
}

impl FlowEdge {
    pub fn is_high_risk(&self, threshold: f64) -> bool {
        self.risk > threshold
    }
}

/// A flow edge together with its endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRef<'a> {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub edge: &'a FlowEdge,
}

/// Account-level transaction graph
#[derive(Debug, Clone, Default)]
pub struct TransactionGraph {
    graph: DiGraph<AccountId, FlowEdge>,
    accounts: HashMap<AccountId, NodeIndex>,
}

impl TransactionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the edge `sender -> receiver`, replacing any existing attributes
    pub fn upsert_edge(&mut self, sender: AccountId, receiver: AccountId, edge: FlowEdge) {
        let from = self.node(sender);
        let to = self.node(receiver);
        self.graph.update_edge(from, to, edge);
    }

    fn node(&mut self, account: AccountId) -> NodeIndex {
        *self
            .accounts
            .entry(account)
            .or_insert_with(|| self.graph.add_node(account))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_account(&self, account: AccountId) -> bool {
        self.accounts.contains_key(&account)
    }

    /// Accounts in first-seen order
    pub fn accounts(&self) -> impl Iterator<Item = AccountId> + '_ {
        self.graph.node_indices().map(move |index| self.graph[index])
    }

    /// Attributes of the edge `sender -> receiver`, if present
    pub fn edge(&self, sender: AccountId, receiver: AccountId) -> Option<&FlowEdge> {
        let from = *self.accounts.get(&sender)?;
        let to = *self.accounts.get(&receiver)?;
        self.graph
            .find_edge(from, to)
            .and_then(|index| self.graph.edge_weight(index))
    }

    /// All edges with their endpoints
    pub fn edges(&self) -> impl Iterator<Item = FlowRef<'_>> + '_ {
        self.graph.edge_references().map(move |edge| FlowRef {
            sender: self.graph[edge.source()],
            receiver: self.graph[edge.target()],
            edge: edge.weight(),
        })
    }

    /// Edges whose risk is strictly above `threshold`
    pub fn high_risk_edges(&self, threshold: f64) -> Vec<FlowRef<'_>> {
        self.edges()
            .filter(|flow| flow.edge.is_high_risk(threshold))
            .collect()
    }

    /// Accounts receiving directly from `account`
    pub fn successors(&self, account: AccountId) -> Vec<AccountId> {
        self.accounts
            .get(&account)
            .map(|&index| {
                self.graph
                    .neighbors(index)
                    .map(|next| self.graph[next])
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn inner(&self) -> &DiGraph<AccountId, FlowEdge> {
        &self.graph
    }
}
