//! Elementary circuit enumeration (Johnson, 1975).
//!
//! Every simple cycle is reported exactly once, starting from the account
//! that entered the graph first. Self-loops are reported as one-account
//! cycles. There is no cap on the number or length of cycles; runtime is
//! O((V + E)(C + 1)) for C circuits.

use crate::graph::TransactionGraph;
use crate::types::transaction::AccountId;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashSet;
use std::fmt;

/// A closed route through distinct accounts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cycle(Vec<AccountId>);

impl Cycle {
    pub fn new(accounts: Vec<AccountId>) -> Self {
        Self(accounts)
    }

    pub fn accounts(&self) -> &[AccountId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_self_loop(&self) -> bool {
        self.0.len() == 1
    }

    /// Same route, rotated to start at the smallest account id
    pub fn canonical(&self) -> Cycle {
        let start = self
            .0
            .iter()
            .enumerate()
            .min_by_key(|(_, account)| **account)
            .map_or(0, |(i, _)| i);
        let mut accounts = self.0.clone();
        accounts.rotate_left(start);
        Cycle(accounts)
    }

    /// Whether `route` describes this cycle, starting at any account
    pub fn is_rotation_of(&self, route: &[AccountId]) -> bool {
        route.len() == self.0.len() && self.canonical() == Cycle(route.to_vec()).canonical()
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for account in &self.0 {
            write!(f, "{} -> ", account)?;
        }
        match self.0.first() {
            Some(first) => write!(f, "{}", first),
            None => Ok(()),
        }
    }
}

/// Enumerate every elementary cycle of `graph`.
pub fn simple_cycles(graph: &TransactionGraph) -> Vec<Cycle> {
    let g = graph.inner();
    let n = g.node_count();
    let adjacency: Vec<Vec<usize>> = (0..n)
        .map(|v| g.neighbors(NodeIndex::new(v)).map(|w| w.index()).collect())
        .collect();

    let mut circuits: Vec<Vec<usize>> = (0..n)
        .filter(|&v| adjacency[v].contains(&v))
        .map(|v| vec![v])
        .collect();

    let mut start = 0;
    while start < n {
        let Some(component) = least_component(&adjacency, start) else {
            break;
        };
        let root = component[0];

        CircuitSearch::new(&adjacency, &component, root).run(&mut circuits);

        start = root + 1;
    }

    circuits
        .into_iter()
        .map(|circuit| Cycle(circuit.into_iter().map(|v| g[NodeIndex::new(v)]).collect()))
        .collect()
}

/// Among the strongly connected components of the subgraph induced by
/// vertices `>= start` (self-loops ignored), return the non-trivial one
/// holding the smallest vertex, sorted ascending.
fn least_component(adjacency: &[Vec<usize>], start: usize) -> Option<Vec<usize>> {
    let mut sub: DiGraph<(), ()> = DiGraph::with_capacity(adjacency.len() - start, 0);
    for _ in start..adjacency.len() {
        sub.add_node(());
    }
    for (v, targets) in adjacency.iter().enumerate().skip(start) {
        for &w in targets {
            if w >= start && w != v {
                sub.add_edge(NodeIndex::new(v - start), NodeIndex::new(w - start), ());
            }
        }
    }

    kosaraju_scc(&sub)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut vertices: Vec<usize> = component.iter().map(|v| v.index() + start).collect();
            vertices.sort_unstable();
            vertices
        })
        .min_by_key(|vertices| vertices[0])
}

/// Johnson's blocked-set search rooted at the least vertex of a component.
///
/// The depth-first walk keeps its own frame stack, so circuit length is
/// bounded by memory rather than by the thread stack.
struct CircuitSearch<'a> {
    adjacency: &'a [Vec<usize>],
    in_component: Vec<bool>,
    root: usize,
    blocked: Vec<bool>,
    blocked_by: Vec<HashSet<usize>>,
    path: Vec<usize>,
}

/// One vertex on the current path and the next neighbour to visit
struct Frame {
    vertex: usize,
    next: usize,
    found: bool,
}

impl Frame {
    fn new(vertex: usize) -> Self {
        Self {
            vertex,
            next: 0,
            found: false,
        }
    }
}

impl<'a> CircuitSearch<'a> {
    fn new(adjacency: &'a [Vec<usize>], component: &[usize], root: usize) -> Self {
        let n = adjacency.len();
        let mut in_component = vec![false; n];
        for &v in component {
            in_component[v] = true;
        }
        Self {
            adjacency,
            in_component,
            root,
            blocked: vec![false; n],
            blocked_by: vec![HashSet::new(); n],
            path: Vec::new(),
        }
    }

    fn run(mut self, circuits: &mut Vec<Vec<usize>>) {
        let adjacency = self.adjacency;
        self.enter(self.root);
        let mut frames = vec![Frame::new(self.root)];

        while let Some(frame) = frames.last_mut() {
            let v = frame.vertex;
            match adjacency[v].get(frame.next) {
                Some(&w) => {
                    frame.next += 1;
                    if w == v || !self.in_component[w] {
                        continue;
                    }
                    if w == self.root {
                        circuits.push(self.path.clone());
                        frame.found = true;
                    } else if !self.blocked[w] {
                        self.enter(w);
                        frames.push(Frame::new(w));
                    }
                }
                None => {
                    let found = frame.found;
                    frames.pop();

                    if found {
                        self.unblock(v);
                    } else {
                        for &w in &adjacency[v] {
                            if w != v && self.in_component[w] {
                                self.blocked_by[w].insert(v);
                            }
                        }
                    }
                    self.path.pop();

                    if found {
                        if let Some(parent) = frames.last_mut() {
                            parent.found = true;
                        }
                    }
                }
            }
        }
    }

    fn enter(&mut self, v: usize) {
        self.path.push(v);
        self.blocked[v] = true;
    }

    fn unblock(&mut self, u: usize) {
        let mut pending = vec![u];
        while let Some(v) = pending.pop() {
            if !self.blocked[v] {
                continue;
            }
            self.blocked[v] = false;
            pending.extend(self.blocked_by[v].drain());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FlowEdge;

    fn graph_of(edges: &[(AccountId, AccountId)]) -> TransactionGraph {
        let mut graph = TransactionGraph::new();
        for (i, &(from, to)) in edges.iter().enumerate() {
            graph.upsert_edge(
                from,
                to,
                FlowEdge {
                    weight: 1.0,
                    risk: 0.5,
                    tx_id: i as u64,
                },
            );
        }
        graph
    }

    fn canonical_set(cycles: &[Cycle]) -> HashSet<Vec<AccountId>> {
        cycles.iter().map(|c| c.canonical().accounts().to_vec()).collect()
    }

    #[test]
    fn test_triangle() {
        let graph = graph_of(&[(999, 888), (888, 777), (777, 999)]);
        let cycles = simple_cycles(&graph);

        assert_eq!(cycles, vec![Cycle::new(vec![999, 888, 777])]);
        assert!(cycles[0].is_rotation_of(&[777, 999, 888]));
        assert!(!cycles[0].is_rotation_of(&[999, 777, 888]));
    }

    #[test]
    fn test_chain_has_no_cycles() {
        let graph = graph_of(&[(1, 2), (2, 3)]);
        assert!(simple_cycles(&graph).is_empty());
        assert!(simple_cycles(&TransactionGraph::new()).is_empty());
    }

    #[test]
    fn test_self_loop_counts() {
        let graph = graph_of(&[(4, 4), (4, 5)]);
        let cycles = simple_cycles(&graph);

        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].is_self_loop());
        assert_eq!(cycles[0].accounts(), &[4]);
    }

    #[test]
    fn test_complete_digraph_on_three_nodes() {
        // 3 two-cycles + 2 three-cycles
        let graph = graph_of(&[(1, 2), (2, 1), (2, 3), (3, 2), (1, 3), (3, 1)]);
        let cycles = simple_cycles(&graph);

        assert_eq!(cycles.len(), 5);
        let expected: HashSet<Vec<AccountId>> = [
            vec![1, 2],
            vec![2, 3],
            vec![1, 3],
            vec![1, 2, 3],
            vec![1, 3, 2],
        ]
        .into_iter()
        .collect();
        assert_eq!(canonical_set(&cycles), expected);
    }

    #[test]
    fn test_shared_node_cycles() {
        // figure eight through account 1
        let graph = graph_of(&[(1, 2), (2, 1), (1, 3), (3, 4), (4, 1), (5, 1)]);
        let cycles = simple_cycles(&graph);

        let expected: HashSet<Vec<AccountId>> =
            [vec![1, 2], vec![1, 3, 4]].into_iter().collect();
        assert_eq!(cycles.len(), 2);
        assert_eq!(canonical_set(&cycles), expected);
    }

    #[test]
    fn test_separate_components() {
        let graph = graph_of(&[(1, 2), (2, 1), (10, 11), (11, 12), (12, 10), (2, 10)]);
        let cycles = simple_cycles(&graph);

        let expected: HashSet<Vec<AccountId>> =
            [vec![1, 2], vec![10, 11, 12]].into_iter().collect();
        assert_eq!(canonical_set(&cycles), expected);
    }

    #[test]
    fn test_complete_digraph_count() {
        // K4 has 6 two-cycles, 8 three-cycles and 6 four-cycles
        let mut edges = Vec::new();
        for a in 1..=4 {
            for b in 1..=4 {
                if a != b {
                    edges.push((a, b));
                }
            }
        }
        let cycles = simple_cycles(&graph_of(&edges));

        assert_eq!(cycles.len(), 20);
        assert_eq!(canonical_set(&cycles).len(), 20);
    }

    #[test]
    fn test_long_ring() {
        let n: AccountId = 20_000;
        let edges: Vec<(AccountId, AccountId)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        let cycles = simple_cycles(&graph_of(&edges));

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), n as usize);
        assert_eq!(cycles[0].accounts()[0], 0);
        assert_eq!(cycles[0].accounts()[1], 1);
    }

    #[test]
    fn test_ring_with_chord() {
        // 0 -> 1 -> ... -> 9 -> 0 plus 5 -> 0
        let mut edges: Vec<(AccountId, AccountId)> = (0..10).map(|i| (i, (i + 1) % 10)).collect();
        edges.push((5, 0));
        let cycles = simple_cycles(&graph_of(&edges));

        let expected: HashSet<Vec<AccountId>> =
            [(0..10).collect::<Vec<_>>(), (0..6).collect()].into_iter().collect();
        assert_eq!(canonical_set(&cycles), expected);
    }

    #[test]
    fn test_display() {
        let cycle = Cycle::new(vec![999, 888, 777]);
        assert_eq!(cycle.to_string(), "999 -> 888 -> 777 -> 999");
    }
}
