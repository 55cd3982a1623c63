//! Transaction graph construction (module A).
//!
//! Builds the adjacency, reverse-adjacency, per-node statistics and edge
//! indices that every detector in this crate reads from. Ingestion into the
//! graph is total over well-typed input: there is nothing to fail on here,
//! only defensive materialisation of nodes that only ever show up in an
//! adjacency set.

use crate::Transaction;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn empty_set() -> &'static HashSet<String> {
    static EMPTY: OnceLock<HashSet<String>> = OnceLock::new();
    EMPTY.get_or_init(HashSet::new)
}

/// A single directed edge realised by one transaction.
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub amount: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Derived per-account statistics.
#[derive(Debug, Clone)]
pub struct NodeStats {
    pub tx_in: usize,
    pub tx_out: usize,
    pub total_in: f64,
    pub total_out: f64,
    pub tx_total: usize,
    pub timestamps: Vec<DateTime<Utc>>,
}

impl NodeStats {
    fn empty() -> Self {
        Self {
            tx_in: 0,
            tx_out: 0,
            total_in: 0.0,
            total_out: 0.0,
            tx_total: 0,
            timestamps: Vec::new(),
        }
    }
}

/// The transaction multigraph plus the derived indices the detectors need.
///
/// `adj`/`rev` collapse parallel edges to unique neighbours; `edges` and the
/// by-source/by-target indices keep every individual transaction.
pub struct TransactionGraph {
    pub adj: HashMap<String, HashSet<String>>,
    pub rev: HashMap<String, HashSet<String>>,
    pub node_stats: HashMap<String, NodeStats>,
    pub edges: Vec<Edge>,
    edges_by_source: HashMap<String, Vec<usize>>,
    edges_by_target: HashMap<String, Vec<usize>>,
}

impl TransactionGraph {
    /// Ingests a batch of transactions into a fresh graph.
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut adj: HashMap<String, HashSet<String>> = HashMap::new();
        let mut rev: HashMap<String, HashSet<String>> = HashMap::new();
        let mut node_stats: HashMap<String, NodeStats> = HashMap::new();
        let mut edges: Vec<Edge> = Vec::with_capacity(transactions.len());
        let mut edges_by_source: HashMap<String, Vec<usize>> = HashMap::new();
        let mut edges_by_target: HashMap<String, Vec<usize>> = HashMap::new();

        for tx in transactions {
            let s = tx.sender_id.clone();
            let r = tx.receiver_id.clone();

            adj.entry(s.clone()).or_default().insert(r.clone());
            rev.entry(r.clone()).or_default().insert(s.clone());

            let sender_stats = node_stats.entry(s.clone()).or_insert_with(NodeStats::empty);
            sender_stats.tx_out += 1;
            sender_stats.total_out += tx.amount;
            if let Some(ts) = tx.timestamp {
                sender_stats.timestamps.push(ts);
            }

            let receiver_stats = node_stats.entry(r.clone()).or_insert_with(NodeStats::empty);
            receiver_stats.tx_in += 1;
            receiver_stats.total_in += tx.amount;
            if let Some(ts) = tx.timestamp {
                receiver_stats.timestamps.push(ts);
            }

            let idx = edges.len();
            edges.push(Edge {
                source: s.clone(),
                target: r.clone(),
                amount: tx.amount,
                timestamp: tx.timestamp,
            });
            edges_by_source.entry(s).or_default().push(idx);
            edges_by_target.entry(r).or_default().push(idx);
        }

        for stats in node_stats.values_mut() {
            stats.timestamps.sort();
            stats.tx_total = stats.tx_in + stats.tx_out;
        }

        // Defensive: a node visited only through adj/rev (never as a stats key)
        // would in practice always have a transaction, but materialise it with
        // zeroed counters rather than let lookups panic.
        let orphaned: Vec<String> = adj
            .keys()
            .chain(rev.keys())
            .filter(|id| !node_stats.contains_key(*id))
            .cloned()
            .collect();
        for id in orphaned {
            node_stats.entry(id).or_insert_with(NodeStats::empty);
        }

        tracing::debug!(
            nodes = node_stats.len(),
            edges = edges.len(),
            "graph built"
        );

        Self {
            adj,
            rev,
            node_stats,
            edges,
            edges_by_source,
            edges_by_target,
        }
    }

    /// All node ids in the graph, ascending.
    pub fn sorted_node_ids(&self) -> Vec<&String> {
        let mut ids: Vec<&String> = self.node_stats.keys().collect();
        ids.sort();
        ids
    }

    pub fn out_neighbors(&self, node: &str) -> &HashSet<String> {
        self.adj.get(node).unwrap_or_else(|| empty_set())
    }

    pub fn in_neighbors(&self, node: &str) -> &HashSet<String> {
        self.rev.get(node).unwrap_or_else(|| empty_set())
    }

    /// Edges with `node` as the source, in insertion order.
    pub fn edges_from(&self, node: &str) -> impl Iterator<Item = &Edge> {
        self.edges_by_source
            .get(node)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Edges with `node` as the target, in insertion order.
    pub fn edges_into(&self, node: &str) -> impl Iterator<Item = &Edge> {
        self.edges_by_target
            .get(node)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Maximum amount seen across any parallel edges `from -> to`.
    pub fn max_amount_between(&self, from: &str, to: &str) -> Option<f64> {
        self.edges_from(from)
            .filter(|e| e.target == to)
            .map(|e| e.amount)
            .fold(None, |acc, amt| Some(acc.map_or(amt, |m: f64| m.max(amt))))
    }

    /// All timestamps of edges `from -> to`.
    pub fn timestamps_between(&self, from: &str, to: &str) -> Vec<DateTime<Utc>> {
        self.edges_from(from)
            .filter(|e| e.target == to)
            .filter_map(|e| e.timestamp)
            .collect()
    }
}
