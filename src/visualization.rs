//! Visualisation payload builder (module H).
//!
//! Sends the whole transaction network so a caller can render it with fraud
//! highlighted, not just the flagged subgraph. Capped at `MAX_GRAPH_NODES`;
//! suspicious nodes always take priority over ordinary ones when the cap is
//! hit.

use crate::graph::TransactionGraph;
use crate::round2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const MAX_GRAPH_NODES: usize = 800;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub tx_in: usize,
    pub tx_out: usize,
    pub tx_total: usize,
    pub total_in: f64,
    pub total_out: f64,
    pub suspicious: bool,
    pub ring_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphPayload {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

pub fn build_graph_payload(
    graph: &TransactionGraph,
    suspicious_set: &HashSet<String>,
    ring_map: &HashMap<String, String>,
) -> GraphPayload {
    let all_node_count = graph.node_stats.len();

    let display_set: HashSet<String> = if all_node_count <= MAX_GRAPH_NODES {
        graph.node_stats.keys().cloned().collect()
    } else {
        let mut normal_nodes: Vec<&String> = graph
            .node_stats
            .keys()
            .filter(|n| !suspicious_set.contains(**n))
            .collect();
        // Busiest accounts first; ties broken by id for determinism.
        normal_nodes.sort_by(|a, b| {
            let ta = graph.node_stats[*a].tx_total;
            let tb = graph.node_stats[*b].tx_total;
            tb.cmp(&ta).then_with(|| a.cmp(b))
        });

        let slots = MAX_GRAPH_NODES.saturating_sub(suspicious_set.len());
        let mut set: HashSet<String> = suspicious_set.clone();
        set.extend(normal_nodes.into_iter().take(slots).cloned());
        set
    };

    let mut sorted_ids: Vec<&String> = display_set.iter().collect();
    sorted_ids.sort();

    let nodes: Vec<GraphNode> = sorted_ids
        .iter()
        .map(|nid| {
            let stats = &graph.node_stats[*nid];
            GraphNode {
                id: (*nid).clone(),
                tx_in: stats.tx_in,
                tx_out: stats.tx_out,
                tx_total: stats.tx_total,
                total_in: round2(stats.total_in),
                total_out: round2(stats.total_out),
                suspicious: suspicious_set.contains(*nid),
                ring_id: ring_map.get(*nid).cloned(),
            }
        })
        .collect();

    let mut seen_edges: HashSet<(String, String)> = HashSet::new();
    let mut edges: Vec<GraphEdge> = Vec::new();
    for e in &graph.edges {
        if display_set.contains(&e.source) && display_set.contains(&e.target) {
            let key = (e.source.clone(), e.target.clone());
            if seen_edges.insert(key) {
                edges.push(GraphEdge {
                    source: e.source.clone(),
                    target: e.target.clone(),
                    amount: round2(e.amount),
                });
            }
        }
    }

    tracing::debug!(nodes = nodes.len(), edges = edges.len(), "graph payload built");
    GraphPayload { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transaction;

    fn tx(s: &str, r: &str, amount: f64) -> Transaction {
        Transaction {
            transaction_id: format!("{s}-{r}"),
            sender_id: s.to_string(),
            receiver_id: r.to_string(),
            amount,
            timestamp: None,
        }
    }

    #[test]
    fn includes_all_nodes_when_under_cap() {
        let txs = vec![tx("A", "B", 10.0), tx("B", "C", 20.0)];
        let graph = TransactionGraph::build(&txs);
        let payload = build_graph_payload(&graph, &HashSet::new(), &HashMap::new());
        assert_eq!(payload.nodes.len(), 3);
        assert_eq!(payload.edges.len(), 2);
    }

    #[test]
    fn collapses_parallel_edges_to_one() {
        let txs = vec![tx("A", "B", 10.0), tx("A", "B", 20.0)];
        let graph = TransactionGraph::build(&txs);
        let payload = build_graph_payload(&graph, &HashSet::new(), &HashMap::new());
        assert_eq!(payload.edges.len(), 1);
    }

    #[test]
    fn marks_suspicious_nodes_and_ring_ids() {
        let txs = vec![tx("A", "B", 10.0)];
        let graph = TransactionGraph::build(&txs);
        let mut suspicious = HashSet::new();
        suspicious.insert("A".to_string());
        let mut ring_map = HashMap::new();
        ring_map.insert("A".to_string(), "RING_001".to_string());

        let payload = build_graph_payload(&graph, &suspicious, &ring_map);
        let node_a = payload.nodes.iter().find(|n| n.id == "A").unwrap();
        assert!(node_a.suspicious);
        assert_eq!(node_a.ring_id.as_deref(), Some("RING_001"));

        let node_b = payload.nodes.iter().find(|n| n.id == "B").unwrap();
        assert!(!node_b.suspicious);
        assert!(node_b.ring_id.is_none());
    }
}
