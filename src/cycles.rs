//! Cycle / ring detector (module C).
//!
//! Enumerates directed cycles of length `CYCLE_MIN..=CYCLE_MAX` with a
//! canonical-start DFS: a cycle is only grown from its lexicographically
//! smallest member, and only extended to neighbours greater than that start,
//! so each cycle is discovered from exactly one starting point.

use crate::graph::TransactionGraph;
use std::collections::{BTreeSet, HashSet};

pub const CYCLE_MIN: usize = 3;
pub const CYCLE_MAX: usize = 5;
/// Hard cap: prevents exponential blowup on dense graphs.
pub const CYCLE_MAX_RESULTS: usize = 500;

/// Enumerates cycles, deduplicated by member set, in discovery order.
pub fn detect_cycles(graph: &TransactionGraph) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = Vec::new();
    let all_nodes = graph.sorted_node_ids();

    for start in &all_nodes {
        if cycles.len() >= CYCLE_MAX_RESULTS {
            break;
        }
        let mut path = vec![(*start).clone()];
        let mut on_path: HashSet<String> = HashSet::new();
        on_path.insert((*start).clone());
        dfs(graph, start, start, &mut path, &mut on_path, &mut cycles);
    }

    dedup_by_member_set(cycles)
}

fn dfs(
    graph: &TransactionGraph,
    start: &str,
    current: &str,
    path: &mut Vec<String>,
    on_path: &mut HashSet<String>,
    cycles: &mut Vec<Vec<String>>,
) {
    if cycles.len() >= CYCLE_MAX_RESULTS {
        return;
    }
    if path.len() > CYCLE_MAX {
        return;
    }

    let mut neighbors: Vec<&String> = graph.out_neighbors(current).iter().collect();
    neighbors.sort();

    for neighbor in neighbors {
        if cycles.len() >= CYCLE_MAX_RESULTS {
            return;
        }
        if neighbor == start && path.len() >= CYCLE_MIN {
            cycles.push(path.clone());
            continue;
        }
        if !on_path.contains(neighbor) && neighbor.as_str() > start {
            path.push(neighbor.clone());
            on_path.insert(neighbor.clone());
            dfs(graph, start, neighbor, path, on_path, cycles);
            path.pop();
            on_path.remove(neighbor);
        }
    }
}

fn dedup_by_member_set(cycles: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut seen: HashSet<BTreeSet<String>> = HashSet::new();
    let mut unique = Vec::with_capacity(cycles.len());
    for cycle in cycles {
        let key: BTreeSet<String> = cycle.iter().cloned().collect();
        if seen.insert(key) {
            unique.push(cycle);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transaction;

    fn tx(s: &str, r: &str) -> Transaction {
        Transaction {
            transaction_id: format!("{s}-{r}"),
            sender_id: s.to_string(),
            receiver_id: r.to_string(),
            amount: 100.0,
            timestamp: None,
        }
    }

    #[test]
    fn finds_simple_triangle() {
        let txs = vec![tx("A", "B"), tx("B", "C"), tx("C", "A")];
        let graph = TransactionGraph::build(&txs);
        let cycles = detect_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["A", "B", "C"]);
    }

    #[test]
    fn ignores_paths_shorter_than_cycle_min() {
        let txs = vec![tx("A", "B"), tx("B", "A")];
        let graph = TransactionGraph::build(&txs);
        assert!(detect_cycles(&graph).is_empty());
    }

    #[test]
    fn caps_length_at_cycle_max() {
        // A 6-hop cycle is not reported: it exceeds CYCLE_MAX.
        let txs = vec![
            tx("A", "B"),
            tx("B", "C"),
            tx("C", "D"),
            tx("D", "E"),
            tx("E", "F"),
            tx("F", "A"),
        ];
        let graph = TransactionGraph::build(&txs);
        assert!(detect_cycles(&graph).is_empty());
    }

    #[test]
    fn no_self_loops_without_a_cycle() {
        let txs = vec![tx("A", "B"), tx("B", "C")];
        let graph = TransactionGraph::build(&txs);
        assert!(detect_cycles(&graph).is_empty());
    }
}
