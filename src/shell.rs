//! Shell-chain detector (module E).
//!
//! Breadth-first enumeration of paths through low-activity intermediary
//! accounts, bounded by a global BFS step budget so a dense graph cannot
//! blow up the search.

use crate::graph::TransactionGraph;
use std::collections::{HashSet, VecDeque};

pub const SHELL_MAX_TX: usize = 3;
pub const SHELL_MIN_CHAIN: usize = 3;
pub const SHELL_MIN_INTERMEDIARY: usize = 2;
/// BFS budget: guarantees termination on large graphs.
pub const SHELL_MAX_STEPS: usize = 50_000;
pub const MAX_SHELL_RESULTS: usize = 300;
const MAX_PATH_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct ShellChain {
    pub path: Vec<String>,
    pub shell_count: usize,
}

pub fn detect_shell_networks(graph: &TransactionGraph) -> Vec<ShellChain> {
    let mut shells: Vec<ShellChain> = Vec::new();
    let mut seen_paths: HashSet<String> = HashSet::new();
    let mut total_steps = 0usize;

    for start in graph.sorted_node_ids() {
        if shells.len() >= MAX_SHELL_RESULTS || total_steps >= SHELL_MAX_STEPS {
            break;
        }

        let mut queue: VecDeque<Vec<String>> = VecDeque::new();
        queue.push_back(vec![start.clone()]);
        let mut enqueued: HashSet<String> = HashSet::new();
        enqueued.insert(start.clone());

        while let Some(path) = queue.pop_front() {
            if total_steps >= SHELL_MAX_STEPS || shells.len() >= MAX_SHELL_RESULTS {
                break;
            }
            total_steps += 1;

            if path.len() > MAX_PATH_LEN {
                continue;
            }

            let cur = path.last().unwrap().clone();
            let mut neighbors: Vec<&String> = graph.out_neighbors(&cur).iter().collect();
            neighbors.sort();

            for next in neighbors {
                if enqueued.contains(next) {
                    continue;
                }
                let mut new_path = path.clone();
                new_path.push(next.clone());
                let path_key = new_path.join("->");
                if !seen_paths.insert(path_key) {
                    continue;
                }

                let shell_count = new_path[1..new_path.len() - 1]
                    .iter()
                    .filter(|n| {
                        graph
                            .node_stats
                            .get(*n)
                            .map(|s| s.tx_total <= SHELL_MAX_TX)
                            .unwrap_or(false)
                    })
                    .count();

                if new_path.len() >= SHELL_MIN_CHAIN && shell_count >= SHELL_MIN_INTERMEDIARY {
                    shells.push(ShellChain {
                        path: new_path.clone(),
                        shell_count,
                    });
                }

                enqueued.insert(next.clone());
                queue.push_back(new_path);
            }
        }
    }

    shells.truncate(MAX_SHELL_RESULTS);
    tracing::debug!(chains = shells.len(), steps = total_steps, "shell detection complete");
    shells
}
