//! Smurfing (fan-in / fan-out) detector (module D).

use crate::graph::TransactionGraph;
use crate::window::max_in_window;
use chrono::Duration;
use std::collections::HashMap;

/// Minimum unique partners for a fan-in or fan-out flag.
pub const SMURF_THRESHOLD: usize = 10;

fn window_72h() -> Duration {
    Duration::hours(72)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmurfKind {
    FanIn,
    FanOut,
}

impl SmurfKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmurfKind::FanIn => "fan_in",
            SmurfKind::FanOut => "fan_out",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmurfFinding {
    pub kind: SmurfKind,
    pub partners: Vec<String>,
    pub score: f64,
    pub window_count: usize,
}

/// One finding per hub account. A node that is both a fan-in and a fan-out
/// hub keeps only the higher-scoring finding, matching upstream reporting
/// that surfaces a single dominant pattern per account.
pub fn detect_smurfing(graph: &TransactionGraph) -> HashMap<String, SmurfFinding> {
    let mut suspicious: HashMap<String, SmurfFinding> = HashMap::new();

    let mut node_ids: Vec<&String> = graph.node_stats.keys().collect();
    node_ids.sort();

    for nid in node_ids {
        let senders: Vec<String> = {
            let mut v: Vec<String> = graph.in_neighbors(nid).iter().cloned().collect();
            v.sort();
            v
        };
        let receivers: Vec<String> = {
            let mut v: Vec<String> = graph.out_neighbors(nid).iter().cloned().collect();
            v.sort();
            v
        };

        if senders.len() >= SMURF_THRESHOLD {
            let in_ts: Vec<_> = graph.edges_into(nid).filter_map(|e| e.timestamp).collect();
            let mut sorted_ts = in_ts;
            sorted_ts.sort();
            let window_count = max_in_window(&sorted_ts, window_72h());
            let score = (40.0
                + (senders.len() as f64 - SMURF_THRESHOLD as f64) * 3.0
                + window_count as f64 * 2.0)
                .min(100.0);
            suspicious.insert(
                nid.clone(),
                SmurfFinding {
                    kind: SmurfKind::FanIn,
                    partners: senders,
                    score,
                    window_count,
                },
            );
        }

        if receivers.len() >= SMURF_THRESHOLD {
            let out_ts: Vec<_> = graph.edges_from(nid).filter_map(|e| e.timestamp).collect();
            let mut sorted_ts = out_ts;
            sorted_ts.sort();
            let window_count = max_in_window(&sorted_ts, window_72h());
            let score = (40.0
                + (receivers.len() as f64 - SMURF_THRESHOLD as f64) * 3.0
                + window_count as f64 * 2.0)
                .min(100.0);

            let replace = match suspicious.get(nid) {
                Some(existing) => existing.score < score,
                None => true,
            };
            if replace {
                suspicious.insert(
                    nid.clone(),
                    SmurfFinding {
                        kind: SmurfKind::FanOut,
                        partners: receivers,
                        score,
                        window_count,
                    },
                );
            }
        }
    }

    tracing::debug!(hubs = suspicious.len(), "smurfing detection complete");
    suspicious
}
