//! # fraudgraph-core
//!
//! A graph-analytics fraud detection core: builds a directed transaction
//! multigraph and runs three pattern detectors over it — cycle/ring
//! enumeration, smurfing hub detection, and shell-chain discovery — plus a
//! legitimacy filter to hold back false positives, then consolidates
//! everything into deduplicated fraud rings with bounded account scores and
//! a bounded visualisation payload.
//!
//! ## Design
//!
//! - **Single-threaded and synchronous.** [`analyze`] runs one batch to
//!   completion; there is no internal concurrency to reason about.
//! - **Deterministic.** Every place a hash-iteration order would otherwise
//!   leak into the output is sorted explicitly.
//! - **Bounded.** Every detector enforces a hard result or step cap, so a
//!   dense adversarial graph cannot blow up the run.
//!
//! ## Example
//!
//! ```
//! let transactions = fraudgraph_core::sample::generate_sample();
//! let report = fraudgraph_core::analyze(&transactions);
//! assert!(report.summary.total_accounts_analyzed > 0);
//! ```

pub mod consolidate;
pub mod cycles;
pub mod graph;
pub mod ingest;
pub mod legitimacy;
pub mod sample;
pub mod shell;
pub mod smurf;
pub mod window;

pub use consolidate::{PatternType, Ring, SuspiciousAccount};
pub use graph::TransactionGraph;
pub use ingest::{IngestError, RawRecord};
pub use visualization::{GraphPayload, MAX_GRAPH_NODES};

mod visualization;

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A single input record: one transfer of `amount` from `sender_id` to
/// `receiver_id` at `timestamp` (absent/unparseable timestamps are `None`).
/// `transaction_id` is opaque to the analytics core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: f64,
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// Resource and run counters surfaced alongside the findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_accounts_analyzed: usize,
    pub total_transactions: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub cycles_found: usize,
    pub smurfing_hubs_found: usize,
    pub shell_chains_found: usize,
    pub processing_time_seconds: f64,
}

/// The full result of one [`analyze`] run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<Ring>,
    pub graph: GraphPayload,
    pub summary: Summary,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub(crate) fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

pub(crate) fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Runs the full pipeline over a batch of transactions: graph build,
/// detectors, legitimacy filter, ring consolidation, and visualisation
/// payload. `summary.processing_time_seconds` is left at `0.0`; callers
/// that want it filled in should use [`analyze_timed`].
pub fn analyze(transactions: &[Transaction]) -> Report {
    let graph = {
        let _span = tracing::debug_span!("graph_build", transactions = transactions.len()).entered();
        TransactionGraph::build(transactions)
    };

    let cycles = {
        let _span = tracing::debug_span!("cycle_detect").entered();
        cycles::detect_cycles(&graph)
    };

    let smurfing = {
        let _span = tracing::debug_span!("smurf_detect").entered();
        smurf::detect_smurfing(&graph)
    };

    let shells = {
        let _span = tracing::debug_span!("shell_detect").entered();
        shell::detect_shell_networks(&graph)
    };

    let legit = {
        let _span = tracing::debug_span!("legitimacy_filter").entered();
        legitimacy::legitimate_accounts(&graph)
    };

    let (suspicious_accounts, fraud_rings) = {
        let _span = tracing::debug_span!("consolidate").entered();
        consolidate::build_rings_and_scores(&graph, &cycles, &smurfing, &shells, &legit)
    };

    let graph_payload = {
        let _span = tracing::debug_span!("visualize").entered();
        let suspicious_set: std::collections::HashSet<String> = suspicious_accounts
            .iter()
            .map(|s| s.account_id.clone())
            .collect();
        let ring_map: std::collections::HashMap<String, String> = fraud_rings
            .iter()
            .flat_map(|ring| ring.member_accounts.iter().map(move |m| (m.clone(), ring.ring_id.clone())))
            .collect();
        visualization::build_graph_payload(&graph, &suspicious_set, &ring_map)
    };

    let summary = Summary {
        total_accounts_analyzed: graph.node_stats.len(),
        total_transactions: transactions.len(),
        suspicious_accounts_flagged: suspicious_accounts.len(),
        fraud_rings_detected: fraud_rings.len(),
        cycles_found: cycles.len(),
        smurfing_hubs_found: smurfing.len(),
        shell_chains_found: shells.len(),
        processing_time_seconds: 0.0,
    };

    tracing::info!(
        accounts = summary.total_accounts_analyzed,
        transactions = summary.total_transactions,
        suspicious = summary.suspicious_accounts_flagged,
        rings = summary.fraud_rings_detected,
        "analysis complete"
    );

    Report {
        suspicious_accounts,
        fraud_rings,
        graph: graph_payload,
        summary,
    }
}

/// [`analyze`], but measures wall-clock time with [`std::time::Instant`] and
/// fills `summary.processing_time_seconds` in.
pub fn analyze_timed(transactions: &[Transaction]) -> Report {
    let start = Instant::now();
    let mut report = analyze(transactions);
    report.summary.processing_time_seconds = round2(start.elapsed().as_secs_f64());
    report
}
