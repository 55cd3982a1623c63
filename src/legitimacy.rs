//! Legitimacy filter (module F).
//!
//! Suppresses accounts whose degree and flow shape look like ordinary
//! merchant or payroll activity rather than layering, before any pattern
//! score is accumulated against them.

use crate::graph::TransactionGraph;
use std::collections::HashSet;

pub const MERCHANT_IN_DEGREE: usize = 12;
pub const PAYROLL_OUT_DEGREE: usize = 15;

pub fn legitimate_accounts(graph: &TransactionGraph) -> HashSet<String> {
    let mut legit = HashSet::new();

    for (nid, stats) in &graph.node_stats {
        let in_deg = graph.in_neighbors(nid).len();
        let out_deg = graph.out_neighbors(nid).len();

        // High-volume merchant: many unique senders, very few unique
        // receivers, total inflow significantly exceeds outflow.
        if in_deg >= MERCHANT_IN_DEGREE && out_deg <= 5 && stats.total_in > stats.total_out * 2.0 {
            legit.insert(nid.clone());
        }

        // Payroll: disperses to many unique recipients, funded by very
        // few sources.
        if out_deg >= PAYROLL_OUT_DEGREE && in_deg <= 3 {
            legit.insert(nid.clone());
        }

        // Payroll intermediary: single large inflow, many similar-sized
        // outflows.
        if stats.tx_in <= 3
            && stats.tx_out >= PAYROLL_OUT_DEGREE
            && stats.total_in > 0.0
            && ((stats.total_in - stats.total_out).abs() / stats.total_in) < 0.15
        {
            legit.insert(nid.clone());
        }
    }

    legit
}
