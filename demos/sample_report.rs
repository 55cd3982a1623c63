//! Sample report example
//!
//! Runs the fraud-detection pipeline over the crate's built-in synthetic
//! dataset and prints the resulting suspicious accounts, fraud rings, and
//! summary counters.

use fraudgraph_core::{analyze_timed, sample};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== FraudGraph Sample Report ===\n");

    let transactions = sample::generate_sample();
    let report = analyze_timed(&transactions);

    println!("Summary");
    println!("  Accounts analyzed:   {}", report.summary.total_accounts_analyzed);
    println!("  Transactions:        {}", report.summary.total_transactions);
    println!("  Suspicious accounts: {}", report.summary.suspicious_accounts_flagged);
    println!("  Fraud rings:         {}", report.summary.fraud_rings_detected);
    println!("  Cycles found:        {}", report.summary.cycles_found);
    println!("  Smurfing hubs found: {}", report.summary.smurfing_hubs_found);
    println!("  Shell chains found:  {}", report.summary.shell_chains_found);
    println!("  Processing time:     {:.3}s", report.summary.processing_time_seconds);
    println!();

    println!("Fraud rings");
    for ring in &report.fraud_rings {
        println!(
            "  {} [{:?}] risk={:.1} members={:?}",
            ring.ring_id, ring.pattern_type, ring.risk_score, ring.member_accounts
        );
    }
    println!();

    println!("Suspicious accounts (top 10 by score)");
    for account in report.suspicious_accounts.iter().take(10) {
        println!(
            "  {:<16} score={:>5.1} ring={:<12} patterns={:?}",
            account.account_id, account.suspicion_score, account.ring_id, account.detected_patterns
        );
    }
}
