//! End-to-end scenario tests exercising `analyze` over small, fully worked
//! transaction batches covering each detector and the consolidation rules.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fraudgraph_core::{analyze, consolidate::PatternType, Transaction};

fn hours(h: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(h)
}

fn tx(s: &str, r: &str, amount: f64, hour: i64) -> Transaction {
    Transaction {
        transaction_id: format!("{s}-{r}-{hour}"),
        sender_id: s.to_string(),
        receiver_id: r.to_string(),
        amount,
        timestamp: Some(hours(hour)),
    }
}

#[test]
fn minimal_three_cycle() {
    let txs = vec![
        tx("A", "B", 5000.0, 0),
        tx("B", "C", 4800.0, 2),
        tx("C", "A", 4600.0, 5),
    ];
    let report = analyze(&txs);

    assert_eq!(report.fraud_rings.len(), 1);
    let ring = &report.fraud_rings[0];
    assert_eq!(ring.pattern_type, PatternType::Cycle);
    let mut members = ring.member_accounts.clone();
    members.sort();
    assert_eq!(members, vec!["A", "B", "C"]);
    assert_eq!(ring.risk_score, 99.0);

    assert_eq!(report.suspicious_accounts.len(), 3);
    assert!(report.suspicious_accounts.iter().all(|a| a.ring_id == ring.ring_id));
}

#[test]
fn fan_in_smurf() {
    let mut txs: Vec<Transaction> = (1..=14)
        .map(|i| Transaction {
            transaction_id: format!("SENDER_{i}-H"),
            sender_id: format!("SENDER_{i}"),
            receiver_id: "H".to_string(),
            amount: 500.0 + (i as f64 * 10.0),
            timestamp: Some(hours(0) + Duration::minutes(i * 30)),
        })
        .collect();
    txs.push(tx("H", "OUT1", 3000.0, 20));
    txs.push(tx("H", "OUT2", 2800.0, 21));

    let report = analyze(&txs);

    let ring = report
        .fraud_rings
        .iter()
        .find(|r| r.pattern_type == PatternType::Smurfing)
        .expect("smurfing ring detected");
    assert_eq!(ring.risk_score, 80.0);

    let hub = report.suspicious_accounts.iter().find(|a| a.account_id == "H").unwrap();
    // Dampened accumulation, not the ring's raw risk score: 0 + 80*0.6*(1-0/120) = 48.0,
    // then 14*1.5=21.0 applied against a current score of 48.0: 48.0 + 21.0*(1-48.0/120.0) = 60.6.
    assert_eq!(hub.suspicion_score, 60.6);
    assert_eq!(hub.ring_id, ring.ring_id);
    assert!(hub.detected_patterns.contains(&"fan_in".to_string()));
    assert!(hub.detected_patterns.contains(&"high_velocity".to_string()));

    for i in 1..=14 {
        let sender_id = format!("SENDER_{i}");
        let sender = report
            .suspicious_accounts
            .iter()
            .find(|a| a.account_id == sender_id)
            .expect("peripheral sender is still flagged");
        assert_eq!(sender.ring_id, "RING_UNKNOWN");
    }
}

#[test]
fn legitimate_merchant_is_suppressed() {
    let mut txs: Vec<Transaction> = (1..=21)
        .map(|i| tx(&format!("CUST{i}"), "M", 50.0 + i as f64 * 5.0, i as i64))
        .collect();
    txs.push(tx("M", "SUPPLIER", 900.0, 100));

    let report = analyze(&txs);

    assert!(!report.suspicious_accounts.iter().any(|a| a.account_id == "M"));
    assert!(report.fraud_rings.is_empty());
    let node = report.graph.nodes.iter().find(|n| n.id == "M").unwrap();
    assert!(!node.suspicious);
}

#[test]
fn shell_chain() {
    let txs = vec![
        tx("S", "X1", 12000.0, 0),
        tx("X1", "X2", 11800.0, 5),
        tx("X2", "X3", 11600.0, 12),
        tx("X3", "D", 11400.0, 20),
    ];
    let report = analyze(&txs);

    let ring = report
        .fraud_rings
        .iter()
        .find(|r| r.pattern_type == PatternType::ShellNetwork)
        .expect("shell ring detected");
    assert_eq!(ring.risk_score, 95.0);
    assert_eq!(ring.member_accounts, vec!["S", "X1", "X2", "X3", "D"]);
}

#[test]
fn ring_dedup_keeps_higher_scoring_cycle() {
    let txs = vec![
        tx("A", "B", 5000.0, 0),
        tx("B", "C", 4800.0, 2),
        tx("C", "A", 4600.0, 5),
        tx("C", "D", 4500.0, 6),
        tx("D", "A", 4400.0, 8),
    ];
    let report = analyze(&txs);

    assert_eq!(report.fraud_rings.len(), 1);
    let ring = &report.fraud_rings[0];
    assert_eq!(ring.ring_id, "RING_001");
    assert_eq!(ring.risk_score, 99.0);
    let mut members = ring.member_accounts.clone();
    members.sort();
    assert_eq!(members, vec!["A", "B", "C"]);
}

#[test]
fn unparseable_timestamps_drop_temporal_bonus_and_velocity() {
    let txs = vec![
        Transaction { transaction_id: "1".into(), sender_id: "A".into(), receiver_id: "B".into(), amount: 5000.0, timestamp: None },
        Transaction { transaction_id: "2".into(), sender_id: "B".into(), receiver_id: "C".into(), amount: 4800.0, timestamp: None },
        Transaction { transaction_id: "3".into(), sender_id: "C".into(), receiver_id: "A".into(), amount: 4600.0, timestamp: None },
    ];
    let report = analyze(&txs);

    assert_eq!(report.fraud_rings.len(), 1);
    assert_eq!(report.fraud_rings[0].risk_score, 91.0);
    assert!(report
        .suspicious_accounts
        .iter()
        .all(|a| !a.detected_patterns.contains(&"high_velocity".to_string())));
}
