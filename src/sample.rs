//! Sample generator (module J, ambient).
//!
//! Builds a fixed synthetic batch covering one shared-node 3-cycle, one
//! 4-cycle, a 14-sender fan-in smurf, a 13-receiver fan-out smurf, a 4-node
//! shell chain, a legitimate merchant, a legitimate payroll employer plus
//! intermediary, and background noise. Used by tests and the `demos/`
//! example binary in place of a live CSV upload.

use crate::Transaction;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 42;

fn push_tx(
    txs: &mut Vec<Transaction>,
    tx_id: &mut u32,
    base: DateTime<Utc>,
    sender: &str,
    receiver: &str,
    amount: f64,
    hours: f64,
) {
    txs.push(Transaction {
        transaction_id: format!("TX_{:05}", tx_id),
        sender_id: sender.to_string(),
        receiver_id: receiver.to_string(),
        amount,
        timestamp: Some(base + Duration::milliseconds((hours * 3_600_000.0).round() as i64)),
    });
    *tx_id += 1;
}

/// Generates the built-in demo dataset deterministically: the same seeded
/// RNG stream drives the small amount/timing jitter on every call, so
/// repeated invocations are byte-identical.
pub fn generate_sample() -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut txs = Vec::new();
    let mut tx_id = 1u32;
    let base = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();

    // Pattern 1: 3-hop cycle ring, revisited with a second smaller pass.
    push_tx(&mut txs, &mut tx_id, base, "ACC_A001", "ACC_A002", 5000.0, 0.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_A002", "ACC_A003", 4800.0, 2.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_A003", "ACC_A001", 4600.0, 5.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_A001", "ACC_A002", 3200.0, 24.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_A002", "ACC_A004", 3000.0, 26.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_A004", "ACC_A001", 2900.0, 30.0);

    // Pattern 2: 4-hop cycle.
    push_tx(&mut txs, &mut tx_id, base, "ACC_B001", "ACC_B002", 8000.0, 1.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_B002", "ACC_B003", 7800.0, 3.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_B003", "ACC_B004", 7500.0, 6.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_B004", "ACC_B001", 7200.0, 10.0);

    // Pattern 3: smurfing fan-in, 14 senders into one aggregator.
    for i in 1..=14 {
        let sender = format!("ACC_C{i:03}");
        push_tx(&mut txs, &mut tx_id, base, &sender, "ACC_C_AGG", 500.0 + i as f64 * 10.0, i as f64 * 0.5);
    }
    push_tx(&mut txs, &mut tx_id, base, "ACC_C_AGG", "ACC_C_OUT1", 3000.0, 20.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_C_AGG", "ACC_C_OUT2", 2800.0, 21.0);

    // Pattern 4: smurfing fan-out, one hub to 13 receivers.
    push_tx(&mut txs, &mut tx_id, base, "ACC_D_SRC", "ACC_D_HUB", 15000.0, 0.0);
    for i in 1..=13 {
        let receiver = format!("ACC_D{i:03}");
        push_tx(&mut txs, &mut tx_id, base, "ACC_D_HUB", &receiver, 900.0 + i as f64 * 5.0, i as f64 * 2.0);
    }

    // Pattern 5: shell network, three low-activity intermediaries.
    push_tx(&mut txs, &mut tx_id, base, "ACC_E_SRC", "ACC_E_SH1", 12000.0, 0.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_E_SH1", "ACC_E_SH2", 11800.0, 5.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_E_SH2", "ACC_E_SH3", 11600.0, 12.0);
    push_tx(&mut txs, &mut tx_id, base, "ACC_E_SH3", "ACC_E_DEST", 11400.0, 20.0);

    // Legitimate: high-volume merchant. Many unique senders, one outflow.
    for i in 1..=21 {
        let sender = format!("ACC_CUST{i:03}");
        push_tx(&mut txs, &mut tx_id, base, &sender, "ACC_MERCHANT", 50.0 + i as f64 * 5.0, i as f64);
    }
    push_tx(&mut txs, &mut tx_id, base, "ACC_MERCHANT", "ACC_SUPPLIER", 900.0, 100.0);

    // Legitimate: payroll. One employer funds the intermediary, which
    // disperses to many employees.
    push_tx(&mut txs, &mut tx_id, base, "ACC_EMPLOYER", "ACC_PAYROLL", 50000.0, 70.0);
    for i in 1..=22 {
        let employee = format!("ACC_EMP{i:03}");
        let jitter = rng.gen_range(0..=500) as f64;
        push_tx(&mut txs, &mut tx_id, base, "ACC_PAYROLL", &employee, 2800.0 + jitter, 72.0);
    }

    // Background noise: ordinary transfers among an unrelated cohort.
    let normals: Vec<String> = (1..=15).map(|i| format!("ACC_N{i:02}")).collect();
    for i in 0..35 {
        let sender = normals[rng.gen_range(0..normals.len())].clone();
        let receiver = loop {
            let candidate = &normals[rng.gen_range(0..normals.len())];
            if *candidate != sender {
                break candidate.clone();
            }
        };
        let amount = rng.gen_range(100..=3000) as f64;
        push_tx(&mut txs, &mut tx_id, base, &sender, &receiver, amount, i as f64 * 1.5);
    }

    txs
}
