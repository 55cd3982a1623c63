//! Ring consolidation & scoring (module G).
//!
//! Turns raw detector output (cycles, smurfing hubs, shell chains) into
//! deduplicated fraud rings and per-account suspicion scores. Scores
//! accumulate with diminishing returns as an account approaches the cap, so
//! no single pattern can push an account past 100 on its own.

use crate::graph::TransactionGraph;
use crate::legitimacy;
use crate::round1;
use crate::shell::ShellChain;
use crate::smurf::{SmurfFinding, SmurfKind};
use crate::window::max_in_window;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Cycle,
    Smurfing,
    ShellNetwork,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub ring_id: String,
    pub member_accounts: Vec<String>,
    pub pattern_type: PatternType,
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    pub account_id: String,
    pub suspicion_score: f64,
    pub detected_patterns: Vec<String>,
    pub ring_id: String,
}

struct AccountFlags {
    patterns: HashSet<String>,
    ring_id: Option<String>,
    score: f64,
}

impl AccountFlags {
    fn empty() -> Self {
        Self {
            patterns: HashSet::new(),
            ring_id: None,
            score: 0.0,
        }
    }
}

fn flag(
    account_flags: &mut HashMap<String, AccountFlags>,
    legit: &HashSet<String>,
    acc: &str,
    pattern: &str,
    ring_id: Option<&str>,
    score: f64,
) {
    if legit.contains(acc) {
        return;
    }
    let entry = account_flags
        .entry(acc.to_string())
        .or_insert_with(AccountFlags::empty);
    entry.patterns.insert(pattern.to_string());
    let current = entry.score;
    entry.score = (current + score * (1.0 - current / 120.0)).min(100.0);
    if let Some(rid) = ring_id {
        if entry.ring_id.is_none() {
            entry.ring_id = Some(rid.to_string());
        }
    }
}

fn dedup_preserve_order(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item.clone());
        }
    }
    out
}

/// Amount-decay layering signal: each hop in the cycle sends roughly
/// 65%-98% of what the previous hop sent.
fn has_amount_decay(graph: &TransactionGraph, cycle_nodes: &[String]) -> bool {
    if cycle_nodes.len() < 3 {
        return false;
    }
    let n = cycle_nodes.len();
    let mut amounts = Vec::with_capacity(n);
    for i in 0..n {
        let s = &cycle_nodes[i];
        let r = &cycle_nodes[(i + 1) % n];
        match graph.max_amount_between(s, r) {
            Some(amt) => amounts.push(amt),
            None => return false,
        }
    }
    for i in 1..amounts.len() {
        let ratio = if amounts[i - 1] > 0.0 {
            amounts[i] / amounts[i - 1]
        } else {
            1.0
        };
        if !(0.65..=0.98).contains(&ratio) {
            return false;
        }
    }
    true
}

fn cycle_temporal_score(graph: &TransactionGraph, cycle_nodes: &[String]) -> f64 {
    let n = cycle_nodes.len();
    let mut timestamps = Vec::new();
    for i in 0..n {
        let s = &cycle_nodes[i];
        let r = &cycle_nodes[(i + 1) % n];
        timestamps.extend(graph.timestamps_between(s, r));
    }
    if timestamps.is_empty() {
        return 0.0;
    }
    let min_ts = *timestamps.iter().min().unwrap();
    let max_ts = *timestamps.iter().max().unwrap();
    let span = max_ts - min_ts;
    if span <= Duration::hours(72) {
        8.0
    } else if span <= Duration::hours(168) {
        4.0
    } else {
        0.0
    }
}

/// Builds deduplicated fraud rings and per-account suspicion scores from raw
/// detector output.
pub fn build_rings_and_scores(
    graph: &TransactionGraph,
    cycles: &[Vec<String>],
    smurfing: &HashMap<String, SmurfFinding>,
    shells: &[ShellChain],
    legit: &HashSet<String>,
) -> (Vec<SuspiciousAccount>, Vec<Ring>) {
    let mut account_flags: HashMap<String, AccountFlags> = HashMap::new();
    let mut rings: Vec<Ring> = Vec::new();
    let mut ring_counter: u32 = 1;

    for cycle in cycles {
        let rid = format!("RING_{ring_counter:03}");
        ring_counter += 1;

        let cycle_len = cycle.iter().collect::<HashSet<_>>().len();
        let base = match cycle_len {
            3 => 85.0,
            4 => 80.0,
            5 => 75.0,
            _ => 70.0,
        };
        let temporal_bonus = cycle_temporal_score(graph, cycle);
        let decay_bonus = if has_amount_decay(graph, cycle) { 6.0 } else { 0.0 };
        let risk = (base + temporal_bonus + decay_bonus).min(100.0);

        let members: Vec<String> = dedup_preserve_order(cycle)
            .into_iter()
            .filter(|m| !legit.contains(m))
            .collect();
        if members.len() < 2 {
            continue;
        }

        rings.push(Ring {
            ring_id: rid.clone(),
            member_accounts: members.clone(),
            pattern_type: PatternType::Cycle,
            risk_score: round1(risk),
        });

        let pattern_label = format!("cycle_length_{cycle_len}");
        for acc in &members {
            flag(
                &mut account_flags,
                legit,
                acc,
                &pattern_label,
                Some(&rid),
                base + temporal_bonus * 0.5,
            );
        }
    }

    let mut smurf_hubs: Vec<&String> = smurfing.keys().collect();
    smurf_hubs.sort();
    for acc in smurf_hubs {
        if legit.contains(acc) {
            continue;
        }
        let info = &smurfing[acc];
        let rid = format!("RING_{ring_counter:03}");
        ring_counter += 1;

        let mut raw_members = vec![acc.clone()];
        raw_members.extend(info.partners.iter().take(20).cloned());
        let filtered: Vec<String> = raw_members
            .into_iter()
            .filter(|m| !legit.contains(m))
            .collect();
        let members = dedup_preserve_order(&filtered);

        let risk = info.score;
        rings.push(Ring {
            ring_id: rid.clone(),
            member_accounts: members.clone(),
            pattern_type: PatternType::Smurfing,
            risk_score: round1(risk),
        });

        flag(&mut account_flags, legit, acc, info.kind.as_str(), Some(&rid), risk * 0.6);
        if info.window_count >= 5 {
            flag(
                &mut account_flags,
                legit,
                acc,
                "high_velocity",
                Some(&rid),
                info.window_count as f64 * 1.5,
            );
        }

        let peripheral_pattern = if info.kind == SmurfKind::FanIn {
            "fan_in_contributor"
        } else {
            "fan_out_receiver"
        };
        for m in members.iter().skip(1) {
            flag(&mut account_flags, legit, m, peripheral_pattern, None, risk * 0.3);
        }
    }

    for shell_chain in shells {
        let rid = format!("RING_{ring_counter:03}");
        ring_counter += 1;

        let filtered: Vec<String> = shell_chain
            .path
            .iter()
            .filter(|m| !legit.contains(*m))
            .cloned()
            .collect();
        let members = dedup_preserve_order(&filtered);
        if members.len() < 2 {
            continue;
        }

        let risk = (55.0 + shell_chain.shell_count as f64 * 10.0 + shell_chain.path.len() as f64 * 2.0)
            .min(100.0);
        rings.push(Ring {
            ring_id: rid.clone(),
            member_accounts: members.clone(),
            pattern_type: PatternType::ShellNetwork,
            risk_score: round1(risk),
        });

        for acc in &members {
            flag(&mut account_flags, legit, acc, "layered_shell", Some(&rid), risk * 0.5);
        }
    }

    let mut flagged_accounts: Vec<String> = account_flags.keys().cloned().collect();
    flagged_accounts.sort();
    for acc in &flagged_accounts {
        let mut ts_list: Vec<_> = graph
            .edges_from(acc)
            .filter_map(|e| e.timestamp)
            .chain(graph.edges_into(acc).filter_map(|e| e.timestamp))
            .collect();
        ts_list.sort();
        if max_in_window(&ts_list, Duration::hours(24)) >= 6 {
            account_flags
                .get_mut(acc)
                .unwrap()
                .patterns
                .insert("high_velocity".to_string());
        }
    }

    let (deduped, ring_id_lookup) = deduplicate_rings(rings);

    let mut suspicious: Vec<SuspiciousAccount> = Vec::new();
    for acc in &flagged_accounts {
        let flags = &account_flags[acc];
        if flags.score < 1.0 {
            continue;
        }
        // Only an account that was itself anchored to a ring at flag() time
        // (the ring's hub/core members) inherits that ring's post-dedup id;
        // peripheral contributors flagged with `ring_id: None` stay unknown.
        let assigned_ring = flags
            .ring_id
            .as_ref()
            .and_then(|old_rid| ring_id_lookup.get(old_rid))
            .cloned();
        let mut patterns: Vec<String> = flags.patterns.iter().cloned().collect();
        patterns.sort();
        suspicious.push(SuspiciousAccount {
            account_id: acc.clone(),
            suspicion_score: round1(flags.score.min(100.0)),
            detected_patterns: patterns,
            ring_id: assigned_ring.unwrap_or_else(|| "RING_UNKNOWN".to_string()),
        });
    }
    suspicious.sort_by(|a, b| b.suspicion_score.partial_cmp(&a.suspicion_score).unwrap());

    tracing::debug!(
        suspicious = suspicious.len(),
        rings = deduped.len(),
        "ring consolidation complete"
    );

    (suspicious, deduped)
}

/// Drops rings whose membership overlaps an already-kept ring by more than
/// 85%, keeping the higher-risk ring of the pair, then renumbers what
/// survives sequentially. Returns the survivors plus a map from each
/// survivor's pre-renumbering id to its final id, so callers can remap an
/// account's originally-assigned ring id through the renumbering.
fn deduplicate_rings(rings: Vec<Ring>) -> (Vec<Ring>, HashMap<String, String>) {
    let mut ordered = rings;
    ordered.sort_by(|a, b| b.risk_score.partial_cmp(&a.risk_score).unwrap());

    let mut kept: Vec<Ring> = Vec::new();
    let mut used_sets: Vec<HashSet<String>> = Vec::new();

    for ring in ordered {
        let members: HashSet<String> = ring.member_accounts.iter().cloned().collect();
        let is_duplicate = used_sets.iter().any(|used| {
            let overlap_count = members.intersection(used).count();
            let denom = members.len().min(used.len()).max(1);
            (overlap_count as f64 / denom as f64) > 0.85
        });
        if !is_duplicate {
            used_sets.push(members);
            kept.push(ring);
        }
    }

    let mut old_to_new: HashMap<String, String> = HashMap::new();
    let renumbered = kept
        .into_iter()
        .enumerate()
        .map(|(i, mut ring)| {
            let new_id = format!("RING_{:03}", i + 1);
            old_to_new.insert(ring.ring_id.clone(), new_id.clone());
            ring.ring_id = new_id;
            ring
        })
        .collect();

    (renumbered, old_to_new)
}
