//! Ingestion boundary (module I, ambient).
//!
//! Turns CSV text or already-split rows into the `Transaction` batch the
//! core operates on. This is the only fallible layer in the crate — the
//! graph builder and detectors are total over well-typed input.

use crate::Transaction;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::io::Read;
use thiserror::Error;

/// Required CSV columns, matched case-insensitively after trimming.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "transaction_id",
    "sender_id",
    "receiver_id",
    "amount",
    "timestamp",
];

/// Timestamp formats tried in order; a value matching none of them is `None`.
pub const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required columns: {0}")]
    MissingColumns(String),
}

/// A row as it arrives before type coercion: the same five fields as
/// [`Transaction`] but string/optional, as they would come off a CSV row.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub transaction_id: String,
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
    pub amount: String,
    pub timestamp: Option<String>,
}

/// Parses CSV text into a `Transaction` batch.
///
/// Header names are normalised to lowercase/trimmed before the required set
/// is checked. Rows missing either endpoint are dropped silently; amount
/// parse failures coerce to `0.0`; timestamp parse failures coerce to `None`.
pub fn from_csv<R: Read>(reader: R) -> Result<Vec<Transaction>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let required: HashSet<&str> = REQUIRED_COLUMNS.iter().copied().collect();
    let present: HashSet<&str> = headers.iter().map(|h| h.as_str()).collect();
    let mut missing: Vec<&str> = required.difference(&present).copied().collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(IngestError::MissingColumns(missing.join(", ")));
    }

    let index_of = |name: &str| headers.iter().position(|h| h == name).unwrap();
    let idx_tx = index_of("transaction_id");
    let idx_sender = index_of("sender_id");
    let idx_receiver = index_of("receiver_id");
    let idx_amount = index_of("amount");
    let idx_ts = index_of("timestamp");

    let mut raw_records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let get = |i: usize| record.get(i).map(|s| s.trim().to_string());
        raw_records.push(RawRecord {
            transaction_id: get(idx_tx).unwrap_or_default(),
            sender_id: get(idx_sender).filter(|s| !s.is_empty()),
            receiver_id: get(idx_receiver).filter(|s| !s.is_empty()),
            amount: get(idx_amount).unwrap_or_default(),
            timestamp: get(idx_ts).filter(|s| !s.is_empty()),
        });
    }

    let transactions = from_records(&raw_records);
    tracing::debug!(rows = transactions.len(), "csv ingested");
    Ok(transactions)
}

/// Converts already-parsed rows into a `Transaction` batch. Total: amount
/// coerces to `0.0` on parse failure, timestamps that match none of the
/// known formats become `None`, and rows missing either endpoint are
/// dropped.
pub fn from_records(raw: &[RawRecord]) -> Vec<Transaction> {
    let kept: Vec<&RawRecord> = raw
        .iter()
        .filter(|r| r.sender_id.is_some() && r.receiver_id.is_some())
        .collect();

    // The whole batch is parsed with a single chosen format, mirroring a
    // column-wide `pd.to_datetime(..., format=fmt)` pass; only if no single
    // format covers every row do we fall back to parsing each row with
    // whichever format fits it.
    let raw_timestamps: Vec<&str> = kept
        .iter()
        .filter_map(|r| r.timestamp.as_deref())
        .collect();
    let uniform_format = TIMESTAMP_FORMATS
        .iter()
        .find(|fmt| raw_timestamps.iter().all(|ts| NaiveDateTime::parse_from_str(ts, fmt).is_ok()));

    kept.into_iter()
        .map(|r| {
            let amount = r.amount.trim().parse::<f64>().unwrap_or(0.0);
            let timestamp = r.timestamp.as_deref().and_then(|ts| match uniform_format {
                Some(fmt) => NaiveDateTime::parse_from_str(ts, fmt).ok(),
                None => TIMESTAMP_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok()),
            });
            Transaction {
                transaction_id: r.transaction_id.clone(),
                sender_id: r.sender_id.clone().unwrap_or_default(),
                receiver_id: r.receiver_id.clone().unwrap_or_default(),
                amount,
                timestamp: timestamp.map(|naive| timestamp_to_utc(naive)),
            }
        })
        .collect()
}

fn timestamp_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&naive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_csv() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                   TX_1,A,B,100.5,2024-01-15 10:00:00\n\
                   TX_2,B,C,50,2024-01-15 12:00:00\n";
        let txs = from_csv(csv.as_bytes()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].sender_id, "A");
        assert_eq!(txs[0].amount, 100.5);
        assert!(txs[0].timestamp.is_some());
    }

    #[test]
    fn header_names_are_case_and_whitespace_insensitive() {
        let csv = " Transaction_ID , Sender_ID, Receiver_ID, Amount, Timestamp\nTX_1,A,B,10,2024-01-15 10:00:00\n";
        let txs = from_csv(csv.as_bytes()).unwrap();
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "transaction_id,sender_id,amount,timestamp\nTX_1,A,10,2024-01-15 10:00:00\n";
        let err = from_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumns(_)));
    }

    #[test]
    fn rows_missing_an_endpoint_are_dropped() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                   TX_1,A,,10,2024-01-15 10:00:00\n\
                   TX_2,A,B,10,2024-01-15 10:00:00\n";
        let txs = from_csv(csv.as_bytes()).unwrap();
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn unparseable_amount_coerces_to_zero() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\nTX_1,A,B,not-a-number,2024-01-15 10:00:00\n";
        let txs = from_csv(csv.as_bytes()).unwrap();
        assert_eq!(txs[0].amount, 0.0);
    }

    #[test]
    fn unparseable_timestamp_coerces_to_none() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\nTX_1,A,B,10,not-a-date\n";
        let txs = from_csv(csv.as_bytes()).unwrap();
        assert!(txs[0].timestamp.is_none());
    }

    #[test]
    fn empty_batch_is_not_an_error() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n";
        let txs = from_csv(csv.as_bytes()).unwrap();
        assert!(txs.is_empty());
    }

    #[test]
    fn alternate_format_is_detected_column_wide() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                   TX_1,A,B,10,15/01/2024 10:00:00\n\
                   TX_2,B,C,20,16/01/2024 11:00:00\n";
        let txs = from_csv(csv.as_bytes()).unwrap();
        assert!(txs.iter().all(|t| t.timestamp.is_some()));
    }

    #[test]
    fn reads_from_an_actual_file_on_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "transaction_id,sender_id,receiver_id,amount,timestamp").unwrap();
        writeln!(file, "TX_1,A,B,250.0,2024-01-15 10:00:00").unwrap();
        let reopened = std::fs::File::open(file.path()).unwrap();

        let txs = from_csv(reopened).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, 250.0);
    }
}
