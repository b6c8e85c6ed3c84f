//! Record resolution: which records a key shows by default.
//!
//! Each save on a host writes one record per changed key, stamped with the
//! save time. Reading every host's file yields all of them; the default view
//! filters that set by timestamp collision. Records are taken from a working
//! set one at a time, and a record is discarded when a record still in the
//! working set carries the same timestamp. One record per timestamp
//! survives, so the same record present in two files shows once.
//!
//! This is not a "latest per username" grouping: two hosts writing the same
//! username at different times both show, while two different writes that
//! happen to share a second keep only one. `Resolution::All` bypasses the
//! filter when the full history is wanted.

use std::collections::VecDeque;

use crate::record::Record;

/// How records are selected for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// One record per timestamp; the rest of a collision is dropped.
    #[default]
    Latest,

    /// Every record, unfiltered.
    All,
}

impl Resolution {
    /// `All` when the caller asked for the full history.
    pub fn from_all_flag(all: bool) -> Self {
        if all {
            Resolution::All
        } else {
            Resolution::Latest
        }
    }

    /// Apply this mode to the records of one key.
    pub fn apply(self, records: Vec<Record>) -> Vec<Record> {
        match self {
            Resolution::Latest => dedup(records),
            Resolution::All => {
                let mut records = records;
                records.sort();
                records
            }
        }
    }
}

/// Timestamp-collision filter over the records of one key.
///
/// The working set is sorted by the record order and drained from the
/// front; a record is discarded when any record still remaining has the same
/// timestamp. The survivor of each collision is therefore the greatest
/// record of its group. Survivors are returned ascending.
///
/// The filter is idempotent: survivors have pairwise distinct timestamps.
pub fn dedup(records: Vec<Record>) -> Vec<Record> {
    let mut working = records;
    working.sort();
    let mut working = VecDeque::from(working);

    let mut kept = Vec::with_capacity(working.len());
    while let Some(record) = working.pop_front() {
        if working.iter().any(|q| q.timestamp == record.timestamp) {
            tracing::debug!(
                key = %record.key,
                timestamp = record.timestamp,
                "dropping record with colliding timestamp"
            );
            continue;
        }
        kept.push(record);
    }
    kept
}
