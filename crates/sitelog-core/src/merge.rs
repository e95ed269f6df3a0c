//! Merge freshly fetched procurement records into the accumulated dataset.
//!
//! A fetch always covers exactly one project and supersedes that project's
//! records wholesale. Records for other projects pass through untouched.
//!
//! # Ordering
//!
//! Records are collected the way an insertion-ordered map behaves: a key
//! keeps the slot of its first insertion and takes the value of its last
//! write. The result is therefore other-project records first (in their
//! original relative order), then the incoming batch in deduplicated order.

use std::collections::HashMap;

use crate::key::{RecordKey, normalize_part};
use crate::record::ProcurementRecord;

/// Insertion-ordered, last-write-wins collection keyed by [`RecordKey`].
#[derive(Default)]
struct KeyedRecords {
    slots: HashMap<RecordKey, usize>,
    records: Vec<ProcurementRecord>,
}

impl KeyedRecords {
    fn with_capacity(n: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(n),
            records: Vec::with_capacity(n),
        }
    }

    fn upsert(&mut self, record: ProcurementRecord) {
        match self.slots.get(&record.key()) {
            Some(&slot) => self.records[slot] = record,
            None => {
                self.slots.insert(record.key(), self.records.len());
                self.records.push(record);
            }
        }
    }

    fn into_vec(self) -> Vec<ProcurementRecord> {
        self.records
    }
}

/// Collapse records sharing a key, keeping the last occurrence's values.
pub fn dedup_last_wins(records: Vec<ProcurementRecord>) -> Vec<ProcurementRecord> {
    let mut keyed = KeyedRecords::with_capacity(records.len());
    for record in records {
        keyed.upsert(record);
    }
    keyed.into_vec()
}

/// Replace every record of `target_project` in `existing` with `incoming`.
///
/// Project comparison is trimmed and case-insensitive. An empty `incoming`
/// clears the project: its prior records are dropped and nothing replaces
/// them.
pub fn merge_project(
    incoming: Vec<ProcurementRecord>,
    existing: &[ProcurementRecord],
    target_project: &str,
) -> Vec<ProcurementRecord> {
    let incoming = dedup_last_wins(incoming);
    if existing.is_empty() {
        return incoming;
    }

    let target = normalize_part(target_project);
    let mut keyed = KeyedRecords::with_capacity(existing.len() + incoming.len());
    for record in existing {
        if normalize_part(&record.project_name) != target {
            keyed.upsert(record.clone());
        }
    }
    let kept = keyed.records.len();

    for record in incoming {
        keyed.upsert(record);
    }

    let merged = keyed.into_vec();
    tracing::debug!(
        project = %target_project,
        kept_other = kept,
        total = merged.len(),
        "merged procurement batch"
    );
    merged
}
