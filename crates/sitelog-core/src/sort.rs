//! Risk ordering for procurement logs.

use crate::merge::dedup_last_wins;
use crate::record::ProcurementRecord;

/// Order records by risk without mutating the input.
///
/// Primary key is status priority (Delayed, Pending, Confirmed). Within the
/// same status, records whose delivery date is the `"Pending"` sentinel come
/// first. Anything else keeps its input order: `sort_by_key` is stable.
pub fn sort_by_risk(records: &[ProcurementRecord]) -> Vec<ProcurementRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| (r.status.priority(), !r.delivery_marked_pending()));
    sorted
}

/// The per-project procurement log shown on the dashboard.
///
/// Keeps records whose project name equals `project` exactly, collapses any
/// remaining duplicate keys (last wins), then applies [`sort_by_risk`].
pub fn project_log(records: &[ProcurementRecord], project: &str) -> Vec<ProcurementRecord> {
    if project.is_empty() {
        return Vec::new();
    }
    let selected: Vec<ProcurementRecord> = records
        .iter()
        .filter(|r| r.project_name == project)
        .cloned()
        .collect();
    sort_by_risk(&dedup_last_wins(selected))
}
