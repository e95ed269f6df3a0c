//! Procurement KPIs derived from the current record set.
//!
//! Everything here is a pure function of the records passed in; nothing is
//! cached between calls.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::record::{AiAnalysis, ProcurementRecord};
use crate::status::ProcurementStatus;

/// Overall procurement risk for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Classify from delayed count and pending percentage.
    ///
    /// High when anything is delayed or more than half is pending; Moderate
    /// for 20–50% pending inclusive; Low otherwise.
    pub fn classify(delayed_items: usize, pending_percentage: f64) -> Self {
        if delayed_items > 0 || pending_percentage > 50.0 {
            Self::High
        } else if (20.0..=50.0).contains(&pending_percentage) {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All records supplied by one vendor, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorGroup {
    pub vendor_name: String,
    pub records: Vec<ProcurementRecord>,
}

impl VendorGroup {
    /// The analysis shown for the vendor panel: the first record's.
    pub fn representative_analysis(&self) -> Option<&AiAnalysis> {
        self.records.first().and_then(|r| r.ai_analysis.as_ref())
    }

    pub fn has_outstanding(&self) -> bool {
        self.records.iter().any(ProcurementRecord::awaiting_confirmation)
    }
}

/// Summary statistics for a procurement log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcurementStats {
    pub total_items: usize,
    pub pending_confirmations: usize,
    pub confirmed_items: usize,
    pub delayed_items: usize,
    pub pending_percentage: f64,
    pub risk_level: RiskLevel,
    /// First-seen vendor order.
    pub vendor_groups: Vec<VendorGroup>,
    /// Vendor of the first delayed record, in log order.
    pub first_delayed_vendor: Option<String>,
    /// Vendor of the first record awaiting confirmation, in log order.
    pub first_pending_vendor: Option<String>,
}

/// Compute [`ProcurementStats`] for `records`. Total over any input.
pub fn aggregate(records: &[ProcurementRecord]) -> ProcurementStats {
    let total_items = records.len();
    let pending_confirmations = records.iter().filter(|r| r.awaiting_confirmation()).count();
    let confirmed_items = records
        .iter()
        .filter(|r| r.status == ProcurementStatus::Confirmed && !r.delivery_unknown())
        .count();
    let delayed_items = records
        .iter()
        .filter(|r| r.status == ProcurementStatus::Delayed)
        .count();

    let pending_percentage = if total_items > 0 {
        pending_confirmations as f64 / total_items as f64 * 100.0
    } else {
        0.0
    };

    ProcurementStats {
        total_items,
        pending_confirmations,
        confirmed_items,
        delayed_items,
        pending_percentage,
        risk_level: RiskLevel::classify(delayed_items, pending_percentage),
        vendor_groups: group_by_vendor(records),
        first_delayed_vendor: records
            .iter()
            .find(|r| r.status == ProcurementStatus::Delayed)
            .map(|r| r.vendor_name.clone()),
        first_pending_vendor: records
            .iter()
            .find(|r| r.status == ProcurementStatus::Pending || r.delivery_missing_or_pending())
            .map(|r| r.vendor_name.clone()),
    }
}

fn group_by_vendor(records: &[ProcurementRecord]) -> Vec<VendorGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<VendorGroup> = Vec::new();
    for record in records {
        let slot = *index.entry(record.vendor_name.as_str()).or_insert_with(|| {
            groups.push(VendorGroup {
                vendor_name: record.vendor_name.clone(),
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record.clone());
    }
    groups
}

fn vendor_or_default(name: &str) -> &str {
    if name.is_empty() { "vendor" } else { name }
}

impl ProcurementStats {
    /// One-line hint for the risk card, naming the vendor to chase first.
    pub fn risk_tip(&self) -> String {
        if self.delayed_items > 0 {
            let vendor = self.first_delayed_vendor.as_deref().unwrap_or("");
            format!("Contact {} — delay risk flagged.", vendor_or_default(vendor))
        } else if self.pending_confirmations > 0 {
            let vendor = self.first_pending_vendor.as_deref().unwrap_or("");
            format!(
                "Contact {} — confirmation needed.",
                vendor_or_default(vendor)
            )
        } else {
            "All procurement items on track.".to_string()
        }
    }

    /// Dashboard headline summarising what needs attention.
    pub fn headline(&self) -> String {
        if self.delayed_items > 0 {
            format!(
                "{} item(s) delayed — escalate immediately to avoid project timeline impact.",
                self.delayed_items
            )
        } else if self.pending_confirmations > 0 {
            let vendor = self
                .vendor_groups
                .iter()
                .find(|g| g.has_outstanding())
                .map(|g| g.vendor_name.as_str())
                .unwrap_or("");
            format!(
                "{} item(s) pending confirmation — prioritize {} follow-up today.",
                self.pending_confirmations,
                vendor_or_default(vendor)
            )
        } else {
            "All procurement items confirmed — continue regular tracking.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProcurementStatus::*;

    fn rec(vendor: &str, status: ProcurementStatus, delivery: Option<&str>) -> ProcurementRecord {
        ProcurementRecord {
            project_name: "Project Cascade".into(),
            material_equipment: format!("{vendor}-{status}"),
            vendor_name: vendor.into(),
            quantity: 1.0,
            unit: "EA".into(),
            lead_time_days: 14,
            delivery_date: delivery.map(String::from),
            status,
            remarks: String::new(),
            ai_analysis: None,
        }
    }

    #[test]
    fn empty_is_low_risk_and_zero() {
        let s = aggregate(&[]);
        assert_eq!(s.total_items, 0);
        assert_eq!(s.pending_confirmations, 0);
        assert_eq!(s.confirmed_items, 0);
        assert_eq!(s.delayed_items, 0);
        assert_eq!(s.pending_percentage, 0.0);
        assert_eq!(s.risk_level, RiskLevel::Low);
        assert!(s.vendor_groups.is_empty());
    }

    #[test]
    fn thirty_percent_pending_is_moderate() {
        let mut records = vec![rec("A", Pending, Some("2025-01-01")); 3];
        records.extend(vec![rec("B", Confirmed, Some("2025-01-01")); 7]);
        let s = aggregate(&records);
        assert_eq!(s.pending_confirmations, 3);
        assert_eq!(s.confirmed_items, 7);
        assert!((s.pending_percentage - 30.0).abs() < 1e-9);
        assert_eq!(s.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn any_delay_is_high() {
        let mut records = vec![rec("B", Confirmed, Some("2025-01-01")); 19];
        records.push(rec("C", Delayed, Some("2025-01-01")));
        let s = aggregate(&records);
        assert_eq!(s.delayed_items, 1);
        assert_eq!(s.risk_level, RiskLevel::High);
    }

    #[test]
    fn boundaries() {
        assert_eq!(RiskLevel::classify(0, 50.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(0, 50.1), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0, 20.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(0, 19.9), RiskLevel::Low);
    }

    #[test]
    fn unknown_delivery_counts_as_pending_not_confirmed() {
        let records = vec![
            rec("A", Confirmed, Some("Pending")),
            rec("A", Confirmed, Some("")),
            rec("A", Confirmed, None),
            rec("A", Confirmed, Some("2025-06-01")),
        ];
        let s = aggregate(&records);
        assert_eq!(s.pending_confirmations, 3);
        assert_eq!(s.confirmed_items, 1);
        assert_eq!(s.risk_level, RiskLevel::High);
    }

    #[test]
    fn vendor_groups_first_seen_order() {
        let mut first = rec("Elite", Pending, None);
        first.ai_analysis = Some(AiAnalysis {
            impact: "Schedule".into(),
            recommendation: "Call".into(),
            confidence_score: 0.5,
        });
        let records = vec![
            first,
            rec("Kohler", Confirmed, Some("2025-01-01")),
            rec("Elite", Delayed, None),
        ];
        let s = aggregate(&records);
        let names: Vec<_> = s.vendor_groups.iter().map(|g| g.vendor_name.as_str()).collect();
        assert_eq!(names, vec!["Elite", "Kohler"]);
        assert_eq!(s.vendor_groups[0].records.len(), 2);
        assert_eq!(
            s.vendor_groups[0].representative_analysis().unwrap().impact,
            "Schedule"
        );
        assert!(s.vendor_groups[1].representative_analysis().is_none());
    }

    #[test]
    fn risk_tip_follows_log_order_not_vendor_order() {
        let s = aggregate(&[
            rec("Elite", Confirmed, Some("2025-01-01")),
            rec("Vitro", Delayed, Some("2025-01-01")),
            rec("Elite", Delayed, Some("2025-01-01")),
        ]);
        assert_eq!(s.risk_tip(), "Contact Vitro — delay risk flagged.");
    }

    #[test]
    fn tips_name_the_right_vendor() {
        let s = aggregate(&[
            rec("Kohler", Pending, None),
            rec("Vitro", Delayed, Some("2025-01-01")),
        ]);
        assert_eq!(s.risk_tip(), "Contact Vitro — delay risk flagged.");
        assert!(s.headline().starts_with("1 item(s) delayed"));

        let s = aggregate(&[
            rec("Kohler", Confirmed, Some("2025-01-01")),
            rec("", Pending, None),
        ]);
        assert_eq!(s.risk_tip(), "Contact vendor — confirmation needed.");
        assert_eq!(
            s.headline(),
            "1 item(s) pending confirmation — prioritize vendor follow-up today."
        );

        let s = aggregate(&[rec("Kohler", Confirmed, Some("2025-01-01"))]);
        assert_eq!(s.risk_tip(), "All procurement items on track.");
        assert_eq!(
            s.headline(),
            "All procurement items confirmed — continue regular tracking."
        );
    }

    #[test]
    fn pending_tip_skips_whitespace_only_dates() {
        let s = aggregate(&[
            rec("Vitro", Confirmed, Some("  ")),
            rec("Kohler", Pending, Some("2025-01-01")),
        ]);
        assert_eq!(s.pending_confirmations, 2);
        assert_eq!(s.first_pending_vendor.as_deref(), Some("Kohler"));
        assert_eq!(s.risk_tip(), "Contact Kohler — confirmation needed.");

        let s = aggregate(&[rec("Vitro", Confirmed, Some(" "))]);
        assert_eq!(s.pending_confirmations, 1);
        assert_eq!(s.risk_tip(), "Contact vendor — confirmation needed.");

        let s = aggregate(&[rec("Vitro", Confirmed, Some(""))]);
        assert_eq!(s.risk_tip(), "Contact Vitro — confirmation needed.");
    }
}
