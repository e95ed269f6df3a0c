//! Procurement status normalisation.
//!
//! Vendor status arrives as free text ("Delivered on 5/1", "slightly
//! overdue", "awaiting PO"). It is mapped onto a closed set once, at
//! ingestion, and everything downstream works with [`ProcurementStatus`].

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProcurementStatus {
    Confirmed,
    #[default]
    Pending,
    Delayed,
}

impl ProcurementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Pending => "Pending",
            Self::Delayed => "Delayed",
        }
    }

    /// Risk rank: lower sorts first. Delayed=1, Pending=2, Confirmed=3.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Delayed => 1,
            Self::Pending => 2,
            Self::Confirmed => 3,
        }
    }
}

impl fmt::Display for ProcurementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CONFIRMED_MARKERS: &[&str] = &["confirmed", "delivered", "complete"];
const DELAYED_MARKERS: &[&str] = &["delayed", "overdue"];

/// Map arbitrary status text onto [`ProcurementStatus`].
///
/// Case-insensitive substring match, first rule wins:
///
/// 1. "confirmed" / "delivered" / "complete" → Confirmed
/// 2. "delayed" / "overdue" → Delayed
/// 3. "pending" / "awaiting" → Pending
/// 4. anything else, including `None` and "" → Pending
pub fn normalize_status(raw: Option<&str>) -> ProcurementStatus {
    let Some(raw) = raw else {
        return ProcurementStatus::Pending;
    };
    let lower = raw.to_lowercase();
    let has_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if has_any(CONFIRMED_MARKERS) {
        ProcurementStatus::Confirmed
    } else if has_any(DELAYED_MARKERS) {
        ProcurementStatus::Delayed
    } else {
        // "pending" / "awaiting" land here along with everything unrecognised.
        ProcurementStatus::Pending
    }
}
