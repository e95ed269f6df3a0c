//! Procurement records and the ingestion boundary.
//!
//! [`RawProcurementRecord`] mirrors what the extraction endpoint actually
//! returns: AI-produced JSON where any field may be missing, null, or of the
//! wrong type. [`RawProcurementRecord::normalize`] is the one place defaults
//! are applied; the rest of the pipeline only sees [`ProcurementRecord`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::key::{RecordKey, derive_key};
use crate::lenient;
use crate::status::{ProcurementStatus, normalize_status};

/// Sentinel delivery date meaning "not yet known".
pub const PENDING_DELIVERY: &str = "Pending";

/// AI commentary attached to a procurement line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub impact: String,
    pub recommendation: String,
    #[serde(default)]
    pub confidence_score: f32,
}

/// A fully-populated procurement line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcurementRecord {
    pub project_name: String,
    pub material_equipment: String,
    pub vendor_name: String,
    pub quantity: f64,
    pub unit: String,
    pub lead_time_days: u32,
    /// `None`, blank, or [`PENDING_DELIVERY`] when unknown; otherwise an ISO-ish date.
    pub delivery_date: Option<String>,
    pub status: ProcurementStatus,
    pub remarks: String,
    pub ai_analysis: Option<AiAnalysis>,
}

impl ProcurementRecord {
    pub fn key(&self) -> RecordKey {
        derive_key(&self.project_name, &self.material_equipment, &self.vendor_name)
    }

    /// Delivery date is literally the `"Pending"` sentinel.
    pub fn delivery_marked_pending(&self) -> bool {
        self.delivery_date.as_deref() == Some(PENDING_DELIVERY)
    }

    /// Delivery date is absent, blank, or the `"Pending"` sentinel.
    pub fn delivery_unknown(&self) -> bool {
        match self.delivery_date.as_deref() {
            None => true,
            Some(d) => d == PENDING_DELIVERY || d.trim().is_empty(),
        }
    }

    /// Pending by status or by unknown delivery date.
    pub fn awaiting_confirmation(&self) -> bool {
        self.status == ProcurementStatus::Pending || self.delivery_unknown()
    }

    /// Delivery date is absent, exactly `""`, or the `"Pending"` sentinel.
    ///
    /// Unlike [`delivery_unknown`](Self::delivery_unknown) this does not trim:
    /// a whitespace-only date counts as set.
    pub fn delivery_missing_or_pending(&self) -> bool {
        matches!(self.delivery_date.as_deref(), None | Some("") | Some(PENDING_DELIVERY))
    }
}

/// AI analysis as it arrives on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAiAnalysis {
    #[serde(default, deserialize_with = "lenient::string")]
    pub impact: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub recommendation: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub confidence_score: Option<f64>,
}

/// A procurement record exactly as the extraction endpoint returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProcurementRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub material_equipment: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub vendor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub lead_time_days: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub delivery_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub remarks: Option<String>,
    #[serde(default, deserialize_with = "lenient::maybe_object")]
    pub ai_analysis: Option<RawAiAnalysis>,
}

impl RawProcurementRecord {
    /// Apply defaults and normalise status.
    pub fn normalize(self) -> ProcurementRecord {
        ProcurementRecord {
            project_name: self.project_name.unwrap_or_default(),
            material_equipment: self.material_equipment.unwrap_or_default(),
            vendor_name: self.vendor_name.unwrap_or_default(),
            quantity: self.quantity.unwrap_or(0.0),
            unit: self.unit.unwrap_or_default(),
            lead_time_days: self.lead_time_days.map(lenient::to_count).unwrap_or(0),
            status: normalize_status(self.status.as_deref()),
            delivery_date: self.delivery_date,
            remarks: self.remarks.unwrap_or_default(),
            ai_analysis: self.ai_analysis.map(|a| AiAnalysis {
                impact: a.impact.unwrap_or_default(),
                recommendation: a.recommendation.unwrap_or_default(),
                confidence_score: a.confidence_score.unwrap_or(0.0) as f32,
            }),
        }
    }
}

/// Normalise an extraction response body.
///
/// A non-array body yields no records; array elements that are not objects
/// are skipped.
pub fn ingest(body: Value) -> Vec<ProcurementRecord> {
    lenient::elements::<RawProcurementRecord>(body, "procurement record")
        .into_iter()
        .map(RawProcurementRecord::normalize)
        .collect()
}
