//! Core types and the procurement reconciliation pipeline.
//!
//! Data flows one way: raw fetch → [`record::ingest`] → [`merge::merge_project`]
//! → [`session::filter_for_role`] / [`sort::project_log`] → [`stats::aggregate`].
//! Every stage is a pure function of its inputs.

pub mod compose;
mod error;
pub mod inbox;
pub mod key;
mod lenient;
pub mod merge;
pub mod record;
pub mod session;
pub mod sort;
pub mod stats;
pub mod status;
pub mod thread;

pub use compose::{EmailDraft, escalation_draft, fallback_reply};
pub use error::CoreError;
pub use inbox::{EmailSummary, InboxFilter, ingest_summaries};
pub use key::{RecordKey, derive_key};
pub use merge::{dedup_last_wins, merge_project};
pub use record::{AiAnalysis, ProcurementRecord, RawProcurementRecord};
pub use session::{Capability, Role, Session, UserDirectory, UserEntry, filter_for_role};
pub use sort::{project_log, sort_by_risk};
pub use stats::{ProcurementStats, RiskLevel, VendorGroup, aggregate};
pub use status::{ProcurementStatus, normalize_status};
pub use thread::{NonResponsiveThread, ThreadRisk, ThreadStats, ingest_threads};
