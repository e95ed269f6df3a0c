//! Non-responsive vendor email threads and their dashboard analytics.
//!
//! Threads are read-only snapshots fetched per project. Every field on the
//! wire is optional and may arrive null or mistyped; the lenient decoders fill
//! the gaps so analytics never have to special-case a missing block.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::lenient;

/// Risk classification assigned to a thread by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThreadRisk {
    High,
    Medium,
    Low,
    /// Anything the backend sent that is not HIGH/MEDIUM/LOW.
    #[default]
    Unknown,
}

impl ThreadRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Self::High,
            "MEDIUM" => Self::Medium,
            "LOW" => Self::Low,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ThreadRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ThreadRisk {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ThreadRisk {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        Ok(lenient::string(de)?
            .as_deref()
            .map(ThreadRisk::parse)
            .unwrap_or_default())
    }
}

/// Role of one message within a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    #[default]
    Initial,
    FollowUp,
    Escalation,
    Other,
}

impl MessageKind {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "initial" => Self::Initial,
            "follow-up" | "follow_up" | "followup" => Self::FollowUp,
            "escalation" => Self::Escalation,
            _ => Self::Other,
        }
    }
}

impl<'de> Deserialize<'de> for MessageKind {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        Ok(lenient::string(de)?
            .as_deref()
            .map(MessageKind::parse)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadCounts {
    #[serde(deserialize_with = "lenient::count")]
    pub total_emails: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub follow_up_count: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub unanswered_emails: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadTimeline {
    #[serde(deserialize_with = "lenient::string")]
    pub first_email_date: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub last_email_date: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub days_between_first_and_last: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Participants {
    #[serde(deserialize_with = "lenient::string_list")]
    pub senders: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub receivers: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub to_domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub from: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub to: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub subject: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub date: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub body: String,
}

/// An email thread judged non-responsive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NonResponsiveThread {
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub project_guess: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub thread_subject: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub impact_area: String,
    pub risk_level: ThreadRisk,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub issue_detected: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub recommended_action: String,
    #[serde(deserialize_with = "lenient::string")]
    pub reason: Option<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub counts: ThreadCounts,
    #[serde(deserialize_with = "lenient::object")]
    pub timeline: ThreadTimeline,
    #[serde(deserialize_with = "lenient::object")]
    pub participants: Participants,
    /// Chronological; rendered as-is.
    #[serde(deserialize_with = "lenient::list")]
    pub conversation_history: Vec<ThreadMessage>,
    #[serde(deserialize_with = "lenient::flag")]
    pub response_detected: bool,
}

/// Decode a `/api/non-responsive` body, skipping elements that are not objects.
pub fn ingest_threads(body: Value) -> Vec<NonResponsiveThread> {
    lenient::elements(body, "non-responsive thread")
}

impl NonResponsiveThread {
    /// Best-known vendor address: first message recipient, then first receiver.
    pub fn vendor_address(&self) -> Option<&str> {
        self.conversation_history
            .first()
            .map(|m| m.to.as_str())
            .filter(|to| !to.is_empty())
            .or_else(|| {
                self.participants
                    .receivers
                    .first()
                    .map(String::as_str)
                    .filter(|r| !r.is_empty())
            })
    }
}

/// Headline KPIs for the non-responsive module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadStats {
    pub total_threads: usize,
    pub high_risk: usize,
    /// Mean follow-ups per thread, one decimal place.
    pub avg_follow_ups: f64,
    /// Percent of threads where a response was detected, whole number.
    pub responsiveness: u32,
}

impl ThreadStats {
    pub fn from_threads(threads: &[NonResponsiveThread]) -> Self {
        let total = threads.len();
        if total == 0 {
            return Self {
                total_threads: 0,
                high_risk: 0,
                avg_follow_ups: 0.0,
                responsiveness: 0,
            };
        }

        let high_risk = threads
            .iter()
            .filter(|t| t.risk_level == ThreadRisk::High)
            .count();
        let follow_ups: u64 = threads.iter().map(|t| t.counts.follow_up_count as u64).sum();
        let responded = threads.iter().filter(|t| t.response_detected).count();

        let avg = follow_ups as f64 / total as f64;
        Self {
            total_threads: total,
            high_risk,
            avg_follow_ups: (avg * 10.0).round() / 10.0,
            responsiveness: (responded as f64 / total as f64 * 100.0).round() as u32,
        }
    }
}

/// Thread counts per risk bucket, in High, Medium, Low order.
pub fn risk_distribution(threads: &[NonResponsiveThread]) -> [(ThreadRisk, usize); 3] {
    let count = |risk| threads.iter().filter(|t| t.risk_level == risk).count();
    [
        (ThreadRisk::High, count(ThreadRisk::High)),
        (ThreadRisk::Medium, count(ThreadRisk::Medium)),
        (ThreadRisk::Low, count(ThreadRisk::Low)),
    ]
}

/// Total follow-ups per guessed project, first-seen order.
pub fn follow_ups_by_project(threads: &[NonResponsiveThread]) -> Vec<(String, u32)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, u32)> = Vec::new();
    for thread in threads {
        let project = if thread.project_guess.is_empty() {
            "Unknown"
        } else {
            thread.project_guess.as_str()
        };
        let slot = *index.entry(project).or_insert_with(|| {
            totals.push((project.to_string(), 0));
            totals.len() - 1
        });
        totals[slot].1 += thread.counts.follow_up_count;
    }
    totals
}
