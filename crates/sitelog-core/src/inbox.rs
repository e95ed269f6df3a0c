//! AI inbox summaries and their local category/search filtering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// One summarised email as returned by `GET /api/summarize`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSummary {
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub from: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub subject: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub category: String,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::string")]
    pub action_required: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub due_date: Option<String>,
    #[serde(deserialize_with = "lenient::string_or_empty")]
    pub body: String,
}

/// Decode the `summaries` array of a summarize response, skipping non-objects.
pub fn ingest_summaries(summaries: Value) -> Vec<EmailSummary> {
    lenient::elements(summaries, "email summary")
}

/// Client-side filter over a fetched summary list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboxFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl InboxFilter {
    fn category_matches(&self, email: &EmailSummary) -> bool {
        match self.category.as_deref() {
            None => true,
            Some(c) if c.eq_ignore_ascii_case(ALL_CATEGORIES) => true,
            Some(c) => email.category.to_lowercase() == c.to_lowercase(),
        }
    }

    fn search_matches(&self, email: &EmailSummary) -> bool {
        let Some(query) = self.search.as_deref().filter(|q| !q.is_empty()) else {
            return true;
        };
        let query = query.to_lowercase();
        [
            email.from.as_str(),
            email.subject.as_str(),
            email.category.as_str(),
            email.summary.as_str(),
            email.action_required.as_deref().unwrap_or(""),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
    }

    /// Summaries passing both the category and the search filter, in order.
    pub fn apply(&self, emails: &[EmailSummary]) -> Vec<EmailSummary> {
        emails
            .iter()
            .filter(|e| self.category_matches(e) && self.search_matches(e))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(from: &str, subject: &str, category: &str, action: Option<&str>) -> EmailSummary {
        EmailSummary {
            from: from.into(),
            subject: subject.into(),
            category: category.into(),
            summary: format!("summary of {subject}"),
            action_required: action.map(String::from),
            ..Default::default()
        }
    }

    fn inbox() -> Vec<EmailSummary> {
        vec![
            email("rfi@arch.com", "RFI 12 door hardware", "RFI", None),
            email("ops@kohler.com", "Fixture lead time", "Material Delivery", Some("Confirm PO")),
            email("pm@gc.com", "Lookahead", "Schedule", None),
        ]
    }

    #[test]
    fn no_filter_returns_all() {
        assert_eq!(InboxFilter::default().apply(&inbox()).len(), 3);
        let all = InboxFilter {
            category: Some("all".into()),
            search: Some(String::new()),
        };
        assert_eq!(all.apply(&inbox()).len(), 3);
    }

    #[test]
    fn category_is_case_insensitive_equality() {
        let f = InboxFilter {
            category: Some("material delivery".into()),
            search: None,
        };
        let out = f.apply(&inbox());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].from, "ops@kohler.com");

        let partial = InboxFilter {
            category: Some("material".into()),
            search: None,
        };
        assert!(partial.apply(&inbox()).is_empty());
    }

    #[test]
    fn search_covers_action_required() {
        let f = InboxFilter {
            category: None,
            search: Some("confirm po".into()),
        };
        let out = f.apply(&inbox());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].subject, "Fixture lead time");
    }

    #[test]
    fn category_and_search_combine() {
        let f = InboxFilter {
            category: Some("RFI".into()),
            search: Some("lookahead".into()),
        };
        assert!(f.apply(&inbox()).is_empty());
    }

    #[test]
    fn parses_sparse_summary() {
        let e: EmailSummary =
            serde_json::from_str(r#"{"from":"a@b.com","priority":"High"}"#).unwrap();
        assert_eq!(e.from, "a@b.com");
        assert_eq!(e.priority.as_deref(), Some("High"));
        assert!(e.subject.is_empty());
    }

    #[test]
    fn null_fields_do_not_drop_the_inbox() {
        let emails = ingest_summaries(serde_json::json!([
            { "from": null, "subject": "Lookahead", "priority": null, "due_date": 20250301 },
            42,
            { "from": "ops@kohler.com", "category": null, "action_required": "Confirm PO" }
        ]));
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].from, "");
        assert_eq!(emails[0].priority, None);
        assert_eq!(emails[0].due_date.as_deref(), Some("20250301"));
        assert_eq!(emails[1].category, "");

        let f = InboxFilter {
            category: None,
            search: Some("kohler".into()),
        };
        assert_eq!(f.apply(&emails).len(), 1);
    }
}
