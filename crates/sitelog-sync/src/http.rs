//! HTTP client for the sitelog backend's JSON endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitelog_core::record::ingest;
use sitelog_core::{
    EmailDraft, EmailSummary, NonResponsiveThread, ProcurementRecord, Role, ingest_summaries,
    ingest_threads,
};
use thiserror::Error;
use tracing::info;

use crate::dashboard::DashboardApi;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {detail}")]
    Server { status: u16, detail: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Subject and body proposed by the vendor-reply generator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedReply {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    projects: &'a [String],
}

#[derive(Serialize)]
struct GenerateReplyRequest<'a> {
    subcontractor_data: &'a NonResponsiveThread,
}

#[derive(Serialize)]
struct SuggestRequest<'a> {
    email: &'a EmailSummary,
}

#[derive(Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    replies: Vec<String>,
}

#[derive(Deserialize)]
struct SendResponse {
    to: String,
}

/// Client for the dashboard backend.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL.
    ///
    /// `base_url` should be like `http://localhost:5000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`ApiError::Server`].
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            detail: error_detail(status.as_u16(), &body),
        })
    }

    /// `GET /api/projects`
    pub async fn projects(&self) -> Result<Vec<String>, ApiError> {
        let url = self.url("/api/projects");
        info!(url = %url, "fetching project list");
        let resp = Self::check(self.client.get(&url).send().await?).await?;
        let projects: Vec<String> = resp.json().await?;
        info!(count = projects.len(), "fetched projects");
        Ok(projects)
    }

    /// `GET /api/non-responsive-subcontractors?project=<name>`
    pub async fn non_responsive(
        &self,
        project: &str,
    ) -> Result<Vec<NonResponsiveThread>, ApiError> {
        let url = self.url("/api/non-responsive-subcontractors");
        info!(url = %url, project = %project, "fetching non-responsive threads");
        let resp = self
            .client
            .get(&url)
            .query(&[("project", project)])
            .send()
            .await?;
        let body: Value = Self::check(resp).await?.json().await?;
        let threads = ingest_threads(body);
        info!(project = %project, count = threads.len(), "fetched threads");
        Ok(threads)
    }

    /// `POST /api/procurement/emails/extract`, normalised at the boundary.
    pub async fn extract_procurement(
        &self,
        projects: &[String],
    ) -> Result<Vec<ProcurementRecord>, ApiError> {
        let url = self.url("/api/procurement/emails/extract");
        info!(url = %url, projects = ?projects, "extracting procurement records");
        let resp = self
            .client
            .post(&url)
            .json(&ExtractRequest { projects })
            .send()
            .await?;
        let body: Value = Self::check(resp).await?.json().await?;
        let records = ingest(body);
        info!(count = records.len(), "extracted procurement records");
        Ok(records)
    }

    /// `POST /api/vendors/generate-reply`
    pub async fn generate_vendor_reply(
        &self,
        thread: &NonResponsiveThread,
    ) -> Result<GeneratedReply, ApiError> {
        let url = self.url("/api/vendors/generate-reply");
        info!(url = %url, subject = %thread.thread_subject, "generating vendor reply");
        let resp = self
            .client
            .post(&url)
            .json(&GenerateReplyRequest {
                subcontractor_data: thread,
            })
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// `POST /api/ai/reply` with the summarised email to answer.
    pub async fn suggest_replies(&self, email: &EmailSummary) -> Result<Vec<String>, ApiError> {
        let url = self.url("/api/ai/reply");
        info!(url = %url, "requesting reply suggestions");
        let resp = self
            .client
            .post(&url)
            .json(&SuggestRequest { email })
            .send()
            .await?;
        let result: SuggestResponse = Self::check(resp).await?.json().await?;
        info!(count = result.replies.len(), "received reply suggestions");
        Ok(result.replies)
    }

    /// `POST /api/sendEmail`. Returns the recipient echoed by the server.
    pub async fn send_email(&self, draft: &EmailDraft) -> Result<String, ApiError> {
        let url = self.url("/api/sendEmail");
        info!(url = %url, to = %draft.to, "sending email");
        let resp = self.client.post(&url).json(draft).send().await?;
        let result: SendResponse = Self::check(resp).await?.json().await?;
        info!(to = %result.to, "email accepted");
        Ok(result.to)
    }

    /// `GET /api/summarize?project=<name>&category=All&role=<role>`
    pub async fn summarize(
        &self,
        project: &str,
        role: Option<Role>,
    ) -> Result<Vec<EmailSummary>, ApiError> {
        let url = self.url("/api/summarize");
        let mut query = vec![("project", project), ("category", "All")];
        if let Some(role) = role {
            query.push(("role", role.key()));
        }
        info!(url = %url, project = %project, "summarizing inbox");
        let resp = self.client.get(&url).query(&query).send().await?;
        let body: Value = Self::check(resp).await?.json().await?;
        let summaries = summaries_from(body);
        info!(count = summaries.len(), "received summaries");
        Ok(summaries)
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn fetch_procurement(
        &self,
        project: &str,
    ) -> Result<Vec<ProcurementRecord>, ApiError> {
        self.extract_procurement(&[project.to_string()]).await
    }

    async fn fetch_threads(&self, project: &str) -> Result<Vec<NonResponsiveThread>, ApiError> {
        self.non_responsive(project).await
    }
}

/// The `summaries` array of a summarize response; empty when absent.
fn summaries_from(mut body: Value) -> Vec<EmailSummary> {
    match body.get_mut("summaries").map(Value::take) {
        Some(list) => ingest_summaries(list),
        None => Vec::new(),
    }
}

/// Pull `detail` out of a JSON error body, else `HTTP <status>`.
fn error_detail(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/".into());
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/api/projects"), "http://localhost:5000/api/projects");
    }

    #[test]
    fn error_detail_from_json_body() {
        assert_eq!(
            error_detail(401, r#"{"detail": "OpenAI API Key Permissions Error"}"#),
            "OpenAI API Key Permissions Error"
        );
    }

    #[test]
    fn error_detail_falls_back_to_status() {
        assert_eq!(error_detail(502, "<html>Bad Gateway</html>"), "HTTP 502");
        assert_eq!(error_detail(500, r#"{"detail": null}"#), "HTTP 500");
    }

    #[test]
    fn extract_request_shape() {
        let projects = vec!["Penthouse A".to_string()];
        let json = serde_json::to_value(ExtractRequest { projects: &projects }).unwrap();
        assert_eq!(json, serde_json::json!({ "projects": ["Penthouse A"] }));
    }

    #[test]
    fn generate_reply_request_wraps_thread() {
        let thread = NonResponsiveThread {
            thread_subject: "Shop drawings".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(GenerateReplyRequest {
            subcontractor_data: &thread,
        })
        .unwrap();
        assert_eq!(json["subcontractor_data"]["thread_subject"], "Shop drawings");
        assert_eq!(json["subcontractor_data"]["risk_level"], "UNKNOWN");
    }

    #[test]
    fn summaries_tolerate_missing_list_and_nulls() {
        assert!(summaries_from(serde_json::json!({})).is_empty());
        assert!(summaries_from(serde_json::json!(["not an object"])).is_empty());

        let summaries = summaries_from(serde_json::json!({
            "summaries": [
                { "from": null, "subject": "RFI 12", "category": "RFI" },
                null,
                { "from": "ops@kohler.com", "priority": 2 }
            ]
        }));
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].from, "");
        assert_eq!(summaries[1].priority.as_deref(), Some("2"));
    }

    #[test]
    fn suggest_request_sends_the_email_object() {
        let email = EmailSummary {
            from: "ops@kohler.com".into(),
            subject: "Fixture lead time".into(),
            category: "Material Delivery".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(SuggestRequest { email: &email }).unwrap();
        assert_eq!(json["email"]["from"], "ops@kohler.com");
        assert_eq!(json["email"]["subject"], "Fixture lead time");
        assert_eq!(json["email"]["category"], "Material Delivery");
    }

    #[test]
    fn generated_reply_parses() {
        let parsed: GeneratedReply =
            serde_json::from_str(r#"{"subject":"Re: Glazing","body":"Hi team"}"#).unwrap();
        assert_eq!(parsed.subject, "Re: Glazing");
    }

    #[test]
    fn send_email_body_shape() {
        let draft = EmailDraft {
            to: "pm@vitro.com".into(),
            subject: "Hello".into(),
            body: "Body".into(),
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "to": "pm@vitro.com", "subject": "Hello", "body": "Body" })
        );
    }
}
