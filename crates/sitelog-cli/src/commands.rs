//! Command handlers. Each one maps to a dashboard screen or modal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sitelog_core::{
    Capability, CoreError, EmailDraft, EmailSummary, InboxFilter, NonResponsiveThread, Session,
    ThreadStats, aggregate, escalation_draft, fallback_reply, filter_for_role, project_log,
};
use sitelog_sync::{ApiClient, Dashboard, LoadState, Source};
use tracing::warn;

use crate::config::Config;
use crate::display;
use crate::session_file;

/// Resolved settings shared by every command.
pub struct Env {
    pub config: Config,
    pub api_url: String,
    pub session_path: PathBuf,
}

impl Env {
    fn client(&self) -> ApiClient {
        ApiClient::new(self.api_url.clone())
    }

    fn session(&self) -> Result<Session> {
        session_file::require(&self.session_path)
    }
}

// ── Session ──

pub fn login(env: &Env, email: &str) -> Result<()> {
    let session = Session::sign_in(&env.config.users, email)?;
    session_file::save(&env.session_path, &session)?;
    println!("Signed in as {} ({})", session.user_email, session.role);
    Ok(())
}

pub fn logout(env: &Env) -> Result<()> {
    if session_file::clear(&env.session_path)? {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub fn whoami(env: &Env) -> Result<()> {
    match session_file::load(&env.session_path)? {
        Some(session) => {
            println!("{}", session.user_email);
            println!("  {:<22} {}", "Role", session.role);
            println!(
                "  {:<22} {}",
                "Signed in",
                session.signed_in_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

// ── Procurement ──

pub async fn projects(env: &Env) -> Result<()> {
    let projects = env.client().projects().await.context("fetching projects")?;
    display::print_projects(&projects);
    Ok(())
}

pub async fn procurement(env: &Env, project: Option<String>) -> Result<()> {
    env.session()?.ensure(Capability::ProcurementLog)?;
    let project = env.config.project_or_default(project)?;
    let records = env
        .client()
        .extract_procurement(std::slice::from_ref(&project))
        .await
        .with_context(|| format!("extracting procurement records for {project}"))?;
    let log = project_log(&records, &project);
    display::print_procurement(&project, &log, &aggregate(&log));
    Ok(())
}

// ── Non-responsive threads ──

async fn visible_threads(
    env: &Env,
    session: &Session,
    project: &str,
) -> Result<Vec<NonResponsiveThread>> {
    let threads = env
        .client()
        .non_responsive(project)
        .await
        .with_context(|| format!("fetching non-responsive threads for {project}"))?;
    Ok(filter_for_role(&threads, session.role, &session.user_email))
}

/// Take row `index` of a listed table.
fn pick<T>(mut rows: Vec<T>, index: usize) -> Result<T, CoreError> {
    if index >= rows.len() {
        return Err(CoreError::RowOutOfRange {
            index,
            len: rows.len(),
        });
    }
    Ok(rows.swap_remove(index))
}

/// KPI and chart data, for roles allowed to see it.
fn insights(session: &Session, threads: &[NonResponsiveThread]) -> Option<ThreadStats> {
    session
        .role
        .allows(Capability::ThreadInsights)
        .then(|| ThreadStats::from_threads(threads))
}

pub async fn threads(env: &Env, project: &str) -> Result<()> {
    let session = env.session()?;
    let threads = visible_threads(env, &session, project).await?;
    let insights = insights(&session, &threads);
    display::print_threads(project, &threads, insights.as_ref());
    Ok(())
}

pub async fn thread(env: &Env, project: &str, index: usize) -> Result<()> {
    let session = env.session()?;
    let thread = pick(visible_threads(env, &session, project).await?, index)?;
    display::print_thread_card(index, &thread);
    Ok(())
}

pub async fn reply(env: &Env, project: &str, index: usize, send: bool) -> Result<()> {
    let session = env.session()?;
    session.ensure(Capability::VendorReplies)?;
    let thread = pick(visible_threads(env, &session, project).await?, index)?;
    let client = env.client();

    let draft = match client.generate_vendor_reply(&thread).await {
        Ok(generated) => {
            let fallback = fallback_reply(&thread);
            EmailDraft {
                to: fallback.to,
                subject: if generated.subject.is_empty() {
                    fallback.subject
                } else {
                    generated.subject
                },
                body: if generated.body.is_empty() {
                    fallback.body
                } else {
                    generated.body
                },
            }
        }
        Err(e) => {
            warn!(error = %e, "reply generation failed, using fallback draft");
            fallback_reply(&thread)
        }
    };

    deliver(&client, &draft, send).await
}

pub async fn escalate(env: &Env, project: &str, index: usize, send: bool) -> Result<()> {
    let session = env.session()?;
    let thread = pick(visible_threads(env, &session, project).await?, index)?;
    let draft = escalation_draft(
        &thread,
        &session,
        &env.config.users,
        &env.config.escalation_signature,
    );
    deliver(&env.client(), &draft, send).await
}

/// Print the draft, and send it when asked.
async fn deliver(client: &ApiClient, draft: &EmailDraft, send: bool) -> Result<()> {
    display::print_draft(draft);
    if send {
        let to = client.send_email(draft).await.context("sending email")?;
        println!();
        println!("Email sent to {to}");
    }
    Ok(())
}

// ── Inbox ──

/// Summaries visible to the signed-in role, after the local filter.
async fn filtered_inbox(
    env: &Env,
    project: &str,
    filter: &InboxFilter,
) -> Result<Vec<EmailSummary>> {
    let session = env.session()?;
    let summaries = env
        .client()
        .summarize(project, Some(session.role))
        .await
        .with_context(|| format!("summarizing inbox for {project}"))?;
    Ok(filter.apply(&summaries))
}

pub async fn inbox(env: &Env, project: &str, filter: InboxFilter) -> Result<()> {
    let emails = filtered_inbox(env, project, &filter).await?;
    display::print_inbox(project, &emails);
    Ok(())
}

/// Suggested replies for row `index` of the (filtered) inbox.
pub async fn suggest(env: &Env, project: &str, index: usize, filter: InboxFilter) -> Result<()> {
    let email = pick(filtered_inbox(env, project, &filter).await?, index)?;
    let replies = env
        .client()
        .suggest_replies(&email)
        .await
        .context("requesting reply suggestions")?;
    println!("Re: {}", email.subject);
    println!();
    display::print_suggestions(&replies);
    Ok(())
}

pub async fn send(env: &Env, to: String, subject: String, body: String) -> Result<()> {
    let draft = EmailDraft { to, subject, body };
    let to = env
        .client()
        .send_email(&draft)
        .await
        .context("sending email")?;
    println!("Email sent to {to}");
    Ok(())
}

// ── Overview ──

pub async fn dashboard(env: &Env, retry: bool) -> Result<()> {
    let session = env.session()?;
    let mut dash = Dashboard::new(Arc::new(env.client()), session);

    for project in &env.config.projects {
        dash.select_project(project);
        dash.settle().await;

        if retry {
            for source in Source::ALL {
                if matches!(dash.state(source), LoadState::Failed(_)) {
                    dash.retry(source);
                }
            }
            dash.settle().await;
        }

        if dash.permits(Source::Procurement) {
            match dash.state(Source::Procurement) {
                LoadState::Failed(msg) => report_failure(project, Source::Procurement, msg),
                _ => display::print_procurement(
                    project,
                    &dash.procurement_log(),
                    &dash.procurement_stats(),
                ),
            }
        }
        match dash.state(Source::Threads) {
            LoadState::Failed(msg) => report_failure(project, Source::Threads, msg),
            _ => {
                let threads = dash.visible_threads();
                let insights = insights(dash.session(), &threads);
                display::print_threads(project, &threads, insights.as_ref());
            }
        }
    }
    Ok(())
}

fn report_failure(project: &str, source: Source, msg: &str) {
    println!("=== {project} — {source} ===");
    println!();
    println!("  Failed to load {source}: {msg}");
    println!("  Retry with `sitelog dashboard --retry`.");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitelog_core::Role;

    fn thread(subject: &str) -> NonResponsiveThread {
        NonResponsiveThread {
            thread_subject: subject.into(),
            ..Default::default()
        }
    }

    /// Env signed in as `email`, pointed at a port nothing listens on.
    fn signed_in_env(name: &str, email: &str) -> Env {
        let session_path = std::env::temp_dir()
            .join(format!("sitelog-cmd-{}-{name}", std::process::id()))
            .join("session.json");
        let config = Config::default();
        let session = Session::sign_in(&config.users, email).unwrap();
        session_file::save(&session_path, &session).unwrap();
        Env {
            config,
            api_url: "http://127.0.0.1:9".into(),
            session_path,
        }
    }

    fn cleanup(env: &Env) {
        let _ = session_file::clear(&env.session_path);
        let _ = std::fs::remove_dir(env.session_path.parent().unwrap());
    }

    fn not_permitted(err: &anyhow::Error) -> Option<Capability> {
        match err.downcast_ref::<CoreError>() {
            Some(CoreError::NotPermitted { capability, .. }) => Some(*capability),
            _ => None,
        }
    }

    #[test]
    fn pick_returns_requested_row() {
        let threads = vec![thread("a"), thread("b"), thread("c")];
        assert_eq!(pick(threads, 1).unwrap().thread_subject, "b");
    }

    #[test]
    fn pick_out_of_range() {
        let err = pick(vec![thread("a")], 3).unwrap_err();
        assert!(matches!(err, CoreError::RowOutOfRange { index: 3, len: 1 }));
    }

    #[test]
    fn insights_only_for_project_managers() {
        let config = Config::default();
        let threads = vec![thread("a")];
        let pm = Session::sign_in(&config.users, "chandru-pm@carma.com").unwrap();
        let supervisor = Session::sign_in(&config.users, "site-supervisor@carma.com").unwrap();

        assert_eq!(insights(&pm, &threads).unwrap().total_threads, 1);
        assert!(insights(&supervisor, &threads).is_none());
    }

    #[tokio::test]
    async fn supervisor_cannot_open_procurement() {
        let env = signed_in_env("procurement", "site-supervisor@carma.com");
        let err = procurement(&env, Some("Skyline Tower".into()))
            .await
            .unwrap_err();
        assert_eq!(not_permitted(&err), Some(Capability::ProcurementLog));
        cleanup(&env);
    }

    #[tokio::test]
    async fn supervisor_cannot_draft_vendor_replies() {
        let env = signed_in_env("reply", "site-supervisor@carma.com");
        let err = reply(&env, "Skyline Tower", 0, false).await.unwrap_err();
        assert_eq!(not_permitted(&err), Some(Capability::VendorReplies));
        cleanup(&env);
    }

    #[tokio::test]
    async fn project_manager_passes_the_role_gate() {
        // Gets as far as the network, which is unreachable here.
        let env = signed_in_env("pm", "chandru-pm@carma.com");
        let err = procurement(&env, Some("Skyline Tower".into()))
            .await
            .unwrap_err();
        assert_eq!(not_permitted(&err), None);
        cleanup(&env);
    }

    #[tokio::test]
    async fn procurement_requires_sign_in() {
        let env = signed_in_env("signed-out", "chandru-pm@carma.com");
        session_file::clear(&env.session_path).unwrap();
        let err = procurement(&env, None).await.unwrap_err();
        assert!(err.to_string().contains("not signed in"));
        cleanup(&env);
    }
}
