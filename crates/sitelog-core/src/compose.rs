//! Email drafts built from non-responsive threads.
//!
//! Drafts are plain text the user reviews before anything is sent. Who an
//! escalation goes to depends on the sender's role: supervisors escalate up
//! to the project manager, project managers escalate out to the vendor.

use serde::{Deserialize, Serialize};

use crate::session::{Role, Session, UserDirectory};
use crate::thread::NonResponsiveThread;

/// Used when the user directory has no project manager.
pub const FALLBACK_PM_EMAIL: &str = "chandru-pm@carma.com";

/// Signature on project-manager escalations unless configured otherwise.
pub const DEFAULT_SIGNATURE: &str = "Chandru\nProject Manager\nCARMA Construction";

const DEFAULT_REASON: &str = "Multiple follow-ups have been sent without any response, \
     which may affect our project schedule.";
const DEFAULT_PM_ACTION: &str =
    "Please review and advise on escalation or alternative vendor action.";

/// Body of `POST /api/sendEmail`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

fn or_na(v: Option<&str>) -> &str {
    match v {
        Some(s) if !s.is_empty() => s,
        _ => "N/A",
    }
}

fn or_default<'a>(v: &'a str, default: &'a str) -> &'a str {
    if v.is_empty() { default } else { v }
}

fn user_part(email: &str) -> &str {
    email.split('@').next().unwrap_or("")
}

fn timeline_lines(thread: &NonResponsiveThread, bullet: &str) -> String {
    let t = &thread.timeline;
    format!(
        "{b}First Contact: {}\n{b}Last Follow-Up: {}\n\
         {b}Days Elapsed: {}\n{b}Follow-Up Attempts: {}",
        or_na(t.first_email_date.as_deref()),
        or_na(t.last_email_date.as_deref()),
        t.days_between_first_and_last,
        thread.counts.follow_up_count,
        b = bullet,
    )
}

/// Draft an escalation email for `thread` on behalf of `session`.
pub fn escalation_draft(
    thread: &NonResponsiveThread,
    session: &Session,
    directory: &UserDirectory,
    signature: &str,
) -> EmailDraft {
    let reason = thread.reason.as_deref().unwrap_or(DEFAULT_REASON);
    match session.role {
        Role::Supervisor => {
            let pm_email = directory
                .project_manager()
                .map(|u| u.email.as_str())
                .unwrap_or(FALLBACK_PM_EMAIL);
            let greeting = or_default(user_part(pm_email), "Project Manager");
            let sender = or_default(session.local_part(), "Supervisor");
            let action = or_default(&thread.recommended_action, DEFAULT_PM_ACTION);
            let body = format!(
                "Hi {greeting},\n\n\
                 I am escalating an issue regarding the project \"{project}\".\n\n\
                 Despite multiple follow-ups, we have not received any response from the vendor \
                 regarding the following:\n\n\
                 Subject: {subject}\n\
                 Impact Area: {impact}\n\
                 Risk Level: {risk}\n\n\
                 Issue Summary:\n{reason}\n\n\
                 Timeline:\n{timeline}\n\n\
                 {action}\n\n\
                 Best regards,\n{sender}\nCARMA Construction",
                project = thread.project_guess,
                subject = thread.thread_subject,
                impact = thread.impact_area,
                risk = thread.risk_level,
                timeline = timeline_lines(thread, "- "),
            );
            EmailDraft {
                to: pm_email.to_string(),
                subject: format!(
                    "Escalation – Vendor Non-Response on {}",
                    thread.project_guess
                ),
                body,
            }
        }
        Role::ProjectManager => {
            let to = thread.vendor_address().map(String::from).unwrap_or_else(|| {
                let domain = thread
                    .participants
                    .to_domain
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .unwrap_or("example.com");
                format!("vendor@{domain}")
            });
            let greeting = thread
                .participants
                .receivers
                .first()
                .map(|r| user_part(r))
                .filter(|r| !r.is_empty())
                .unwrap_or("Team");
            let body = format!(
                "Dear {greeting},\n\n\
                 I am reaching out to escalate an urgent matter related to the project \
                 \"{project}\".\n\n\
                 We have been trying to obtain a response regarding the following communication \
                 without success:\n\n\
                 Subject: {subject}\n\
                 Impact Area: {impact}\n\
                 Risk Level: {risk}\n\n\
                 Summary:\n{reason}\n\n\
                 Timeline:\n{timeline}\n\n\
                 We kindly request your immediate attention to this matter. Please provide an \
                 update or confirmation by the end of the day to avoid further impact on the \
                 project timeline.\n\n\
                 Thank you.\n\n\
                 Best regards,\n{signature}",
                project = thread.project_guess,
                subject = thread.thread_subject,
                impact = thread.impact_area,
                risk = thread.risk_level,
                timeline = timeline_lines(thread, ""),
            );
            EmailDraft {
                to,
                subject: format!("URGENT: Escalation - {}", thread.thread_subject),
                body,
            }
        }
    }
}

/// Canned follow-up used when AI reply generation is unavailable.
pub fn fallback_reply(thread: &NonResponsiveThread) -> EmailDraft {
    EmailDraft {
        to: thread
            .vendor_address()
            .unwrap_or("vendor@example.com")
            .to_string(),
        subject: format!("Re: {}", thread.thread_subject),
        body: format!(
            "Dear Team,\n\nFollowing up on our previous communications regarding {}. \
             We would appreciate your response at your earliest convenience to avoid any \
             delays.\n\n\
             Thank you,\nProject Manager\nCARMA Construction",
            thread.thread_subject
        ),
    }
}
