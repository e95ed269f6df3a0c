//! Signed-in user context and role-scoped thread visibility.
//!
//! A [`Session`] is created at sign-in, passed explicitly to whatever needs
//! the user's identity, and discarded at sign-out. Sign-in only matches an
//! email against a static [`UserDirectory`]; it is not an authentication
//! mechanism.
//!
//! Project managers get the full dashboard. Supervisors see only their own
//! threads and escalations; [`Role::allows`] is the single gate for the
//! screens they cannot reach.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::thread::NonResponsiveThread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ProjectManager,
    Supervisor,
}

impl Role {
    /// Normalised storage key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ProjectManager => "project_manager",
            Self::Supervisor => "supervisor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ProjectManager => "Project Manager",
            Self::Supervisor => "Supervisor",
        }
    }
}

/// A dashboard screen or action restricted by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Procurement log, its KPIs and vendor panels.
    ProcurementLog,
    /// Thread KPIs, risk distribution and follow-ups per project.
    ThreadInsights,
    /// AI-drafted replies to non-responsive vendors.
    VendorReplies,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ProcurementLog => "view the procurement log",
            Self::ThreadInsights => "view thread insights",
            Self::VendorReplies => "draft vendor replies",
        })
    }
}

impl Role {
    pub fn allows(&self, capability: Capability) -> bool {
        match (self, capability) {
            (Self::ProjectManager, _) => true,
            (
                Self::Supervisor,
                Capability::ProcurementLog
                | Capability::ThreadInsights
                | Capability::VendorReplies,
            ) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    /// Accepts keys (`project_manager`) and labels (`Project Manager`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_lowercase() })
            .collect();
        match key.as_str() {
            "project_manager" => Ok(Self::ProjectManager),
            "supervisor" => Ok(Self::Supervisor),
            _ => Err(CoreError::UnknownRole(s.to_string())),
        }
    }
}

/// One entry of the static user list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserDirectory {
    pub users: Vec<UserEntry>,
}

impl UserDirectory {
    pub fn new(users: Vec<UserEntry>) -> Self {
        Self { users }
    }

    pub fn find(&self, email: &str) -> Option<&UserEntry> {
        let email = email.trim();
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// First project manager, the escalation target for supervisors.
    pub fn project_manager(&self) -> Option<&UserEntry> {
        self.users.iter().find(|u| u.role == Role::ProjectManager)
    }
}

/// The signed-in user's context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    pub user_email: String,
    /// Placeholder for a backend token; never issued by the current backend.
    #[serde(default)]
    pub auth_token: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    /// Sign in by matching `email` against the directory.
    pub fn sign_in(directory: &UserDirectory, email: &str) -> Result<Self, CoreError> {
        let user = directory
            .find(email)
            .ok_or_else(|| CoreError::UnknownUser(email.trim().to_string()))?;
        tracing::info!(email = %user.email, role = user.role.key(), "signed in");
        Ok(Self {
            role: user.role,
            user_email: user.email.clone(),
            auth_token: None,
            signed_in_at: Utc::now(),
        })
    }

    /// Fail with [`CoreError::NotPermitted`] unless the role allows `capability`.
    pub fn ensure(&self, capability: Capability) -> Result<(), CoreError> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(CoreError::NotPermitted {
                role: self.role,
                capability,
            })
        }
    }

    pub fn role_key(&self) -> &'static str {
        self.role.key()
    }

    /// Text before `@` in the user's email.
    pub fn local_part(&self) -> &str {
        local_part(&self.user_email)
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or("")
}

/// Restrict threads to what `role` may see.
///
/// Project managers see everything. Supervisors see threads where some
/// sender contains the local part of `user_email`, case-insensitively. An
/// empty local part matches every sender, so an empty email sees all
/// threads that have at least one sender.
pub fn filter_for_role(
    threads: &[NonResponsiveThread],
    role: Role,
    user_email: &str,
) -> Vec<NonResponsiveThread> {
    match role {
        Role::ProjectManager => threads.to_vec(),
        Role::Supervisor => {
            let needle = local_part(user_email).to_lowercase();
            threads
                .iter()
                .filter(|t| {
                    t.participants
                        .senders
                        .iter()
                        .any(|s| s.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::new(vec![
            UserEntry {
                email: "jane.doe@carma.com".into(),
                role: Role::Supervisor,
            },
            UserEntry {
                email: "chandru-pm@carma.com".into(),
                role: Role::ProjectManager,
            },
        ])
    }

    fn thread(subject: &str, senders: &[&str]) -> NonResponsiveThread {
        let mut t = NonResponsiveThread {
            thread_subject: subject.into(),
            ..Default::default()
        };
        t.participants.senders = senders.iter().map(|s| s.to_string()).collect();
        t
    }

    fn subjects(threads: &[NonResponsiveThread]) -> Vec<&str> {
        threads.iter().map(|t| t.thread_subject.as_str()).collect()
    }

    #[test]
    fn role_parses_keys_and_labels() {
        assert_eq!("project_manager".parse::<Role>().unwrap(), Role::ProjectManager);
        assert_eq!("Project Manager".parse::<Role>().unwrap(), Role::ProjectManager);
        assert_eq!(" SUPERVISOR ".parse::<Role>().unwrap(), Role::Supervisor);
        assert_eq!("project-manager".parse::<Role>().unwrap(), Role::ProjectManager);
        assert!(matches!(
            "Executive".parse::<Role>(),
            Err(CoreError::UnknownRole(_))
        ));
    }

    #[test]
    fn sign_in_matches_directory_case_insensitively() {
        let session = Session::sign_in(&directory(), " Jane.Doe@carma.com").unwrap();
        assert_eq!(session.role, Role::Supervisor);
        assert_eq!(session.role_key(), "supervisor");
        assert_eq!(session.user_email, "jane.doe@carma.com");
        assert_eq!(session.local_part(), "jane.doe");
        assert!(session.auth_token.is_none());
    }

    #[test]
    fn sign_in_unknown_user_fails() {
        let err = Session::sign_in(&directory(), "nobody@carma.com").unwrap_err();
        assert!(matches!(err, CoreError::UnknownUser(ref e) if e == "nobody@carma.com"));
    }

    #[test]
    fn directory_finds_project_manager() {
        assert_eq!(
            directory().project_manager().unwrap().email,
            "chandru-pm@carma.com"
        );
        assert!(UserDirectory::default().project_manager().is_none());
    }

    #[test]
    fn project_manager_may_do_everything() {
        let session = Session::sign_in(&directory(), "chandru-pm@carma.com").unwrap();
        for capability in [
            Capability::ProcurementLog,
            Capability::ThreadInsights,
            Capability::VendorReplies,
        ] {
            assert!(session.role.allows(capability));
            assert!(session.ensure(capability).is_ok());
        }
    }

    #[test]
    fn supervisor_is_kept_out_of_manager_screens() {
        let session = Session::sign_in(&directory(), "jane.doe@carma.com").unwrap();
        for capability in [
            Capability::ProcurementLog,
            Capability::ThreadInsights,
            Capability::VendorReplies,
        ] {
            assert!(!session.role.allows(capability));
        }
        let err = session.ensure(Capability::ProcurementLog).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Supervisor may not view the procurement log"
        );
    }

    #[test]
    fn project_manager_sees_everything_in_order() {
        let threads = vec![thread("a", &["x@y.com"]), thread("b", &[])];
        let out = filter_for_role(&threads, Role::ProjectManager, "anyone@carma.com");
        assert_eq!(out, threads);
    }

    #[test]
    fn supervisor_sees_own_threads() {
        let threads = vec![
            thread("mine", &["Jane.Doe@carma.com"]),
            thread("other", &["bob@carma.com"]),
            thread("cc", &["bob@carma.com", "jane.doe.site@carma.com"]),
        ];
        let out = filter_for_role(&threads, Role::Supervisor, "jane.doe@x.com");
        assert_eq!(subjects(&out), vec!["mine", "cc"]);
    }

    #[test]
    fn empty_email_matches_every_sender() {
        let threads = vec![thread("a", &["bob@carma.com"]), thread("b", &[])];
        let out = filter_for_role(&threads, Role::Supervisor, "");
        assert_eq!(subjects(&out), vec!["a"]);
    }

    #[test]
    fn session_roundtrips_through_json() {
        let session = Session::sign_in(&directory(), "chandru-pm@carma.com").unwrap();
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"project_manager\""));
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }
}
