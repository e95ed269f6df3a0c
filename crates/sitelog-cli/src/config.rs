//! TOML configuration: user directory, project list, escalation signature.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sitelog_core::compose::DEFAULT_SIGNATURE;
use sitelog_core::{Role, UserDirectory, UserEntry};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

fn default_projects() -> Vec<String> {
    ["Penthouse A", "Project Cascade", "Skyline Tower"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_users() -> UserDirectory {
    UserDirectory::new(vec![
        UserEntry {
            email: "chandru-pm@carma.com".into(),
            role: Role::ProjectManager,
        },
        UserEntry {
            email: "site-supervisor@carma.com".into(),
            role: Role::Supervisor,
        },
    ])
}

fn default_signature() -> String {
    DEFAULT_SIGNATURE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Overrides the built-in API URL; `--api-url` still wins.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Projects offered by the procurement module.
    #[serde(default = "default_projects")]
    pub projects: Vec<String>,
    #[serde(default = "default_signature")]
    pub escalation_signature: String,
    /// `[[users]]` tables; kept last so they serialize after plain keys.
    #[serde(default = "default_users")]
    pub users: UserDirectory,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            projects: default_projects(),
            escalation_signature: default_signature(),
            users: default_users(),
        }
    }
}

impl Config {
    /// Load from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Flag, then config file, then [`DEFAULT_API_URL`].
    pub fn resolve_api_url(&self, flag: Option<&str>) -> String {
        flag.map(String::from)
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// `project` if given, else the first configured project.
    pub fn project_or_default(&self, project: Option<String>) -> Result<String> {
        project
            .or_else(|| self.projects.first().cloned())
            .context("no project given and none configured")
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sitelog")
        .join("config.toml")
}

pub fn default_session_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sitelog")
        .join("session.json")
}
