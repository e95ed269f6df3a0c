//! Persisted sign-in session (JSON file).

use std::path::Path;

use anyhow::{Context, Result, bail};
use sitelog_core::Session;

pub fn save(path: &Path, session: &Session) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating session directory {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(session).context("serializing session")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing session file {}", path.display()))?;
    Ok(())
}

/// The stored session, or `None` when signed out.
pub fn load(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading session file {}", path.display()))?;
    let session = serde_json::from_str(&json)
        .with_context(|| format!("parsing session file {}", path.display()))?;
    Ok(Some(session))
}

pub fn require(path: &Path) -> Result<Session> {
    match load(path)? {
        Some(session) => Ok(session),
        None => bail!("not signed in; run `sitelog login <email>` first"),
    }
}

/// Remove the session file. Returns whether one existed.
pub fn clear(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("removing session file {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitelog_core::{Role, UserDirectory, UserEntry};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("sitelog-test-{}-{name}", std::process::id()))
            .join("session.json")
    }

    #[test]
    fn save_load_clear() {
        let path = temp_path("roundtrip");
        let directory = UserDirectory::new(vec![UserEntry {
            email: "jane.doe@carma.com".into(),
            role: Role::Supervisor,
        }]);
        let session = Session::sign_in(&directory, "jane.doe@carma.com").unwrap();

        save(&path, &session).unwrap();
        assert_eq!(load(&path).unwrap(), Some(session.clone()));
        assert_eq!(require(&path).unwrap(), session);

        assert!(clear(&path).unwrap());
        assert!(!clear(&path).unwrap());
        assert_eq!(load(&path).unwrap(), None);
        assert!(require(&path).is_err());

        let _ = std::fs::remove_dir(path.parent().unwrap());
    }
}
