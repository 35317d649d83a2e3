//! Stored login session.
//!
//! Kept as JSON in `<config dir>/irriga/session.json`, or wherever
//! `IRRIGA_SESSION_FILE` points.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use irriga_client::{AuthSession, User};

pub const SESSION_FILE_ENV: &str = "IRRIGA_SESSION_FILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Backend that issued the token.
    pub api_url: String,
    pub access_token: String,
    pub user: Option<User>,
    pub logged_in_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(api_url: &str, session: AuthSession) -> Self {
        Self {
            api_url: api_url.to_string(),
            access_token: session.access_token,
            user: session.user,
            logged_in_at: Utc::now(),
        }
    }
}

/// Where the session lives.
pub fn session_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(SESSION_FILE_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let dir = dirs::config_dir().context("Could not determine the user config directory")?;
    Ok(dir.join("irriga").join("session.json"))
}

pub fn load_from(path: &Path) -> Result<Option<StoredSession>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    let session = serde_json::from_str(&raw)
        .with_context(|| format!("Corrupt session file {}", path.display()))?;
    Ok(Some(session))
}

pub fn save_to(path: &Path, session: &StoredSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write session file {}", path.display()))?;
    debug!(path = %path.display(), "Session saved");
    Ok(())
}

/// Remove the session file. Returns whether one existed.
pub fn clear_at(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to remove session file {}", path.display()))?;
    Ok(true)
}

pub fn load() -> Result<Option<StoredSession>> {
    load_from(&session_path()?)
}

pub fn save(session: &StoredSession) -> Result<PathBuf> {
    let path = session_path()?;
    save_to(&path, session)?;
    Ok(path)
}

pub fn clear() -> Result<bool> {
    clear_at(&session_path()?)
}

/// Bearer token of the stored session.
pub fn require_token() -> Result<String> {
    load()?
        .map(|s| s.access_token)
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run 'irriga auth login' first."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("irriga-session-{}", uuid::Uuid::new_v4()))
            .join("session.json")
    }

    fn session() -> StoredSession {
        StoredSession::new(
            "http://localhost:3001",
            AuthSession {
                access_token: "abc".to_string(),
                user: Some(User {
                    name: "Ana".to_string(),
                    email: "ana@fazenda.br".to_string(),
                    role: Some("admin".to_string()),
                }),
            },
        )
    }

    #[test]
    fn test_missing_file_is_no_session() {
        assert!(load_from(&temp_path()).unwrap().is_none());
    }

    #[test]
    fn test_save_load_clear() {
        let path = temp_path();
        let stored = session();

        save_to(&path, &stored).unwrap();
        assert_eq!(load_from(&path).unwrap(), Some(stored));

        assert!(clear_at(&path).unwrap());
        assert!(!clear_at(&path).unwrap());
        assert!(load_from(&path).unwrap().is_none());

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir(dir);
        }
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Corrupt session file"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
