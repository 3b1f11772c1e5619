//! Signed-in session, optionally persisted as `<state>/session.json`

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::api::providers::auth::{AuthSession, AuthUser};
use crate::config::Config;

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    session: Option<AuthSession>,
    /// `None` when sessions are kept in memory only
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Memory-only store
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store backed by `path`; an existing, unexpired session is restored
    pub fn open(path: PathBuf) -> Result<Self> {
        let mut store = Self {
            session: None,
            path: Some(path.clone()),
        };

        if path.exists() {
            let contents = fs::read_to_string(&path).context("Failed to read session file")?;
            match serde_json::from_str::<AuthSession>(&contents) {
                Ok(session) if session.is_expired() => {
                    tracing::info!("Stored session expired; signing out");
                    store.clear()?;
                }
                Ok(session) => store.session = Some(session),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable session file");
                    store.clear()?;
                }
            }
        }

        Ok(store)
    }

    pub fn load(config: &Config) -> Result<Self> {
        if config.auth.persist_session {
            Self::open(config.session_path())
        } else {
            Ok(Self::in_memory())
        }
    }

    pub fn current(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn set(&mut self, session: AuthSession) -> Result<()> {
        tracing::info!(user_id = %session.user.id, "Session started");
        self.session = Some(session);
        self.save()
    }

    /// Replace the user of the current session (after a profile refresh)
    pub fn update_user(&mut self, user: AuthUser) -> Result<()> {
        if let Some(session) = self.session.as_mut() {
            session.user = user;
        }
        self.save()
    }

    /// Forget the session, removing the stored copy
    pub fn clear(&mut self) -> Result<()> {
        self.session = None;
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path).context("Failed to remove session file")?;
            }
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let (Some(path), Some(session)) = (&self.path, &self.session) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        fs::write(path, contents).context("Failed to write session file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::providers::auth::UserMetadata;
    use tempfile::TempDir;

    fn session(expires_at: Option<i64>) -> AuthSession {
        AuthSession {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at,
            user: AuthUser {
                id: "u1".to_string(),
                email: Some("ana@oficina.com".to_string()),
                user_metadata: UserMetadata::default(),
            },
        }
    }

    #[test]
    fn test_persisted_session_is_restored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let mut store = SessionStore::open(path.clone()).unwrap();
        assert!(!store.is_authenticated());
        store.set(session(None)).unwrap();

        let reopened = SessionStore::open(path).unwrap();
        assert!(reopened.is_authenticated());
        assert_eq!(reopened.user().unwrap().display_name(), "ana");
    }

    #[test]
    fn test_clear_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let mut store = SessionStore::open(path.clone()).unwrap();
        store.set(session(None)).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!store.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, serde_json::to_string(&session(Some(1))).unwrap()).unwrap();

        let store = SessionStore::open(path.clone()).unwrap();
        assert!(!store.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::open(path).unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_load_respects_persist_flag() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();
        config.auth.persist_session = false;

        let mut store = SessionStore::load(&config).unwrap();
        store.set(session(None)).unwrap();
        assert!(!config.session_path().exists());
    }
}
