//! File-backed session persistence.
//!
//! A single JSON document (`session.json` in the config dir) holds the
//! credential string and the owner identity. Writes go through a temp file
//! and an atomic rename, so a completed `save` can never leave a reader
//! seeing one field without the other.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::types::UserIdentity;

const SESSION_FILE: &str = "session.json";

/// The two durable fields, loaded together or not at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub identity: UserIdentity,
    pub credential: String,
}

/// Handle to the durable session mirror. Cheap to clone; all clones point
/// at the same file. Only the auth controller writes through it; other
/// components (the API gateway) read the credential.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SESSION_FILE),
        }
    }

    /// Overwrite both fields atomically.
    pub fn save(&self, identity: &UserIdentity, credential: &str) -> Result<()> {
        let session = PersistedSession {
            identity: identity.clone(),
            credential: credential.to_string(),
        };
        let raw = serde_json::to_vec_pretty(&session).context("serializing session")?;

        let dir = self
            .path
            .parent()
            .context("session path has no parent directory")?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("staging session file in {}", dir.display()))?;
        tmp.write_all(&raw).context("writing session file")?;
        tmp.persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    /// Read the persisted session. Anything short of a complete, well-formed
    /// pair (missing file, parse failure, empty credential) loads as `None`.
    pub fn load(&self) -> Option<PersistedSession> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!("session file unreadable: {e}");
                }
                return None;
            }
        };
        match serde_json::from_slice::<PersistedSession>(&raw) {
            Ok(session) if !session.credential.is_empty() => Some(session),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("session file unparseable, treating as absent: {e}");
                None
            }
        }
    }

    /// Current credential, re-read from disk on every call.
    pub fn credential(&self) -> Option<String> {
        self.load().map(|s| s.credential)
    }

    /// Remove the persisted session. Idempotent and infallible: logout must
    /// always succeed, so an already-absent file is simply a no-op.
    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to remove session file: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity() -> UserIdentity {
        UserIdentity {
            id: Some("owner-1".into()),
            email: "admin@xeroxshop.com".into(),
            shop_id: "shop-1".into(),
            name: Some("Admin".into()),
        }
    }

    #[test]
    fn save_then_load_round_trips_both_fields() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path());

        store.save(&identity(), "abc123").unwrap();
        let session = store.load().expect("session present");
        assert_eq!(session.credential, "abc123");
        assert_eq!(session.identity.email, "admin@xeroxshop.com");
        assert_eq!(store.credential().as_deref(), Some("abc123"));
    }

    #[test]
    fn load_without_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path());
        assert!(store.load().is_none());
        assert!(store.credential().is_none());
    }

    #[test]
    fn empty_credential_loads_as_absent() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path());
        store.save(&identity(), "").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn unparseable_file_loads_as_absent() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path());
        std::fs::write(tmp.path().join("session.json"), b"{\"credential\":").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn partial_document_loads_as_absent() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path());
        // Credential without identity must never surface as a session.
        std::fs::write(
            tmp.path().join("session.json"),
            b"{\"credential\": \"abc123\"}",
        )
        .unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn save_overwrites_previous_session() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path());
        store.save(&identity(), "first").unwrap();
        store.save(&identity(), "second").unwrap();
        assert_eq!(store.credential().as_deref(), Some("second"));
    }

    #[test]
    fn clear_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path());
        store.save(&identity(), "abc123").unwrap();

        store.clear();
        assert!(store.load().is_none());
        // Second clear on an already-empty store is a no-op.
        store.clear();
        assert!(store.load().is_none());
    }
}
