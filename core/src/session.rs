//! Session storage for the bearer token.
//!
//! # Design
//! The token lives behind a `SessionStore` handed to `ApiClient` at
//! construction. The client only reads it; `auth().login` and
//! `auth().logout` are the only writers. At most one session is active at a
//! time: `set` replaces whatever was stored.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    /// Hospital the operator is scoped to, when the backend assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            hospital_id: None,
        }
    }

    pub fn with_hospital_id(mut self, hospital_id: impl Into<String>) -> Self {
        self.hospital_id = Some(hospital_id.into());
        self
    }
}

/// Storage for the single active session.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<Session>;
    fn set(&self, session: Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;

    fn token(&self) -> Option<String> {
        self.get().map(|s| s.token)
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Session> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn set(&self, session: Session) -> Result<(), SessionError> {
        // A poisoned lock still holds a usable Option; overwrite it.
        let mut slot = self.session.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self.session.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}

/// Session persisted as a JSON file so it survives process restarts.
///
/// A missing file means "logged out". An unreadable or corrupt file is also
/// treated as no session by `get`, but reported by `load`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| SessionError::Corrupt(e.to_string()))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                None
            }
        }
    }

    fn set(&self, session: Session) -> Result<(), SessionError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let text = serde_json::to_string_pretty(&session).map_err(|e| SessionError::Corrupt(e.to_string()))?;

        // Readers see either the old file or the new one, never a partial write.
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(text.as_bytes())?;
        staged.persist(&self.path).map_err(|e| SessionError::from(e.error))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_replaces_and_clear_removes() {
        let store = MemorySessionStore::new();
        assert!(store.get().is_none());

        store.set(Session::new("t1")).unwrap();
        store.set(Session::new("t2").with_hospital_id("7")).unwrap();
        let session = store.get().unwrap();
        assert_eq!(session.token, "t2");
        assert_eq!(session.hospital_id.as_deref(), Some("7"));

        store.clear().unwrap();
        assert!(store.token().is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileSessionStore::new(&path)
            .set(Session::new("abc").with_hospital_id("h1"))
            .unwrap();

        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.token().as_deref(), Some("abc"));
        assert_eq!(reopened.get().unwrap().hospital_id.as_deref(), Some("h1"));
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.clear().unwrap();
        store.set(Session::new("abc")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn file_store_replaces_in_place_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.set(Session::new("first-token-that-is-longer")).unwrap();
        store.set(Session::new("t2")).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("session.json")]);
        assert_eq!(store.load().unwrap().unwrap().token, "t2");
    }

    #[test]
    fn set_below_a_regular_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "").unwrap();

        let store = FileSessionStore::new(blocker.join("session.json"));
        assert!(matches!(store.set(Session::new("abc")), Err(SessionError::Io(_))));
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "");
    }

    #[test]
    fn corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.get().is_none());
        assert!(matches!(store.load(), Err(SessionError::Corrupt(_))));
    }
}
