//! # Session Store
//!
//! Process-wide key/value state for the console: the access token the HTTP
//! backend sends as a bearer credential, and operator settings. The store is
//! injected wherever it is needed; nothing reads it as ambient global state.
//!
//! Operations are explicit: `init` prepares the backing storage, `read` /
//! `write` access single keys, `clear` drops everything (logout).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;
use vtp_core::Secret;

/// Key under which the backend access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Session store failures.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value session state.
pub trait SessionStore: Send + Sync {
    /// Prepare the store for use. Idempotent.
    fn init(&self) -> Result<(), SessionError>;

    /// Value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Remove every entry.
    fn clear(&self) -> Result<(), SessionError>;

    /// The stored access token, wrapped so it cannot reach logs.
    fn access_token(&self) -> Result<Option<Secret>, SessionError> {
        Ok(self
            .read(ACCESS_TOKEN_KEY)?
            .filter(|t| !t.trim().is_empty())
            .map(Secret::new))
    }
}

// ─── In-memory store ─────────────────────────────────────────────────

/// Store that lives for the duration of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with an access token.
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .write()
            .insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn init(&self) -> Result<(), SessionError> {
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.entries.write().clear();
        Ok(())
    }
}

// ─── File-backed store ───────────────────────────────────────────────

/// Store persisted as a JSON object in a single file.
///
/// Entries are cached after `init`; every `write` rewrites the file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: RwLock<Option<BTreeMap<String, String>>>,
}

impl FileSessionStore {
    /// Store backed by `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(None),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_vec_pretty(entries).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut guard = self.entries.write();
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        match guard.as_mut() {
            Some(entries) => f(entries),
            None => f(&mut BTreeMap::new()),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn init(&self) -> Result<(), SessionError> {
        let entries = self.load()?;
        *self.entries.write() = Some(entries);
        tracing::debug!(path = %self.path.display(), "session store loaded");
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.with_entries(|entries| Ok(entries.get(key).cloned()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
            self.persist(entries)
        })
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.entries.write() = Some(BTreeMap::new());
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn SessionStore) {
        store.init().unwrap();
        assert_eq!(store.read(ACCESS_TOKEN_KEY).unwrap(), None);

        store.write(ACCESS_TOKEN_KEY, "tok-1").unwrap();
        store.write("theme", "dark").unwrap();
        store.write(ACCESS_TOKEN_KEY, "tok-2").unwrap();
        assert_eq!(store.read(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("tok-2"));
        assert_eq!(store.access_token().unwrap().unwrap().expose(), "tok-2");

        store.clear().unwrap();
        assert_eq!(store.read("theme").unwrap(), None);
        assert!(store.access_token().unwrap().is_none());
    }

    #[test]
    fn memory_store_semantics() {
        exercise(&MemorySessionStore::new());
    }

    #[test]
    fn file_store_semantics() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileSessionStore::new(dir.path().join("session.json")));
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileSessionStore::new(&path)
            .write(ACCESS_TOKEN_KEY, "persisted")
            .unwrap();

        let reopened = FileSessionStore::new(&path);
        reopened.init().unwrap();
        assert_eq!(
            reopened.read(ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("persisted")
        );
    }

    #[test]
    fn file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FileSessionStore::new(&path).init(),
            Err(SessionError::Corrupt { .. })
        ));
    }

    #[test]
    fn blank_token_counts_as_absent() {
        let store = MemorySessionStore::with_token("  ");
        assert!(store.access_token().unwrap().is_none());
    }
}
