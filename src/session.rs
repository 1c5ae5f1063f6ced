//! Session store for the signed-in patient.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by the HTTP client (bearer token) and the navigation guard (auth
//! check). Written on login, cleared on logout and on 401.
//!
//! PERSISTENCE
//! ===========
//! The store is rehydrated from a [`SessionStorage`] once, at construction,
//! and written through on every change. The persisted value lives under the
//! single key [`STORAGE_KEY`] as `{"user": <session or null>}`. A value that
//! fails to parse is treated as no session.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::envelope::null_as_default;

/// Durable key holding the serialized session.
pub const STORAGE_KEY: &str = "cp-user";

/// The authenticated user's record, as returned by the login endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub account: String,
    pub mobile: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avatar: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token: String,
}

impl Session {
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    user: Option<Session>,
}

// =============================================================================
// STORAGE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session storage io failed for {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Durable backing for the session store.
pub trait SessionStorage: Send + Sync {
    /// Read the raw persisted value, `None` if nothing was ever written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the persisted value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn save(&self, value: &str) -> Result<(), StorageError>;
}

impl<S: SessionStorage + ?Sized> SessionStorage for Arc<S> {
    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save(&self, value: &str) -> Result<(), StorageError> {
        (**self).save(value)
    }
}

/// JSON file storage. One file per [`STORAGE_KEY`].
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, value: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, value).map_err(|e| self.io_error(e))
    }
}

/// In-process storage. Survives store re-creation but not process exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    value: Mutex<Option<String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        Self { value: Mutex::new(Some(value.into())) }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.value.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, value: &str) -> Result<(), StorageError> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_owned());
        Ok(())
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Single authoritative holder of the current [`Session`].
pub struct SessionStore {
    current: Mutex<Option<Session>>,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Create a store and rehydrate it from `storage`.
    ///
    /// Unreadable or unparseable storage yields an empty store.
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let current = rehydrate(&storage);
        Self { current: Mutex::new(current), storage: Box::new(storage) }
    }

    /// Create an empty store backed by [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new())
    }

    #[must_use]
    pub fn get(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// The bearer token, only when non-empty.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().as_ref().filter(|s| s.has_token()).map(|s| s.token.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().as_ref().is_some_and(Session::has_token)
    }

    /// Replace any existing session.
    pub fn set(&self, session: Session) {
        tracing::debug!(user_id = %session.id, "session set");
        let mut current = self.lock();
        *current = Some(session);
        self.persist(current.as_ref());
    }

    /// Drop the session. Clearing an empty store is a no-op.
    pub fn clear(&self) {
        let mut current = self.lock();
        if current.take().is_some() {
            tracing::debug!("session cleared");
            self.persist(None);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, user: Option<&Session>) {
        let state = PersistedState { user: user.cloned() };
        let result = serde_json::to_string(&state)
            .map_err(|e| e.to_string())
            .and_then(|raw| self.storage.save(&raw).map_err(|e| e.to_string()));
        if let Err(error) = result {
            tracing::warn!(%error, key = STORAGE_KEY, "failed to persist session");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("authenticated", &self.is_authenticated()).finish_non_exhaustive()
    }
}

fn rehydrate(storage: &dyn SessionStorage) -> Option<Session> {
    let raw = match storage.load() {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => return None,
        Err(error) => {
            tracing::warn!(%error, key = STORAGE_KEY, "failed to load persisted session");
            return None;
        }
    };
    match serde_json::from_str::<PersistedState>(&raw) {
        Ok(state) => state.user,
        Err(error) => {
            tracing::warn!(%error, key = STORAGE_KEY, "discarding unparseable persisted session");
            None
        }
    }
}
