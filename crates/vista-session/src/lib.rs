#![warn(missing_docs)]
//! # vista-session
//!
//! ## Purpose
//! Owns the authentication token lifecycle for the `vista` dashboard.
//!
//! ## Responsibilities
//! - Abstract the client-local key-value store behind [`TokenStore`].
//! - Provide an in-memory store for tests and a file-backed store that
//!   survives restarts.
//! - Expose [`SessionManager`]: login, logout, and "is authenticated".
//! - Version sessions with epochs so late responses can be discarded.
//!
//! ## Data flow
//! View controller receives a token from the API gateway ->
//! [`SessionManager::login`] persists it -> every authorized call reads it back
//! through [`SessionManager::token`] -> logout or a 401 calls
//! [`SessionManager::clear`].
//!
//! ## Ownership and lifetimes
//! The manager never caches the token; it reads the store on each call so a
//! login or logout is visible to the very next request.
//!
//! ## Error model
//! Store failures surface as [`StoreError`]. Clearing is infallible from the
//! caller's point of view: store errors during logout are logged, not returned.
//!
//! ## Security and privacy notes
//! Token values are never logged.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use vista_session::{MemoryTokenStore, SessionManager};
//!
//! let session = SessionManager::new(Arc::new(MemoryTokenStore::new()));
//! assert!(!session.is_authenticated());
//! session.login("T1").unwrap();
//! assert_eq!(session.token().as_deref(), Some("T1"));
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{error, warn};

/// Store key under which the session token is persisted.
pub const TOKEN_KEY: &str = "v_auth";

/// Client-local persistent key-value string store.
pub trait TokenStore: Send + Sync {
    /// Reads `key`.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one entry, as if left over from a
    /// previous run.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Store persisted as a flat JSON object in one file.
///
/// Writes go through a sibling temporary file followed by a rename, so a crash
/// mid-write leaves either the old or the new contents on disk.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileTokenStore {
    /// Creates a store backed by `path`. The file is created lazily.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read(&self.path) {
            Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_slice(&raw).map_err(StoreError::Codec),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(StoreError::Io(error)),
        }
    }

    /// Loads entries for a write. An undecodable file is treated as empty so
    /// the write replaces it; the returned flag is `true` in that case.
    fn load_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StoreError> {
        match self.load() {
            Ok(entries) => Ok((entries, false)),
            Err(StoreError::Codec(error)) => {
                warn!(
                    stage = "session",
                    action = "store_reset",
                    path = %self.path.display(),
                    %error,
                );
                Ok((BTreeMap::new(), true))
            }
            Err(error) => Err(error),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let encoded = serde_json::to_vec_pretty(entries)?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, encoded)?;
        if let Err(error) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(StoreError::Io(error));
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        let (mut entries, _) = self.load_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        let (mut entries, reset) = self.load_for_write()?;
        if entries.remove(key).is_none() && !reset {
            return Ok(());
        }
        self.save(&entries)
    }
}

/// Identifies the session an asynchronous operation was started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket {
    epoch: u64,
}

impl SessionTicket {
    /// Raw epoch number.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Session manager backed by an injected [`TokenStore`].
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    epoch: AtomicU64,
}

impl SessionManager {
    /// Creates a manager. A token already present in `store` (from a previous
    /// run) makes the manager start authenticated.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            epoch: AtomicU64::new(0),
        }
    }

    /// Returns the current token, read from the store at call time.
    ///
    /// Store read failures are logged and treated as "no token".
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|token| !token.trim().is_empty()),
            Err(error) => {
                warn!(stage = "session", action = "token_read_failed", %error);
                None
            }
        }
    }

    /// Returns `true` iff a token is currently present.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Persists `token` and opens a new session epoch.
    ///
    /// # Errors
    /// Returns [`SessionError::EmptyToken`] for a blank token and
    /// [`SessionError::Store`] when persisting fails. The epoch is unchanged
    /// on error.
    pub fn login(&self, token: &str) -> Result<SessionTicket, SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        self.store.set(TOKEN_KEY, token)?;
        Ok(self.advance())
    }

    /// Removes the persisted token and closes the current epoch.
    ///
    /// Returns the token that was present, if any, so the caller can notify
    /// the backend. Safe to call repeatedly.
    pub fn clear(&self) -> Option<String> {
        let previous = self.token();
        if let Err(error) = self.store.remove(TOKEN_KEY) {
            error!(stage = "session", action = "token_remove_failed", %error);
        }
        self.advance();
        previous
    }

    /// Returns a ticket for the current epoch.
    pub fn ticket(&self) -> SessionTicket {
        SessionTicket {
            epoch: self.epoch.load(Ordering::SeqCst),
        }
    }

    /// Returns `true` when no login or logout happened since `ticket` was
    /// issued.
    pub fn is_current(&self, ticket: SessionTicket) -> bool {
        self.epoch.load(Ordering::SeqCst) == ticket.epoch
    }

    fn advance(&self) -> SessionTicket {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        SessionTicket { epoch }
    }
}

/// Errors produced by token stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file could not be read or written.
    #[error("token store io failure: {0}")]
    Io(#[from] std::io::Error),
    /// Backing file is not a JSON object of strings.
    #[error("token store is corrupt: {0}")]
    Codec(#[from] serde_json::Error),
    /// A previous holder of the store lock panicked.
    #[error("token store lock poisoned")]
    Poisoned,
}

/// Errors produced by session transitions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Backend issued an empty token.
    #[error("session token must be non-empty")]
    EmptyToken,
    /// Token could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}
