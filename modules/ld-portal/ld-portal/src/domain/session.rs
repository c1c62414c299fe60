//! Signed-in session: auth token plus identity, persisted between runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ld_portal_sdk::{Secret, UserIdentity};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

/// File name of the persisted session inside the state directory.
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session file {} is not valid: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What survives a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Secret>,
    pub user: UserIdentity,
}

pub trait SessionStore: Send + Sync {
    /// # Errors
    /// Returns `SessionError` when stored state exists but cannot be read.
    fn load(&self) -> Result<Option<PersistedSession>, SessionError>;

    /// # Errors
    /// Returns `SessionError` when the state cannot be written.
    fn save(&self, session: &PersistedSession) -> Result<(), SessionError>;

    /// Removing a session that does not exist is not an error.
    ///
    /// # Errors
    /// Returns `SessionError` when stored state exists but cannot be removed.
    fn clear(&self) -> Result<(), SessionError>;
}

/// JSON file in the state directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(SESSION_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let raw = serde_json::to_vec_pretty(session).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, raw).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(self.io_error(e)),
            _ => Ok(()),
        }
    }
}

/// Process-local store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
        *self.inner.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.inner.lock() = None;
        Ok(())
    }
}

#[derive(Default)]
struct SessionState {
    token: Option<Secret>,
    user: Option<UserIdentity>,
}

/// Shared session handle.
///
/// Handed to the REST client (token injection, clearing on 401) and to the
/// front end (current identity). Every change is written through to the
/// store.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionContext")
            .field("authenticated", &state.user.is_some())
            .field("user", &state.user)
            .field("store", &"<dyn SessionStore>")
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Restore the persisted session, starting signed out when the store
    /// is empty or unreadable.
    pub fn init(store: Arc<dyn SessionStore>) -> Arc<Self> {
        let state = match store.load() {
            Ok(Some(saved)) => {
                tracing::debug!(user_id = %saved.user.id, role = %saved.user.role, "session restored");
                SessionState {
                    token: saved.token,
                    user: Some(saved.user),
                }
            }
            Ok(None) => SessionState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable session");
                SessionState::default()
            }
        };
        Arc::new(Self {
            store,
            state: RwLock::new(state),
        })
    }

    /// Signed-out context backed by a [`MemorySessionStore`].
    #[must_use]
    pub fn in_memory() -> Arc<Self> {
        Self::init(Arc::new(MemorySessionStore::new()))
    }

    /// Record a successful login.
    ///
    /// # Errors
    /// Returns `SessionError` when the store cannot persist the session. The
    /// in-memory session is updated regardless.
    pub fn set(&self, token: Option<Secret>, user: UserIdentity) -> Result<(), SessionError> {
        tracing::info!(user_id = %user.id, role = %user.role, "signed in");
        let persisted = PersistedSession {
            token: token.clone(),
            user: user.clone(),
        };
        {
            let mut state = self.state.write();
            state.token = token;
            state.user = Some(user);
        }
        self.store.save(&persisted)
    }

    /// Forget the session, in memory and in the store.
    ///
    /// # Errors
    /// Returns `SessionError` when the store cannot be cleared. The in-memory
    /// session is cleared regardless.
    pub fn clear(&self) -> Result<(), SessionError> {
        let previous = std::mem::take(&mut *self.state.write());
        if let Some(user) = previous.user {
            tracing::info!(user_id = %user.id, "signed out");
        }
        self.store.clear()
    }

    #[must_use]
    pub fn token(&self) -> Option<Secret> {
        self.state.read().token.clone()
    }

    #[must_use]
    pub fn identity(&self) -> Option<UserIdentity> {
        self.state.read().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().user.is_some()
    }
}
