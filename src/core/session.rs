//! Session store - the single source of truth for "is logged in" and "what role".
//!
//! The session is two entries in a durable key-value [`Storage`]: the bearer token and the
//! JSON-serialized [`User`]. Reading never fails: a missing, empty or corrupt entry simply
//! means logged out.

use crate::{
    entities::{Role, User},
    errors::{Error, Result},
};
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, error, warn};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the JSON-serialized user.
pub const USER_KEY: &str = "user";

/// Durable string key-value persistence.
pub trait Storage: Send + Sync {
    /// Stored value, `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Key-value storage backed by a JSON object on disk.
///
/// The file is re-read on every access so separate processes see each other's writes.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage at `path`. The file and its parent directory are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!("Could not read session file {:?}: {}", self.path, e);
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Session file {:?} is corrupt, ignoring it: {}", self.path, e);
            BTreeMap::new()
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents).map_err(|e| Error::Storage {
            message: format!("Failed to write {:?}: {e}", self.path),
        })
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// In-process storage. Clones share the same entries, which lets tests simulate a reload by
/// building a fresh [`SessionStore`] over a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// An authenticated session: bearer token plus the profile returned at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token.
    pub token: String,
    /// Profile stored with the token.
    pub user: User,
}

/// Session persistence over an injected [`Storage`].
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    /// Store over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Current session, or `None` when either entry is absent or unparsable.
    #[must_use]
    pub fn get(&self) -> Option<Session> {
        let token = self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())?;
        let raw_user = self.storage.get(USER_KEY)?;
        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => Some(Session { token, user }),
            Err(e) => {
                warn!("Stored user is unreadable, treating session as logged out: {}", e);
                None
            }
        }
    }

    /// Persists `token` and `user`. Storage failures are logged, never raised.
    pub fn set(&self, token: &str, user: &User) {
        let raw_user = match serde_json::to_string(user) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to serialize user {}: {}", user.id, e);
                return;
            }
        };
        if let Err(e) = self
            .storage
            .set(TOKEN_KEY, token)
            .and_then(|()| self.storage.set(USER_KEY, &raw_user))
        {
            error!("Failed to persist session: {}", e);
            return;
        }
        debug!(user_id = user.id, role = %user.role, "Session stored");
    }

    /// Forgets the session. Storage failures are logged, never raised.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                error!("Failed to remove session entry '{}': {}", key, e);
            }
        }
        debug!("Session cleared");
    }

    /// Whether a readable session is stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.get().is_some()
    }

    /// Stored bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.get().map(|session| session.token)
    }

    /// Stored user.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.get().map(|session| session.user)
    }

    /// Role of the stored user; `None` when logged out.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }
}
