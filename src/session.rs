//! Session storage for the desk client.
//!
//! The bearer token lives in memory for fast reads and in a durable
//! [`KeyValueStore`] so it survives restarts. Writes reach the durable
//! store before the in-memory copy changes; a failing store is reported,
//! never papered over.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Durable key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Durable key reserved for the cached user profile. Cleared on logout.
pub const USER_KEY: &str = "user";

/// A durable string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;

    /// Removes a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// In-process store.
///
/// Clones share the same backing map, so a second client built over a
/// clone sees what the first one persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object file.
///
/// Every write rewrites the whole file before returning. A missing file
/// reads as an empty store. On unix the file is created owner-only (0600)
/// since it holds the bearer token.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates a store over the given file. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The file this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> io::Result<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e),
        }
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> io::Result<()> {
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// The client's session: the current bearer token.
///
/// The token is opaque; it is never decoded or inspected.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    token: RwLock<Option<String>>,
}

impl SessionStore {
    /// Loads the session from durable storage.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the store cannot be read. A missing
    /// token entry is not an error.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> io::Result<Self> {
        let token = storage.get(TOKEN_KEY)?;
        tracing::debug!(has_token = token.is_some(), "Session loaded");
        Ok(Self {
            storage,
            token: RwLock::new(token),
        })
    }

    /// The current token, if any.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persists a new token, then makes it current.
    ///
    /// # Errors
    ///
    /// Returns the storage error; the in-memory token is left unchanged.
    pub fn set_token(&self, token: &str) -> io::Result<()> {
        self.storage.set(TOKEN_KEY, token)?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    /// Forgets the token and the cached user profile.
    ///
    /// The in-memory token is dropped first, so the client is logged out
    /// even if the durable store then fails. Both durable keys are always
    /// attempted; the first failure is returned.
    pub fn clear(&self) -> io::Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        let token_removed = self.storage.remove(TOKEN_KEY);
        let user_removed = self.storage.remove(USER_KEY);
        token_removed.and(user_removed)
    }

    /// Returns true if a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself.
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
