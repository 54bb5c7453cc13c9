//! Local persisted key-value store.
//!
//! Values are plain strings keyed by name. [`FileStore`] keeps them as one
//! JSON object at `~/.config/memorymap/local_storage.json`; every read goes to
//! disk and every write replaces the file atomically (temp file + rename).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{MemoryMapError, Result};

pub const TOKEN_KEY: &str = "token";
pub const FAVORITE_QUOTES_KEY: &str = "favoriteQuotes";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// JSON-file backed store.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                MemoryMapError::Storage(format!("corrupt store {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(MemoryMapError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MemoryMapError::Storage(format!("failed to create dir: {e}")))?;
        }
        let json = serde_json::to_string_pretty(map)?;
        let tmp = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::now_v7().simple()));
        std::fs::write(&tmp, json)
            .map_err(|e| MemoryMapError::Storage(format!("failed to write temp file: {e}")))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            MemoryMapError::Storage(format!("failed to replace {}: {e}", self.path.display()))
        })
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| MemoryMapError::Storage("store lock poisoned".into()))?;
        let mut map = self.read_all()?;
        f(&mut map);
        self.write_all(&map)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|m| {
            m.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.modify(|m| {
            m.remove(key);
        })
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        if let Ok(mut m) = store.inner.lock() {
            m.insert(TOKEN_KEY.to_string(), token.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let m = self
            .inner
            .lock()
            .map_err(|_| MemoryMapError::Storage("store lock poisoned".into()))?;
        Ok(m.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut m = self
            .inner
            .lock()
            .map_err(|_| MemoryMapError::Storage("store lock poisoned".into()))?;
        m.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut m = self
            .inner
            .lock()
            .map_err(|_| MemoryMapError::Storage("store lock poisoned".into()))?;
        m.remove(key);
        Ok(())
    }
}

/// Bearer token accessor. Reads through to the store on every call.
#[derive(Clone)]
pub struct TokenStore {
    store: SharedStore,
}

impl TokenStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The stored token, if any and non-empty. Read errors count as "no token".
    pub fn get(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(Some(t)) if !t.trim().is_empty() => Some(t),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("token read failed: {e}");
                None
            }
        }
    }

    pub fn set(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }
}

/// Favorite quote ids, persisted as a JSON array under `favoriteQuotes`.
#[derive(Clone)]
pub struct FavoriteStore {
    store: SharedStore,
}

impl FavoriteStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Load the favorites set. A corrupt value is logged and treated as empty.
    pub fn load(&self) -> BTreeSet<String> {
        let raw = match self.store.get(FAVORITE_QUOTES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeSet::new(),
            Err(e) => {
                tracing::warn!("failed to load favorites: {e}");
                return BTreeSet::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!("failed to parse favorites: {e}");
                BTreeSet::new()
            }
        }
    }

    pub fn save(&self, favorites: &BTreeSet<String>) -> Result<()> {
        let ids: Vec<&String> = favorites.iter().collect();
        let json = serde_json::to_string(&ids)?;
        self.store.set(FAVORITE_QUOTES_KEY, &json)
    }

    /// Flip membership of `key`, persist, and return whether it is now a favorite.
    pub fn toggle(&self, key: &str) -> Result<bool> {
        let mut favorites = self.load();
        let now_favorite = if favorites.remove(key) {
            false
        } else {
            favorites.insert(key.to_string());
            true
        };
        self.save(&favorites)?;
        Ok(now_favorite)
    }
}
