//! Local credential storage.
//!
//! The session token and a cached copy of the user live in a small
//! key/value store. Nothing here is authoritative: the user record is
//! replaced from API responses and the token is dropped on logout or when
//! the backend rejects it.

use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
};
use study_quest::models::User;
use thiserror::Error;

/// Key holding the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key holding the JSON-encoded cached user.
pub const USER_KEY: &str = "user";

/// Credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Credential store I/O error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// Encoding a value failed
    #[error("Credential store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for credential store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque key/value store for session credentials.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> StoreResult<()>;
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// Stored bearer token, if any.
pub fn load_token<S: CredentialStore + ?Sized>(store: &S) -> Option<String> {
    store.get(ACCESS_TOKEN_KEY).filter(|token| !token.is_empty())
}

/// Cached user, if present and decodable.
pub fn load_user<S: CredentialStore + ?Sized>(store: &S) -> Option<User> {
    let raw = store.get(USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable cached user");
            None
        }
    }
}

/// Persist the cached user.
pub fn save_user<S: CredentialStore + ?Sized>(store: &mut S, user: &User) -> StoreResult<()> {
    store.set(USER_KEY, serde_json::to_string(user)?)
}

/// Persist a fresh login.
pub fn save_session<S: CredentialStore + ?Sized>(store: &mut S, token: &str, user: &User) -> StoreResult<()> {
    store.set(ACCESS_TOKEN_KEY, token.to_string())?;
    save_user(store, user)
}

/// Drop both the token and the cached user.
pub fn clear<S: CredentialStore + ?Sized>(store: &mut S) -> StoreResult<()> {
    store.remove(ACCESS_TOKEN_KEY)?;
    store.remove(USER_KEY)
}

/// In-memory store, lost on exit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON file store, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt credential file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> StoreResult<()> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        // Write then rename so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn temp_path(name: &str) -> PathBuf {
        let rand_id: u32 = rand::random();
        std::env::temp_dir()
            .join(format!("sq_client_test_{rand_id}"))
            .join(name)
    }

    fn sample_user() -> User {
        User {
            id: 1,
            email: "me@example.com".to_string(),
            username: "me".to_string(),
            level: 3,
            total_points: 320,
            created_at: Utc::now(),
            week_points: Some(40),
        }
    }

    #[test]
    fn test_memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v".to_string()).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_session_helpers() {
        let mut store = MemoryStore::new();
        let user = sample_user();
        save_session(&mut store, "tok", &user).unwrap();
        assert_eq!(load_token(&store).as_deref(), Some("tok"));
        assert_eq!(load_user(&store).map(|u| u.username), Some("me".to_string()));

        clear(&mut store).unwrap();
        assert_eq!(load_token(&store), None);
        assert!(load_user(&store).is_none());
    }

    #[test]
    fn test_corrupt_cached_user_is_absent() {
        let mut store = MemoryStore::new();
        store.set(USER_KEY, "{not json".to_string()).unwrap();
        assert!(load_user(&store).is_none());
    }

    #[test]
    fn test_empty_token_is_absent() {
        let mut store = MemoryStore::new();
        store.set(ACCESS_TOKEN_KEY, String::new()).unwrap();
        assert_eq!(load_token(&store), None);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let path = temp_path("credentials.json");
        {
            let mut store = FileStore::open(&path).unwrap();
            save_session(&mut store, "tok", &sample_user()).unwrap();
        }

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(load_token(&store).as_deref(), Some("tok"));
        assert_eq!(load_user(&store).map(|u| u.total_points), Some(320));

        clear(&mut store).unwrap();
        let store = FileStore::open(&path).unwrap();
        assert_eq!(load_token(&store), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_discards_corrupt_file() {
        let path = temp_path("credentials.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "garbage").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
