use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// File name of the persisted session inside the CLI config directory
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable home of the bearer token. This is the only client state that
/// outlives the process.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&self, token: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedToken {
    token: String,
    saved_at: DateTime<Utc>,
}

/// Stores the token as `{"token": "...", "saved_at": "..."}` in a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted in a config directory, using the standard file name
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the current token was saved, if any
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.read()?.map(|p| p.saved_at))
    }

    fn read(&self) -> Result<Option<PersistedToken>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.map(|p| p.token))
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let persisted = PersistedToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&persisted)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store; counts writes so callers can observe session transitions
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
    saves: AtomicUsize,
    clears: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a usable Option
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        *self.slot() = Some(token.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
