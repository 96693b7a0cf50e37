use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use keyring::credential::{CredentialBuilderApi, CredentialPersistence};
use keyring::{default, Entry};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Fixed key the credential is stored under.
pub const TOKEN_KEY: &str = "token";

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Keychain service name
const SERVICE_NAME: &str = "careers-portal";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Keychain access failed: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("No persistent keychain is available on this platform; use the file session backend")]
    KeyringUnavailable,
}

/// Persisted storage for the single session credential.
///
/// Each call is atomic on its own; nothing spans a request.
pub trait SessionStore: Send + Sync {
    /// Current credential, if any. Read failures count as absent.
    fn get(&self) -> Option<String>;

    /// Replace the stored credential.
    fn set(&self, token: &str) -> Result<(), StoreError>;

    /// Remove the credential. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<(), StoreError>;

    fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

/// In-process store. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Stores the credential as JSON in a data directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Load the full session record from disk
    pub fn load(&self) -> Result<Option<SessionData>, StoreError> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<String> {
        match self.load() {
            Ok(data) => data.map(|d| d.token),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let data = SessionData {
            token: token.to_string(),
            created_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&data)?;
        // Write then rename so readers never see a partial file
        let tmp = self.dir.join(format!("{}.tmp", SESSION_FILE));
        std::fs::write(&tmp, contents)?;
        std::fs::rename(tmp, self.session_path())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(self.session_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Stores the credential in the OS keychain.
///
/// The keychain entry is resolved once, when the store is opened, so every
/// call reads and writes the same credential.
pub struct KeyringSessionStore {
    entry: Entry,
}

impl KeyringSessionStore {
    pub fn new() -> Result<Self, StoreError> {
        Self::for_account(TOKEN_KEY)
    }

    /// Open the keychain entry for `account`. Fails when the platform
    /// keystore would not keep the credential past this process.
    pub fn for_account(account: &str) -> Result<Self, StoreError> {
        ensure_persistent(default::default_credential_builder().persistence())?;
        Ok(Self::with_entry(Entry::new(SERVICE_NAME, account)?))
    }

    /// Wrap an entry that was built elsewhere, e.g. with a custom credential.
    pub fn with_entry(entry: Entry) -> Self {
        Self { entry }
    }
}

fn ensure_persistent(persistence: CredentialPersistence) -> Result<(), StoreError> {
    match persistence {
        CredentialPersistence::EntryOnly | CredentialPersistence::ProcessOnly => {
            Err(StoreError::KeyringUnavailable)
        }
        _ => Ok(()),
    }
}

impl SessionStore for KeyringSessionStore {
    fn get(&self) -> Option<String> {
        match self.entry.get_password() {
            Ok(token) => Some(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read session from keychain");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        self.entry.set_password(token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
