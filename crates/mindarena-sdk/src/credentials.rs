//! Credential persistence
//!
//! Login stores a bearer token together with the user's identity. The
//! identity is trusted as-is until the server answers 401.

use crate::error::{SdkError, SdkResult};
use mindarena_types::AuthUser;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What login persists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub token: String,
    pub user: AuthUser,
}

/// Local key-value persistence for credentials
pub trait CredentialStore: Send + Sync {
    /// Read stored credentials, `None` when nothing is stored
    fn load(&self) -> SdkResult<Option<StoredCredentials>>;

    /// Replace stored credentials
    fn save(&self, credentials: &StoredCredentials) -> SdkResult<()>;

    /// Remove stored credentials; clearing an empty store is not an error
    fn clear(&self) -> SdkResult<()>;
}

/// JSON file on disk, readable only by the owner on unix
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> SdkResult<Option<StoredCredentials>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&raw).map(Some).map_err(|e| {
            SdkError::Credentials(format!("corrupt credentials file {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, credentials: &StoredCredentials) -> SdkResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(credentials)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> SdkResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            inner: Mutex::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> SdkResult<Option<StoredCredentials>> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, credentials: &StoredCredentials) -> SdkResult<()> {
        *self.inner.lock() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> SdkResult<()> {
        *self.inner.lock() = None;
        Ok(())
    }
}
