use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{CredentialStore, StorageError, TOKEN_KEY, USERNAME_KEY};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Session file name in the per-origin cache directory
const SESSION_FILE: &str = "session.json";

/// Credential store backed by a small JSON object on disk.
///
/// The file maps the fixed storage keys to their values. It survives
/// restarts and is only removed by an explicit `clear`.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Failed to read session file");
                None
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents)?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, token: &str, username: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking a fresh login
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        entries.insert(USERNAME_KEY.to_string(), username.to_string());
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn token(&self) -> Option<String> {
        self.read_key(TOKEN_KEY)
    }

    fn username(&self) -> Option<String> {
        self.read_key(USERNAME_KEY)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.read_entries().unwrap_or_default();
        entries.remove(TOKEN_KEY);
        entries.remove(USERNAME_KEY);

        if entries.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        } else {
            self.write_entries(&entries)?;
        }
        debug!(path = %self.path.display(), "Session cleared");
        Ok(())
    }
}
