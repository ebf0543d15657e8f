use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{CredentialStore, StorageError, TOKEN_KEY, USERNAME_KEY};

/// Process-local credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<&'static str, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a session.
    pub fn with_session(token: &str, username: &str) -> Self {
        let store = Self::new();
        {
            let mut entries = store.lock();
            entries.insert(TOKEN_KEY, token.to_string());
            entries.insert(USERNAME_KEY, username.to_string());
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<&'static str, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, token: &str, username: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();
        entries.insert(TOKEN_KEY, token.to_string());
        entries.insert(USERNAME_KEY, username.to_string());
        Ok(())
    }

    fn token(&self) -> Option<String> {
        self.lock().get(TOKEN_KEY).cloned()
    }

    fn username(&self) -> Option<String> {
        self.lock().get(USERNAME_KEY).cloned()
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.lock();
        entries.remove(TOKEN_KEY);
        entries.remove(USERNAME_KEY);
        Ok(())
    }
}
