use keyring::Entry;
use tracing::warn;

use super::{CredentialStore, StorageError, TOKEN_KEY, USERNAME_KEY};

/// Credential store keeping each session key as an OS keychain entry.
///
/// Entries live under a service name derived from the API origin, so
/// sessions for different servers never collide.
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<Entry, keyring::Error> {
        Entry::new(&self.service, key)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.entry(key).and_then(|entry| entry.get_password()) {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, key, "Failed to read keychain entry");
                None
            }
        }
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn save(&self, token: &str, username: &str) -> Result<(), StorageError> {
        write_pair(
            |key, value| Ok(self.entry(key)?.set_password(value)?),
            |key| self.delete(key),
            token,
            username,
        )
    }

    fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY)
    }

    fn username(&self) -> Option<String> {
        self.read(USERNAME_KEY)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.delete(TOKEN_KEY)?;
        self.delete(USERNAME_KEY)
    }
}

/// Write the username, then the token. If either write fails both keys
/// are removed, so the keychain never holds half a session.
fn write_pair<W, D>(mut write: W, mut delete: D, token: &str, username: &str) -> Result<(), StorageError>
where
    W: FnMut(&'static str, &str) -> Result<(), StorageError>,
    D: FnMut(&'static str) -> Result<(), StorageError>,
{
    let written = write(USERNAME_KEY, username).and_then(|()| write(TOKEN_KEY, token));
    if let Err(e) = written {
        for key in [TOKEN_KEY, USERNAME_KEY] {
            if let Err(cleanup) = delete(key) {
                warn!(error = %cleanup, key, "Failed to roll back keychain entry");
            }
        }
        return Err(e);
    }
    Ok(())
}
