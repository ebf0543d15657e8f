//! Session credential storage.
//!
//! This module provides:
//! - `CredentialStore`: the injectable key-value interface for the session
//! - `FileCredentialStore`: JSON file in the per-origin cache directory
//! - `KeyringCredentialStore`: OS keychain entries via keyring
//! - `MemoryCredentialStore`: process-local store used by tests
//!
//! The store is the single source of truth for whether the console is
//! logged in. Implementations must not cache reads in memory.

pub mod credentials;
pub mod error;
pub mod memory;
pub mod session;

use serde::{Deserialize, Serialize};

pub use credentials::KeyringCredentialStore;
pub use error::StorageError;
pub use memory::MemoryCredentialStore;
pub use session::FileCredentialStore;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "inventory_token";

/// Storage key holding the logged-in username
pub const USERNAME_KEY: &str = "inventory_username";

/// The logged-in user's credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

/// Persistent storage for the current session.
///
/// Reads never fail: a store that cannot be read reports the value as
/// absent. Writes report `StorageError`, which callers treat as fatal.
pub trait CredentialStore: Send + Sync {
    /// Persist both the token and the username.
    fn save(&self, token: &str, username: &str) -> Result<(), StorageError>;

    fn token(&self) -> Option<String>;

    fn username(&self) -> Option<String>;

    /// Remove both keys. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StorageError>;

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The stored session, if a token is present.
    fn session(&self) -> Option<Session> {
        let token = self.token()?;
        Some(Session {
            token,
            username: self.username().unwrap_or_default(),
        })
    }
}
