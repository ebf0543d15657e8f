use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access session storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}
