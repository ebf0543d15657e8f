use thiserror::Error;

use crate::auth::StorageError;
use crate::models::MessageResponse;

use super::transport::{HttpResponse, TransportError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    AuthExpired(String),

    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Classify a non-success response.
    ///
    /// Prefers the `message` of the server's `{success:false}` envelope and
    /// falls back to the raw body.
    pub fn from_response(response: &HttpResponse) -> Self {
        let message = response
            .json::<MessageResponse>()
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| Self::truncate_body(&response.text()));
        let status = response.status;

        match status.as_u16() {
            400..=499 => ApiError::Validation(message),
            500..=599 => ApiError::Server(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// Whether the caller must send the user back to the login view.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::AuthExpired(_))
    }
}
