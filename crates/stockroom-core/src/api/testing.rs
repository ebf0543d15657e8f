//! Scripted transport and counting store doubles for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tokio::sync::Notify;

use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::auth::{CredentialStore, MemoryCredentialStore, StorageError};

/// Replays queued responses in order and records every request sent.
/// With `hold` set, `send` parks until `release` is called.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        let response = HttpResponse::new(
            StatusCode::from_u16(status).expect("valid status"),
            HeaderMap::new(),
            serde_json::to_vec(&body).expect("serializable body"),
        );
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Park every subsequent `send` until `release`.
    pub fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        let hold = self.hold.lock().unwrap().clone();
        if let Some(notify) = hold {
            notify.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response".to_string())))
    }
}

/// Memory store that counts every write.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryCredentialStore,
    saves: AtomicUsize,
    clears: AtomicUsize,
}

impl CountingStore {
    pub fn with_session(token: &str, username: &str) -> Self {
        Self {
            inner: MemoryCredentialStore::with_session(token, username),
            ..Self::default()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CredentialStore for CountingStore {
    fn save(&self, token: &str, username: &str) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(token, username)
    }

    fn token(&self) -> Option<String> {
        self.inner.token()
    }

    fn username(&self) -> Option<String> {
        self.inner.username()
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear()
    }
}
