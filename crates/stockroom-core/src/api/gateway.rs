//! Authenticated request gateway.
//!
//! Every call made with `authenticated_request` carries the stored bearer
//! token and reacts to a 401 the same way: the session is cleared before
//! the caller sees `ApiError::AuthExpired`.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::CredentialStore;

use super::transport::{HttpRequest, HttpResponse, Transport};
use super::ApiError;

/// Message attached to `AuthExpired`
pub const SESSION_EXPIRED_MESSAGE: &str = "Not logged in or session expired, please log in again";

/// Per-call overrides for a gateway request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::default().method(Method::POST)
    }

    pub fn put() -> Self {
        Self::default().method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::default().method(Method::DELETE)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode request body: {}", e)))?;
        Ok(self.body(bytes))
    }
}

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    base_url: String,
}

impl Gateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            store,
            base_url,
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a relative path onto the base URL and append query pairs.
    /// Absolute and protocol-relative URLs are used as given.
    pub fn resolve_url(&self, url: &str, query: &[(String, String)]) -> Result<String, ApiError> {
        let full = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if let Some(rest) = url.strip_prefix("//") {
            let scheme = self.base_url.split("://").next().unwrap_or("http");
            format!("{}://{}", scheme, rest)
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        };

        let mut parsed = Url::parse(&full)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid URL {}: {}", full, e)))?;
        if !query.is_empty() {
            let mut pairs = parsed.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(parsed.into())
    }

    /// Merge headers: JSON content type, then caller overrides, then the
    /// bearer credential. Callers cannot supply Authorization themselves.
    pub fn build_headers(token: Option<&str>, overrides: &HeaderMap) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for name in overrides.keys() {
            headers.remove(name);
        }
        for (name, value) in overrides.iter() {
            if *name != AUTHORIZATION {
                headers.append(name.clone(), value.clone());
            }
        }

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ApiError::InvalidRequest("Stored token contains invalid header characters".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn build_request(
        &self,
        url: &str,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            url: self.resolve_url(url, &options.query)?,
            headers: Self::build_headers(token, &options.headers)?,
            method: options.method,
            body: options.body,
        })
    }

    /// Send a request carrying the stored session credential.
    ///
    /// A 401 clears the credential store and fails with `AuthExpired`;
    /// every other status is returned unchanged.
    pub async fn authenticated_request(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, ApiError> {
        let token = self.store.token();
        let request = self.build_request(url, options, token.as_deref())?;
        debug!(
            method = %request.method,
            url = %request.url,
            authenticated = token.is_some(),
            "Sending request"
        );

        let response = self.transport.send(request).await?;

        if response.status == StatusCode::UNAUTHORIZED {
            warn!(url, "Session rejected by server, clearing stored credentials");
            self.store.clear()?;
            return Err(ApiError::AuthExpired(SESSION_EXPIRED_MESSAGE.to_string()));
        }

        debug!(url, status = %response.status, "Response received");
        Ok(response)
    }

    /// Send a request without credentials and without 401 handling.
    /// Used for login, where a 401 means bad credentials rather than
    /// an expired session.
    pub async fn anonymous_request(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(url, options, None)?;
        debug!(method = %request.method, url = %request.url, "Sending anonymous request");
        Ok(self.transport.send(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{CountingStore, ScriptedTransport};
    use crate::api::TransportError;
    use crate::auth::MemoryCredentialStore;

    fn gateway(transport: &Arc<ScriptedTransport>, store: &Arc<MemoryCredentialStore>) -> Gateway {
        Gateway::new(transport.clone(), store.clone(), "http://localhost:8080/api/")
    }

    #[test]
    fn test_resolve_relative_and_absolute_urls() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(MemoryCredentialStore::new());
        let gw = gateway(&transport, &store);

        assert_eq!(gw.resolve_url("/products", &[]).unwrap(), "http://localhost:8080/api/products");
        assert_eq!(gw.resolve_url("verify", &[]).unwrap(), "http://localhost:8080/api/verify");
        assert_eq!(
            gw.resolve_url("https://other.example/api/verify", &[]).unwrap(),
            "https://other.example/api/verify"
        );
        assert_eq!(
            gw.resolve_url("//other.example/x", &[]).unwrap(),
            "http://other.example/x"
        );
    }

    #[test]
    fn test_query_pairs_are_encoded() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(MemoryCredentialStore::new());
        let gw = gateway(&transport, &store);

        let query = vec![("name".to_string(), "steel bolt&nut".to_string())];
        assert_eq!(
            gw.resolve_url("/products", &query).unwrap(),
            "http://localhost:8080/api/products?name=steel+bolt%26nut"
        );
    }

    #[test]
    fn test_headers_overlay_order() {
        let mut overrides = HeaderMap::new();
        overrides.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        overrides.insert("x-trace", HeaderValue::from_static("1"));
        overrides.insert(AUTHORIZATION, HeaderValue::from_static("Bearer forged"));

        let headers = Gateway::build_headers(Some("real"), &overrides).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get("x-trace").unwrap(), "1");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer real");
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn test_no_token_omits_authorization() {
        let mut overrides = HeaderMap::new();
        overrides.insert(AUTHORIZATION, HeaderValue::from_static("Bearer forged"));

        let headers = Gateway::build_headers(None, &overrides).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_request_carries_bearer_token() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, serde_json::json!([]));
        let store = Arc::new(MemoryCredentialStore::with_session("tok", "admin"));

        let response = gateway(&transport, &store)
            .authenticated_request("/products", RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[0].headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[tokio::test]
    async fn test_request_without_token_has_no_authorization() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, serde_json::json!([]));
        let store = Arc::new(MemoryCredentialStore::new());

        gateway(&transport, &store)
            .authenticated_request("/products", RequestOptions::get())
            .await
            .unwrap();

        assert!(transport.requests()[0].headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_401_clears_store_and_returns_auth_expired() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(401, serde_json::json!({"success": false, "message": "expired"}));
        let store = Arc::new(MemoryCredentialStore::with_session("tok", "admin"));

        let result = gateway(&transport, &store)
            .authenticated_request("/statistics", RequestOptions::get())
            .await;

        assert!(matches!(result, Err(ApiError::AuthExpired(_))));
        assert!(!store.is_authenticated());
        assert!(store.username().is_none());
    }

    #[tokio::test]
    async fn test_other_statuses_pass_through_untouched() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(400, serde_json::json!({"success": false, "message": "Insufficient stock"}));
        transport.push_json(500, serde_json::json!({"success": false}));
        let store = Arc::new(MemoryCredentialStore::with_session("tok", "admin"));
        let gw = gateway(&transport, &store);

        let response = gw.authenticated_request("/stock-out", RequestOptions::post()).await.unwrap();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Insufficient stock"));

        let response = gw.authenticated_request("/statistics", RequestOptions::get()).await.unwrap();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_network_failure_is_distinct_and_keeps_session() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_error(TransportError::Timeout);
        let store = Arc::new(MemoryCredentialStore::with_session("tok", "admin"));

        let result = gateway(&transport, &store)
            .authenticated_request("/products", RequestOptions::get())
            .await;

        assert!(matches!(result, Err(ApiError::Network(TransportError::Timeout))));
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_json_body_is_forwarded() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, serde_json::json!({"success": true}));
        let store = Arc::new(MemoryCredentialStore::with_session("tok", "admin"));

        let options = RequestOptions::post()
            .json(&serde_json::json!({"id": "P001", "amount": 3}))
            .unwrap();
        gateway(&transport, &store)
            .authenticated_request("/stock-in", options)
            .await
            .unwrap();

        let sent = transport.requests();
        let body: serde_json::Value = serde_json::from_slice(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"id": "P001", "amount": 3}));
        assert_eq!(sent[0].method, Method::POST);
    }

    #[tokio::test]
    async fn test_store_written_once_per_401_and_never_otherwise() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, serde_json::json!([]));
        transport.push_json(400, serde_json::json!({"success": false, "message": "bad"}));
        transport.push_json(500, serde_json::json!({"success": false}));
        transport.push_json(401, serde_json::json!({"success": false}));
        transport.push_json(401, serde_json::json!({"success": false}));
        let store = Arc::new(CountingStore::with_session("tok", "admin"));
        let gw = Gateway::new(transport.clone(), store.clone(), "http://localhost:8080/api");

        for _ in 0..3 {
            gw.authenticated_request("/products", RequestOptions::get()).await.unwrap();
        }
        assert_eq!(store.clears(), 0);
        assert_eq!(store.saves(), 0);

        let result = gw.authenticated_request("/products", RequestOptions::get()).await;
        assert!(matches!(result, Err(ApiError::AuthExpired(_))));
        assert_eq!(store.clears(), 1);

        // A second 401 is its own clear
        let result = gw.authenticated_request("/products", RequestOptions::get()).await;
        assert!(matches!(result, Err(ApiError::AuthExpired(_))));
        assert_eq!(store.clears(), 2);
        assert_eq!(store.saves(), 0);
    }
}
