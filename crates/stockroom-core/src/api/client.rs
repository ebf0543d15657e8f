//! Typed client for the inventory REST API.
//!
//! This module provides `InventoryClient`, which layers the endpoint
//! catalogue (login, products, stock, statistics) over the authenticated
//! `Gateway`.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::auth::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore, Session,
};
use crate::config::{Config, CredentialBackend};
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, NewProduct, Product, ProductUpdate, Statistics,
    StockAdjustment, StockDirection, VerifyResponse,
};

use super::transport::{HttpResponse, ReqwestTransport};
use super::{ApiError, Gateway, RequestOptions};

/// Default quantity threshold for the low-stock report
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

const LOGIN_FAILED_MESSAGE: &str = "Login failed, check username and password";

#[derive(Clone)]
pub struct InventoryClient {
    gateway: Gateway,
}

impl InventoryClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Wire up the production transport and the configured credential backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())
            .context("Failed to build HTTP client")?;

        let store: Arc<dyn CredentialStore> = match config.credential_backend {
            CredentialBackend::File => Arc::new(FileCredentialStore::new(config.session_dir()?)),
            CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new(config.keyring_service())),
            CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
        };
        debug!(backend = ?config.credential_backend, base_url = %config.api_base_url, "Inventory client configured");

        Ok(Self::new(Gateway::new(
            Arc::new(transport),
            store,
            config.api_base_url.clone(),
        )))
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn is_authenticated(&self) -> bool {
        self.gateway.store().is_authenticated()
    }

    pub fn username(&self) -> Option<String> {
        self.gateway.store().username()
    }

    pub fn clear_session(&self) -> Result<(), ApiError> {
        Ok(self.gateway.store().clear()?)
    }

    // ===== Session =====

    /// Log in and persist the returned session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Validation("Username and password required".to_string()));
        }

        let options = RequestOptions::post().json(&LoginRequest { username, password })?;
        let response = self.gateway.anonymous_request("/login", options).await?;

        if response.status.is_server_error() {
            return Err(ApiError::from_response(&response));
        }

        let body: LoginResponse = response.json().unwrap_or_default();
        match body {
            LoginResponse {
                success: true,
                token: Some(token),
                username: returned,
                ..
            } if response.is_success() => {
                let username = returned.unwrap_or_else(|| username.to_string());
                self.gateway.store().save(&token, &username)?;
                info!(username = %username, "Login successful");
                Ok(Session { token, username })
            }
            LoginResponse { message, .. } => {
                warn!(status = %response.status, "Login rejected");
                Err(ApiError::Validation(
                    message.unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()),
                ))
            }
        }
    }

    /// Best-effort server logout. The local session is always cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if self.is_authenticated() {
            match self
                .gateway
                .authenticated_request("/logout", RequestOptions::post())
                .await
            {
                Ok(response) if response.is_success() => debug!("Server session closed"),
                Ok(response) => warn!(status = %response.status, "Logout request rejected"),
                Err(e) => warn!(error = %e, "Logout request failed"),
            }
        }
        self.clear_session()?;
        info!("Logged out");
        Ok(())
    }

    /// Ask the server whether the stored token is still valid.
    pub async fn verify(&self) -> Result<bool, ApiError> {
        let response = self
            .gateway
            .authenticated_request("/verify", RequestOptions::get())
            .await?;
        if !response.is_success() {
            debug!(status = %response.status, "Verification rejected");
            return Ok(false);
        }
        Ok(response
            .json::<VerifyResponse>()
            .map(|v| v.valid)
            .unwrap_or(false))
    }

    // ===== Helpers =====

    fn check_response(response: HttpResponse) -> Result<HttpResponse, ApiError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(&response))
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ApiError> {
        let response = self.gateway.authenticated_request(path, options).await?;
        let response = Self::check_response(response)?;
        response.json().map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    /// Run a command endpoint and return the server's confirmation message.
    async fn command(&self, path: &str, options: RequestOptions) -> Result<String, ApiError> {
        let response = self.gateway.authenticated_request(path, options).await?;
        let response = Self::check_response(response)?;
        let envelope: MessageResponse = response.json().unwrap_or_default();
        Ok(envelope.message.unwrap_or_default())
    }

    // ===== Products =====

    /// List products, optionally filtered by a name keyword
    pub async fn list_products(&self, name: Option<&str>) -> Result<Vec<Product>, ApiError> {
        let mut options = RequestOptions::get();
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            options = options.query("name", name);
        }
        self.fetch("/products", options).await
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        self.fetch("/product", RequestOptions::get().query("id", id)).await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<String, ApiError> {
        product.validate().map_err(ApiError::Validation)?;
        self.command("/products", RequestOptions::post().json(product)?)
            .await
    }

    pub async fn update_product(&self, id: &str, update: &ProductUpdate) -> Result<String, ApiError> {
        update.validate().map_err(ApiError::Validation)?;
        self.command("/product", RequestOptions::put().query("id", id).json(update)?)
            .await
    }

    pub async fn delete_product(&self, id: &str) -> Result<String, ApiError> {
        self.command("/product", RequestOptions::delete().query("id", id))
            .await
    }

    // ===== Stock =====

    pub async fn stock_in(&self, id: &str, amount: u32) -> Result<String, ApiError> {
        self.adjust_stock(StockDirection::In, id, amount, 0).await
    }

    /// Remove stock. The amount is checked against the product's known
    /// quantity before any request is sent.
    pub async fn stock_out(&self, product: &Product, amount: u32) -> Result<String, ApiError> {
        self.adjust_stock(StockDirection::Out, &product.id, amount, product.quantity)
            .await
    }

    pub async fn adjust_stock(
        &self,
        direction: StockDirection,
        id: &str,
        amount: u32,
        on_hand: u32,
    ) -> Result<String, ApiError> {
        direction
            .validate(amount, on_hand)
            .map_err(ApiError::Validation)?;
        let options = RequestOptions::post().json(&StockAdjustment { id, amount })?;
        self.command(direction.endpoint(), options).await
    }

    // ===== Reports =====

    pub async fn statistics(&self) -> Result<Statistics, ApiError> {
        self.fetch("/statistics", RequestOptions::get()).await
    }

    /// Products whose quantity is below `threshold`
    pub async fn low_stock(&self, threshold: u32) -> Result<Vec<Product>, ApiError> {
        self.fetch("/low-stock", RequestOptions::get().query("threshold", threshold))
            .await
    }
}
