//! Core library for the stockroom inventory console.
//!
//! This crate owns the authenticated API-access layer that every screen
//! of the console consumes:
//!
//! - `auth`: session credential storage (file, keychain, in-memory)
//! - `api`: request transport, authenticated gateway and typed inventory client
//! - `guard`: session verification before a protected view renders
//! - `routes`: the fixed mapping from path to view
//! - `models`: wire and domain types for the inventory REST API
//! - `config`: persisted console configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod routes;

pub use api::{ApiError, Gateway, InventoryClient, RequestOptions};
pub use auth::{CredentialStore, Session, StorageError};
pub use config::Config;
pub use guard::{GuardDecision, GuardState, RouteGuard};
pub use routes::Route;
