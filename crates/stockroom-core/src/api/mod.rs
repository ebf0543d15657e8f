//! REST API access for the inventory backend.
//!
//! Requests flow through three layers:
//!
//! - `Transport`: the raw request primitive (reqwest in production,
//!   scripted doubles in tests)
//! - `Gateway`: injects the bearer token and turns a 401 into a forced
//!   logout
//! - `InventoryClient`: typed endpoints for products, stock and statistics

pub mod client;
pub mod error;
pub mod gateway;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{InventoryClient, DEFAULT_LOW_STOCK_THRESHOLD};
pub use error::ApiError;
pub use gateway::{Gateway, RequestOptions};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
