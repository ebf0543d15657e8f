//! Data models for the inventory REST API.
//!
//! - `Product`, `NewProduct`, `ProductUpdate`: product records and edits
//! - `StockAdjustment`, `StockDirection`: stock-in / stock-out requests
//! - `Statistics`: inventory summary snapshot
//! - Auth wire types: `LoginRequest`, `LoginResponse`, `VerifyResponse`
//! - `MessageResponse`: the `{success, message}` envelope used by commands

pub mod auth;
pub mod product;

pub use auth::{LoginRequest, LoginResponse, MessageResponse, VerifyResponse};
pub use product::{NewProduct, Product, ProductUpdate, Statistics, StockAdjustment, StockDirection};
