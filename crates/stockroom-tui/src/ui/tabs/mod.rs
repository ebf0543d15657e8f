//! Route-specific content rendering.

pub mod placeholder;
pub mod products;
