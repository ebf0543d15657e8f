//! Utility functions for display formatting.

pub mod format;

pub use format::{format_price, format_refreshed, truncate_string};
