//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering and layout
//! - `dialogs`: Overlays (login, forms, reports, confirmations)
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `tabs`: Route-specific content rendering

pub mod dialogs;
pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
