//! Shared utility functions.
//!
//! - `html`: HTML escaping for safe rendering
//! - `format`: Human-readable formatting

mod format;
mod html;

pub use format::{format_size, truncate_chars};
pub use html::html_escape;
