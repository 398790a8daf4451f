//! Value and label resolution.
//!
//! # Responsibility
//! - Format raw values through their field type for display.
//! - Resolve field labels/icons against an injected registry.
//! - Parse dates under the local wall-clock policy shared by all views.

pub mod dates;
pub mod display;
pub mod format;
pub mod labels;
