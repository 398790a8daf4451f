//! Canonical data model shared by the parser and every view transformer.
//!
//! # Responsibility
//! - Define block, item and schema shapes in one place.
//! - Keep stored values opaque until a field type interprets them.
//!
//! # Invariants
//! - Derived view structures copy ids out of a block; nothing holds a
//!   reference back into it.

pub mod block;
pub mod schema;
pub mod value;
