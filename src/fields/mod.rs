//! Typed element properties
//!
//! This module provides:
//! - Field types and their value domains
//! - Scoped fields with change notification
//! - The last-used value cache consulted when fields are created
//! - The field holder capability and the selection aggregator

pub mod aggregator;
pub mod cache;
pub mod field;
pub mod holder;
pub mod value;

pub use aggregator::FieldAggregator;
pub use cache::FieldCache;
pub use field::{Field, FieldChanged, Scope};
pub use holder::{FieldHolder, FieldHolderStore};
pub use value::*;
