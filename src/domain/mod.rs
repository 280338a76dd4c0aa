//! Pure domain types with minimal dependencies
//!
//! This module contains core types used throughout the crate.
//! Types here should not depend on the document model itself
//! to avoid circular dependencies.

pub mod capture;
pub mod color;
pub mod geometry;
pub mod ids;

pub use capture::*;
pub use color::*;
pub use geometry::*;
pub use ids::*;
