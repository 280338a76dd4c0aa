//! Drawable elements and their ordered collection
//!
//! This module provides:
//! - Element kinds and the static field registry per kind
//! - `DrawableContainer`, one vector element with its fields
//! - `DrawableContainerList`, the z-ordered element collection

pub mod drawable;
pub mod kind;
pub mod list;

pub use drawable::DrawableContainer;
pub use kind::{ContainerKind, FilterKind, filters_for};
pub use list::DrawableContainerList;
