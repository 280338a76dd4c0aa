//! Annotation document core: a captured image with vector elements on
//! top, typed element properties, undo/redo and the document file format.

pub mod config;
pub mod container;
pub mod domain;
pub mod error;
pub mod fields;
pub mod format;
pub mod memento;
pub mod render;
pub mod surface;

pub use config::EditorConfig;
pub use container::{ContainerKind, DrawableContainer, DrawableContainerList, FilterKind};
pub use domain::{CaptureDetails, Color, ContainerId, Rect, SurfaceId};
pub use error::{ConfigError, FieldError, FormatError, HistoryError, SurfaceError};
pub use fields::{Field, FieldAggregator, FieldCache, FieldHolder, FieldType, FieldValue};
pub use format::{CancelFlag, Document};
pub use surface::{Surface, SurfaceEvent};
