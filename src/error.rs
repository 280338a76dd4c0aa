//! Error types for the document model and file formats.
//!
//! Each subsystem has its own enum; surface and format errors wrap the
//! field errors they can run into.

use thiserror::Error;

use crate::domain::ContainerId;
use crate::fields::{FieldType, ValueKind};

/// Errors raised by field writes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Value variant does not match the field type's domain
    #[error("{field_type} expects a {expected} value, got {actual}")]
    DomainMismatch {
        field_type: FieldType,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// The holder does not expose this field type
    #[error("{0} is not supported by this element")]
    Unsupported(FieldType),
}

/// Undo/redo underflow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

/// Errors raised by surface operations.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("element {0} is not on this surface")]
    UnknownElement(ContainerId),

    #[error("element {0} is already on this surface")]
    DuplicateElement(ContainerId),

    #[error("crop rectangle does not overlap the image")]
    EmptyCrop,

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Errors raised while detecting, reading or writing a document file.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Neither a zip signature nor a legacy trailing marker was found
    #[error("not a Greenshot file")]
    NotAGreenshotFile,

    /// A length field points outside the stream
    #[error("file is truncated")]
    TruncatedFile,

    #[error("unknown container type '{0}'")]
    UnknownContainerType(String),

    #[error("unknown field value type '{0}'")]
    UnknownFieldVariant(String),

    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),

    #[error("invalid field value: {0}")]
    Field(#[from] FieldError),

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("image encoding error: {0}")]
    Png(#[from] png::EncodingError),
}

/// Errors raised when reading or writing the editor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration directory available")]
    NoConfigDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
