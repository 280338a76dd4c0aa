//! Document files
//!
//! This module provides:
//! - Format detection (zip archive or legacy trailing marker)
//! - The current zip+JSON reader and writer
//! - The legacy read-only reader
//! - PNG encoding shared by saving and export

pub mod content;
pub mod document;
pub mod legacy;
pub mod v2;

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbaImage;

use crate::error::FormatError;

use content::{CONTENT_VERSION, ContainerJson, ContentJson};
pub use document::Document;

const ZIP_SIGNATURE: &[u8; 4] = b"PK\x03\x04";

/// On-disk format of a document file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Legacy,
    V2,
}

/// Cooperative cancellation for long reads and writes, checked between
/// archive entries
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), FormatError> {
        if self.is_cancelled() {
            Err(FormatError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Identify the format. The stream position is restored.
pub fn detect<R: Read + Seek>(r: &mut R) -> Result<FileFormat, FormatError> {
    let start = r.stream_position()?;
    let mut signature = [0u8; 4];
    let read = read_up_to(r, &mut signature)?;
    r.seek(SeekFrom::Start(start))?;
    if read == signature.len() && &signature == ZIP_SIGNATURE {
        return Ok(FileFormat::V2);
    }
    if legacy::has_marker(r)? {
        return Ok(FileFormat::Legacy);
    }
    Err(FormatError::NotAGreenshotFile)
}

fn read_up_to<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Read a document in any supported format
pub fn read_document<R: Read + Seek>(mut r: R, cancel: &CancelFlag) -> Result<Document, FormatError> {
    let document = match detect(&mut r)? {
        FileFormat::V2 => v2::read(r, cancel)?,
        FileFormat::Legacy => legacy::read(r, cancel)?,
    };
    log::info!(
        "Loaded document {}x{} with {} element(s)",
        document.image.width(),
        document.image.height(),
        document.elements.len()
    );
    Ok(document)
}

/// Write a document in the current format
pub fn write_document<W: Write + Seek>(
    document: &Document,
    w: W,
    cancel: &CancelFlag,
) -> Result<(), FormatError> {
    v2::write(document, w, cancel)
}

/// Encode an RGBA raster as PNG
pub fn write_png<W: Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

pub(crate) fn to_content(document: &Document) -> ContentJson {
    ContentJson {
        version: CONTENT_VERSION,
        counter_start: document.counter_start,
        capture: Some(document.capture.clone()),
        containers: document
            .elements
            .iter()
            .map(ContainerJson::from_container)
            .collect(),
    }
}

/// Build a document; any unknown name fails the whole document
pub(crate) fn from_content(image: RgbaImage, content: ContentJson) -> Result<Document, FormatError> {
    let elements = content
        .containers
        .into_iter()
        .map(ContainerJson::into_container)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Document {
        image,
        elements,
        capture: content.capture.unwrap_or_default(),
        counter_start: content.counter_start,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::container::{ContainerKind, DrawableContainer};
    use crate::domain::{Color, Rect};
    use crate::fields::{FieldHolder, FieldType, FieldValue};

    fn sample() -> Document {
        let mut image = RgbaImage::new(8, 6);
        image.put_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut arrow =
            DrawableContainer::with_default_fields(ContainerKind::Arrow, Rect::new(7, 5, 1, 1));
        arrow
            .set_field_value(FieldType::LineColor, FieldValue::Color(Color::BLACK))
            .unwrap();
        let text = DrawableContainer::with_default_fields(ContainerKind::Text, Rect::new(0, 0, 5, 3))
            .with_text("note");
        Document {
            image,
            elements: vec![arrow, text],
            capture: Default::default(),
            counter_start: 3,
        }
    }

    fn saved(document: &Document) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        write_document(document, &mut bytes, &CancelFlag::default()).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_save_then_load_is_identical() {
        let document = sample();
        let bytes = saved(&document);
        assert_eq!(&bytes[..4], ZIP_SIGNATURE);
        let loaded = read_document(Cursor::new(bytes), &CancelFlag::default()).unwrap();
        assert_eq!(loaded, document);
    }

    #[test]
    fn test_detection() {
        let mut zip = Cursor::new(saved(&sample()));
        assert_eq!(detect(&mut zip).unwrap(), FileFormat::V2);
        assert_eq!(zip.position(), 0);

        let mut garbage = Cursor::new(b"definitely not a document".to_vec());
        assert!(matches!(
            detect(&mut garbage),
            Err(FormatError::NotAGreenshotFile)
        ));
        let mut empty = Cursor::new(Vec::new());
        assert!(matches!(detect(&mut empty), Err(FormatError::NotAGreenshotFile)));
    }

    #[test]
    fn test_cancelled_save() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let result = write_document(&sample(), Cursor::new(Vec::new()), &cancel);
        assert!(matches!(result, Err(FormatError::Cancelled)));
    }

    #[test]
    fn test_archive_without_content_is_rejected() {
        let mut bytes = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut bytes);
            zip.start_file(v2::IMAGE_ENTRY, zip::write::SimpleFileOptions::default())
                .unwrap();
            write_png(&mut zip, &RgbaImage::new(2, 2)).unwrap();
            zip.finish().unwrap();
        }
        bytes.set_position(0);
        assert!(matches!(
            read_document(bytes, &CancelFlag::default()),
            Err(FormatError::NotAGreenshotFile)
        ));
    }
}
