//! Current format: a zip archive with `image.png` and `content.json`

use std::io::{BufReader, Read, Seek, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::FormatError;

use super::content::ContentJson;
use super::{CancelFlag, Document, write_png};

pub const IMAGE_ENTRY: &str = "image.png";
pub const CONTENT_ENTRY: &str = "content.json";

pub fn write<W: Write + Seek>(
    document: &Document,
    w: W,
    cancel: &CancelFlag,
) -> Result<(), FormatError> {
    let content = super::to_content(document);
    let mut zip = ZipWriter::new(w);
    // PNG data is already compressed
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    cancel.check()?;
    zip.start_file(IMAGE_ENTRY, stored)?;
    write_png(&mut zip, &document.image)?;

    cancel.check()?;
    zip.start_file(CONTENT_ENTRY, deflated)?;
    serde_json::to_writer_pretty(&mut zip, &content)?;

    cancel.check()?;
    zip.finish()?;
    log::debug!(
        "Wrote archive with {} element(s)",
        document.elements.len()
    );
    Ok(())
}

pub fn read<R: Read + Seek>(r: R, cancel: &CancelFlag) -> Result<Document, FormatError> {
    let mut archive = ZipArchive::new(r)?;

    cancel.check()?;
    let image = {
        let entry = archive.by_name(IMAGE_ENTRY).map_err(missing_entry)?;
        let mut bytes = Vec::new();
        BufReader::new(entry).read_to_end(&mut bytes)?;
        image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)?.to_rgba8()
    };

    cancel.check()?;
    let content: ContentJson = {
        let entry = archive.by_name(CONTENT_ENTRY).map_err(missing_entry)?;
        serde_json::from_reader(BufReader::new(entry))?
    };
    if content.version > super::content::CONTENT_VERSION {
        log::warn!(
            "Content version {} is newer than {}, reading what is known",
            content.version,
            super::content::CONTENT_VERSION
        );
    }

    cancel.check()?;
    super::from_content(image, content)
}

fn missing_entry(err: ZipError) -> FormatError {
    match err {
        ZipError::FileNotFound => FormatError::NotAGreenshotFile,
        other => FormatError::Zip(other),
    }
}
