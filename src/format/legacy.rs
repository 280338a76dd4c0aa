//! Read-only support for the legacy single-stream format.
//!
//! Layout: `[image bytes][content blob][blob length: u64 LE][marker]`,
//! where the marker is 14 ASCII bytes starting with `Greenshot`, e.g.
//! `Greenshot01.02`. The reader works backwards from the end of the
//! stream.

use std::io::{Read, Seek, SeekFrom};

use crate::error::FormatError;

use super::content::ContentJson;
use super::{CancelFlag, Document};

pub const MARKER_LEN: u64 = 14;
pub const MARKER_PREFIX: &[u8] = b"Greenshot";
const LENGTH_LEN: u64 = 8;

/// Whether the stream ends in a legacy marker. The position is restored.
pub fn has_marker<R: Read + Seek>(r: &mut R) -> Result<bool, FormatError> {
    let start = r.stream_position()?;
    let marker = read_marker(r);
    r.seek(SeekFrom::Start(start))?;
    match marker {
        Ok(_) => Ok(true),
        Err(FormatError::NotAGreenshotFile) => Ok(false),
        Err(err) => Err(err),
    }
}

fn read_marker<R: Read + Seek>(r: &mut R) -> Result<[u8; MARKER_LEN as usize], FormatError> {
    let len = r.seek(SeekFrom::End(0))?;
    if len < MARKER_LEN {
        return Err(FormatError::NotAGreenshotFile);
    }
    r.seek(SeekFrom::Start(len - MARKER_LEN))?;
    let mut marker = [0u8; MARKER_LEN as usize];
    r.read_exact(&mut marker)?;
    if !marker.starts_with(MARKER_PREFIX) {
        return Err(FormatError::NotAGreenshotFile);
    }
    Ok(marker)
}

pub fn read<R: Read + Seek>(mut r: R, cancel: &CancelFlag) -> Result<Document, FormatError> {
    let marker = read_marker(&mut r)?;
    log::debug!(
        "Legacy file version {}",
        String::from_utf8_lossy(&marker[MARKER_PREFIX.len()..])
    );

    let len = r.seek(SeekFrom::End(0))?;
    let trailer = MARKER_LEN + LENGTH_LEN;
    if len < trailer {
        return Err(FormatError::TruncatedFile);
    }
    r.seek(SeekFrom::Start(len - trailer))?;
    let mut length = [0u8; LENGTH_LEN as usize];
    r.read_exact(&mut length)?;
    let blob_len = u64::from_le_bytes(length);
    let blob_start = (len - trailer)
        .checked_sub(blob_len)
        .ok_or(FormatError::TruncatedFile)?;

    cancel.check()?;
    r.seek(SeekFrom::Start(0))?;
    let mut image_bytes = vec![0u8; to_usize(blob_start)?];
    r.read_exact(&mut image_bytes)?;
    let image = image::load_from_memory(&image_bytes)?.to_rgba8();

    cancel.check()?;
    let mut blob = vec![0u8; to_usize(blob_len)?];
    r.read_exact(&mut blob)?;
    if blob.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new(image));
    }
    let content: ContentJson = serde_json::from_slice(&blob)?;
    super::from_content(image, content)
}

fn to_usize(len: u64) -> Result<usize, FormatError> {
    usize::try_from(len).map_err(|_| FormatError::TruncatedFile)
}
