//! Export rendering
//!
//! This module contains:
//! - Geometry calculations shared by the drawing code
//! - Vector element drawing using tiny-skia
//! - Raster filters for highlight and obfuscate elements
//!
//! Text glyphs are not rasterized; text elements export their box only.

pub mod filter;
pub mod geometry;
pub mod image;

use ::image::RgbaImage;

use crate::container::{ContainerKind, DrawableContainer};

/// Draw `elements` bottom to top onto a copy of `background`
pub fn flatten<'a>(
    background: &RgbaImage,
    elements: impl IntoIterator<Item = &'a DrawableContainer>,
) -> RgbaImage {
    let mut img = background.clone();
    for element in elements {
        if element.kind().is_filter() {
            for child in element.children() {
                if let ContainerKind::Filter(kind) = child.kind() {
                    filter::apply_filter(&mut img, kind, child);
                }
            }
        }
        image::with_pixmap(&mut img, |pixmap| image::draw_element(pixmap, element));
    }
    img
}
