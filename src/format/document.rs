use image::RgbaImage;

use crate::container::DrawableContainer;
use crate::domain::CaptureDetails;

/// Persistent state of a surface, detached from any history or
/// selection. Owned, so it can be saved from another thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub image: RgbaImage,
    /// Bottom to top
    pub elements: Vec<DrawableContainer>,
    pub capture: CaptureDetails,
    pub counter_start: i32,
}

impl Document {
    /// Document holding only a background
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            elements: Vec::new(),
            capture: CaptureDetails::default(),
            counter_start: 1,
        }
    }
}
