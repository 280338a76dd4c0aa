//! Capture metadata handed over by the capture backend

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Metadata that comes with a captured raster
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureDetails {
    /// Window or screen title at capture time
    #[serde(default)]
    pub title: String,
    pub taken_at: DateTime<Local>,
    /// Region of the raster to keep, applied when the surface is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Rect>,
}

impl CaptureDetails {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            taken_at: Local::now(),
            crop: None,
        }
    }

    /// Default file name for saving, e.g. `Screenshot_2024-05-01_10-00-00`
    pub fn file_stem(&self) -> String {
        self.taken_at
            .format("Screenshot_%Y-%m-%d_%H-%M-%S")
            .to_string()
    }
}

impl Default for CaptureDetails {
    fn default() -> Self {
        Self::new(String::new())
    }
}
