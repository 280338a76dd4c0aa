//! Geometric types for element bounds and crop regions

use serde::{Deserialize, Serialize};

/// Rectangle in image pixel coordinates.
///
/// Edges are stored as drawn, so `right < left` is allowed. Line-like
/// elements use that to keep their direction: start is `(left, top)`,
/// end is `(right, bottom)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and a size
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Rectangle with the same area whose edges are ordered
    pub fn normalized(&self) -> Rect {
        Rect {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();
        let left = a.left.max(b.left);
        let top = a.top.max(b.top);
        let right = a.right.min(b.right);
        let bottom = a.bottom.min(b.bottom);
        if left < right && top < bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, x: i32, y: i32) -> Rect {
        Rect {
            left: self.left + x,
            top: self.top + y,
            right: self.right + x,
            bottom: self.bottom + y,
        }
    }

    /// Get the signed width of the rectangle
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Get the signed height of the rectangle
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Check if this rectangle contains a point
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        let r = self.normalized();
        x >= r.left && x < r.right && y >= r.top && y < r.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_handles_reversed_edges() {
        let drawn_backwards = Rect::new(50, 50, 10, 10);
        let clip = Rect::new(0, 0, 30, 30);
        assert_eq!(drawn_backwards.intersect(clip), Some(Rect::new(10, 10, 30, 30)));
        assert_eq!(Rect::new(0, 0, 5, 5).intersect(Rect::new(5, 5, 9, 9)), None);
    }

    #[test]
    fn test_translate_keeps_direction() {
        let line = Rect::new(40, 40, 10, 20).translate(-10, 5);
        assert_eq!(line, Rect::new(30, 45, 0, 25));
        assert_eq!(line.width(), -30);
    }

    #[test]
    fn test_contains_point() {
        let r = Rect::from_xywh(10, 10, 5, 5);
        assert!(r.contains_point(10, 14));
        assert!(!r.contains_point(15, 10));
    }
}
