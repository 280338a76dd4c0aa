//! Shared geometry calculations for element rendering

use crate::domain::Rect;

/// Arrow geometry constants
pub mod arrow {
    /// Smallest arrow head in pixels
    pub const HEAD_SIZE: f32 = 10.0;
    /// Head size growth per pixel of line thickness
    pub const HEAD_PER_THICKNESS: f32 = 3.0;
    /// Arrowhead angle from shaft in radians (35 degrees)
    pub const HEAD_ANGLE: f32 = 0.610_865_2; // 35.0_f32.to_radians()
    /// Minimum arrow length to get a head
    pub const MIN_LENGTH: f32 = 5.0;

    /// Head size for a line of the given thickness
    pub fn head_size(thickness: f32) -> f32 {
        HEAD_SIZE + thickness * HEAD_PER_THICKNESS
    }

    /// Calculate the two head line end points for a head at `tip`,
    /// pointing away from `tail`.
    /// Returns (head1_x, head1_y, head2_x, head2_y)
    pub fn head_points(
        tail: (f32, f32),
        tip: (f32, f32),
        head_size: f32,
    ) -> Option<(f32, f32, f32, f32)> {
        let dx = tip.0 - tail.0;
        let dy = tip.1 - tail.1;
        let length = (dx * dx + dy * dy).sqrt();
        if length < MIN_LENGTH {
            return None;
        }

        // Unit direction vector (pointing from tail to tip)
        let nx = dx / length;
        let ny = dy / length;

        let cos_a = HEAD_ANGLE.cos();
        let sin_a = HEAD_ANGLE.sin();

        // First head line (rotated clockwise from arrow direction)
        let head1_dx = -nx * cos_a + ny * sin_a;
        let head1_dy = -nx * sin_a - ny * cos_a;

        // Second head line (rotated counter-clockwise)
        let head2_dx = -nx * cos_a - ny * sin_a;
        let head2_dy = nx * sin_a - ny * cos_a;

        Some((
            tip.0 + head1_dx * head_size,
            tip.1 + head1_dy * head_size,
            tip.0 + head2_dx * head_size,
            tip.1 + head2_dy * head_size,
        ))
    }
}

/// Shape geometry constants
pub mod shape {
    /// Extra width of the shadow stroke on each side, in pixels
    pub const SHADOW_OUTLINE: f32 = 2.0;
    /// Shadow color alpha
    pub const SHADOW_ALPHA: u8 = 220;

    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Normalized float edges of a rectangle: (min_x, min_y, max_x, max_y)
#[inline]
pub fn normalize_rect(rect: Rect) -> (f32, f32, f32, f32) {
    let r = rect.normalized();
    (r.left as f32, r.top as f32, r.right as f32, r.bottom as f32)
}

/// Calculate ellipse center and radii from bounding box
#[inline]
pub fn ellipse_from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (f32, f32, f32, f32) {
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    let rx = ((max_x - min_x) * 0.5).max(1.0);
    let ry = ((max_y - min_y) * 0.5).max(1.0);
    (cx, cy, rx, ry)
}

/// Pixel range `(x0, y0, x1, y1)`, end-exclusive, of `rect` inside an
/// image of the given size
pub fn pixel_range(rect: Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let image = Rect::new(0, 0, width as i32, height as i32);
    let clip = rect.intersect(image)?;
    Some((
        clip.left as u32,
        clip.top as u32,
        clip.right as u32,
        clip.bottom as u32,
    ))
}
