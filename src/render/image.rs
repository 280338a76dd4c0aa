//! Element rendering using tiny-skia
//!
//! These functions draw vector elements onto an RgbaImage for export.

use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

use super::geometry::{self, arrow, shape};
use crate::container::{ContainerKind, DrawableContainer};
use crate::domain::{Color, Rect};
use crate::fields::{ArrowHeads, FieldHolder, FieldType};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back.
///
/// RgbaImage holds straight alpha while Pixmap works premultiplied.
pub(super) fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let Some(mut pixmap) = Pixmap::new(img.width(), img.height()) else {
        return;
    };
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    f(&mut pixmap);

    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        dst.0 = [color.red(), color.green(), color.blue(), color.alpha()];
    }
}

fn paint(color: Color) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Stroke a path, with a darker, wider stroke underneath when `shadow`
fn stroke_with_shadow(pixmap: &mut Pixmap, path: &Path, color: Color, thickness: f32, shadow: bool) {
    if shadow {
        let shadow_color = Color::argb(shape::SHADOW_ALPHA, 0, 0, 0);
        let width = thickness + shape::SHADOW_OUTLINE * 2.0;
        pixmap.stroke_path(
            path,
            &paint(shadow_color),
            &round_stroke(width),
            Transform::identity(),
            None,
        );
    }
    pixmap.stroke_path(
        path,
        &paint(color),
        &round_stroke(thickness),
        Transform::identity(),
        None,
    );
}

fn fill(pixmap: &mut Pixmap, path: &Path, color: Color) {
    if color.is_transparent() {
        return;
    }
    pixmap.fill_path(path, &paint(color), FillRule::Winding, Transform::identity(), None);
}

fn build_rect_path(rect: Rect) -> Option<Path> {
    let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(rect);
    tiny_skia::Rect::from_ltrb(min_x, min_y, max_x, max_y).map(PathBuilder::from_rect)
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(rect: Rect) -> Option<Path> {
    let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(rect);
    let (cx, cy, rx, ry) = geometry::ellipse_from_bounds(min_x, min_y, max_x, max_y);
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - ry);

    // Top to right
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);

    // Right to bottom
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);

    // Bottom to left
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);

    // Left to top
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

/// Build a line path with optional head lines at either end
fn build_arrow_path(rect: Rect, heads: ArrowHeads, head_size: f32) -> Option<Path> {
    let start = (rect.left as f32, rect.top as f32);
    let end = (rect.right as f32, rect.bottom as f32);

    let mut pb = PathBuilder::new();

    // Shaft line from start to end
    pb.move_to(start.0, start.1);
    pb.line_to(end.0, end.1);

    let mut add_head = |tail: (f32, f32), tip: (f32, f32)| {
        if let Some((head1_x, head1_y, head2_x, head2_y)) =
            arrow::head_points(tail, tip, head_size)
        {
            pb.move_to(tip.0, tip.1);
            pb.line_to(head1_x, head1_y);
            pb.move_to(tip.0, tip.1);
            pb.line_to(head2_x, head2_y);
        }
    };
    if heads.at_end() {
        add_head(start, end);
    }
    if heads.at_start() {
        add_head(end, start);
    }

    pb.finish()
}

/// Draw one vector element. Filter elements are handled by the caller;
/// only their border is drawn here.
pub fn draw_element(pixmap: &mut Pixmap, element: &DrawableContainer) {
    let bounds = element.bounds();
    let thickness = element.int_value(FieldType::LineThickness).max(0) as f32;
    let line_color = element.color_value(FieldType::LineColor);
    let shadow = element.bool_value(FieldType::Shadow);

    match element.kind() {
        ContainerKind::Rectangle | ContainerKind::Text | ContainerKind::Highlight
        | ContainerKind::Obfuscate => {
            let Some(path) = build_rect_path(bounds) else {
                return;
            };
            if element.has_field(FieldType::FillColor) {
                fill(pixmap, &path, element.color_value(FieldType::FillColor));
            }
            if thickness > 0.0 {
                stroke_with_shadow(pixmap, &path, line_color, thickness, shadow);
            }
        }
        ContainerKind::Ellipse => {
            let Some(path) = build_ellipse_path(bounds) else {
                return;
            };
            fill(pixmap, &path, element.color_value(FieldType::FillColor));
            if thickness > 0.0 {
                stroke_with_shadow(pixmap, &path, line_color, thickness, shadow);
            }
        }
        ContainerKind::Line | ContainerKind::Arrow => {
            if thickness <= 0.0 {
                return;
            }
            let heads = if element.kind() == ContainerKind::Arrow {
                element
                    .value_or_default(FieldType::Arrowheads)
                    .as_arrow_heads()
                    .unwrap_or(ArrowHeads::EndPoint)
            } else {
                ArrowHeads::None
            };
            if let Some(path) = build_arrow_path(bounds, heads, arrow::head_size(thickness)) {
                stroke_with_shadow(pixmap, &path, line_color, thickness, shadow);
            }
        }
        ContainerKind::StepLabel => {
            if let Some(path) = build_ellipse_path(bounds) {
                fill(pixmap, &path, element.color_value(FieldType::FillColor));
            }
        }
        ContainerKind::Filter(_) => {}
    }
}
