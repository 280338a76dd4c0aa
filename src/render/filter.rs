//! Raster filters applied inside filter element bounds

use image::{Rgba, RgbaImage};

use crate::container::{DrawableContainer, FilterKind};
use crate::domain::{Color, Rect};
use crate::fields::{FieldHolder, FieldType};

use super::geometry::pixel_range;

/// Apply one child filter of a highlight or obfuscate element
pub fn apply_filter(img: &mut RgbaImage, kind: FilterKind, filter: &DrawableContainer) {
    let rect = filter.bounds();
    match kind {
        FilterKind::Blur => blur(img, rect, filter.int_value(FieldType::BlurRadius)),
        FilterKind::Pixelize => pixelate(img, rect, filter.int_value(FieldType::PixelSize)),
        FilterKind::Highlight => {
            highlight(img, rect, filter.color_value(FieldType::HighlightColor))
        }
        FilterKind::Brightness => {
            brightness(img, rect, filter.f64_value(FieldType::Brightness))
        }
        FilterKind::Grayscale => grayscale(img, rect),
        FilterKind::Magnifier => magnify(img, rect, filter.int_value(FieldType::MagnificationFactor)),
    }
}

fn for_each_pixel(img: &mut RgbaImage, rect: Rect, mut f: impl FnMut(&mut Rgba<u8>)) {
    let Some((x0, y0, x1, y1)) = pixel_range(rect, img.width(), img.height()) else {
        return;
    };
    for py in y0..y1 {
        for px in x0..x1 {
            f(img.get_pixel_mut(px, py));
        }
    }
}

/// Replace blocks of `block_size` pixels with their average color
pub fn pixelate(img: &mut RgbaImage, rect: Rect, block_size: i32) {
    let Some((min_x, min_y, end_x, end_y)) = pixel_range(rect, img.width(), img.height()) else {
        return;
    };
    let block_size = block_size.max(1) as u32;
    let (max_x, max_y) = (end_x - 1, end_y - 1);

    let mut block_y = min_y;
    while block_y <= max_y {
        let block_end_y = (block_y + block_size - 1).min(max_y);

        let mut block_x = min_x;
        while block_x <= max_x {
            let block_end_x = (block_x + block_size - 1).min(max_x);

            let mut total = [0u64; 4];
            let mut pixel_count: u64 = 0;
            for py in block_y..=block_end_y {
                for px in block_x..=block_end_x {
                    let pixel = img.get_pixel(px, py);
                    for (sum, channel) in total.iter_mut().zip(pixel.0) {
                        *sum += channel as u64;
                    }
                    pixel_count += 1;
                }
            }

            if pixel_count > 0 {
                let avg_color = Rgba(total.map(|sum| (sum / pixel_count) as u8));
                for py in block_y..=block_end_y {
                    for px in block_x..=block_end_x {
                        img.put_pixel(px, py, avg_color);
                    }
                }
            }

            block_x += block_size;
        }
        block_y += block_size;
    }
}

/// Gaussian blur of the region, sampled from the region only
pub fn blur(img: &mut RgbaImage, rect: Rect, radius: i32) {
    if radius <= 0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = pixel_range(rect, img.width(), img.height()) else {
        return;
    };
    let region = image::imageops::crop_imm(img, x0, y0, x1 - x0, y1 - y0).to_image();
    let blurred = image::imageops::blur(&region, radius as f32);
    image::imageops::replace(img, &blurred, x0 as i64, y0 as i64);
}

/// Keep the darker of each channel and the marker color
pub fn highlight(img: &mut RgbaImage, rect: Rect, color: Color) {
    let [r, g, b, _] = color.to_rgba_u8();
    for_each_pixel(img, rect, |pixel| {
        pixel[0] = pixel[0].min(r);
        pixel[1] = pixel[1].min(g);
        pixel[2] = pixel[2].min(b);
    });
}

/// Scale color channels by `factor`
pub fn brightness(img: &mut RgbaImage, rect: Rect, factor: f64) {
    let factor = factor.max(0.0);
    for_each_pixel(img, rect, |pixel| {
        for channel in &mut pixel.0[..3] {
            *channel = (*channel as f64 * factor).round().min(255.0) as u8;
        }
    });
}

pub fn grayscale(img: &mut RgbaImage, rect: Rect) {
    for_each_pixel(img, rect, |pixel| {
        let [r, g, b, _] = pixel.0;
        let luma = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8;
        pixel[0] = luma;
        pixel[1] = luma;
        pixel[2] = luma;
    });
}

/// Nearest-neighbour zoom around the region's center
pub fn magnify(img: &mut RgbaImage, rect: Rect, factor: i32) {
    if factor <= 1 {
        return;
    }
    let Some((x0, y0, x1, y1)) = pixel_range(rect, img.width(), img.height()) else {
        return;
    };
    let source = image::imageops::crop_imm(img, x0, y0, x1 - x0, y1 - y0).to_image();
    let (w, h) = source.dimensions();
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let factor = factor as f32;
    for y in 0..h {
        for x in 0..w {
            let sx = (cx + (x as f32 + 0.5 - cx) / factor).floor() as u32;
            let sy = (cy + (y as f32 + 0.5 - cy) / factor).floor() as u32;
            let pixel = *source.get_pixel(sx.min(w - 1), sy.min(h - 1));
            img.put_pixel(x0 + x, y0 + y, pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(size: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_pixelate_averages_blocks() {
        let mut img = checkerboard(4);
        pixelate(&mut img, Rect::new(0, 0, 4, 4), 2);
        assert!(img.pixels().all(|p| p.0 == [127, 127, 127, 255]));
    }

    #[test]
    fn test_filters_stay_inside_bounds() {
        let mut img = checkerboard(8);
        grayscale(&mut img, Rect::new(0, 0, 2, 2));
        brightness(&mut img, Rect::new(4, 4, 8, 8), 0.5);
        assert_eq!(img.get_pixel(6, 6).0, [128, 128, 128, 255]);
        assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_highlight_takes_channel_minimum() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        highlight(&mut img, Rect::new(0, 0, 2, 2), Color::YELLOW);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 0, 255]);
    }

    #[test]
    fn test_magnify_keeps_center() {
        let mut img = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8 * 10, y as u8 * 10, 0, 255]));
        magnify(&mut img, Rect::new(0, 0, 4, 4), 2);
        assert_eq!(img.get_pixel(0, 0).0, [10, 10, 0, 255]);
        assert_eq!(img.get_pixel(3, 3).0, [20, 20, 0, 255]);
    }
}
