//! CPU rasterization of stroke documents.
//!
//! Strokes are stamped as round brush discs along each segment. Eraser
//! strokes punch alpha out of the ink layer (dest-out) instead of painting,
//! so they erase earlier ink without touching the backing or line art.

use image::{Rgba, RgbaImage};
use kurbo::{Point, Rect};
use tintbook_core::document::{Color, Stroke, StrokeDocument};
use tintbook_core::tools::ToolKind;

/// Spacing between brush stamps, as a fraction of the brush radius.
const STAMP_SPACING: f64 = 0.5;

/// Opaque white backing layer.
pub fn white_canvas(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}

/// Rasterize a document's ink layer at native resolution.
///
/// Page points map into pixels through the displayed rect and scale: the
/// drawing is cropped to the letterboxed art area and blown up to native
/// size, matching what the user saw on screen.
pub fn rasterize_ink(
    document: &StrokeDocument,
    width: u32,
    height: u32,
    displayed: Rect,
    scale: f64,
) -> RgbaImage {
    let mut ink = RgbaImage::new(width, height);
    for stroke in document.strokes() {
        draw_stroke(&mut ink, stroke, displayed, scale);
    }
    ink
}

/// Draw a single stroke into the ink layer.
pub fn draw_stroke(ink: &mut RgbaImage, stroke: &Stroke, displayed: Rect, scale: f64) {
    if stroke.points.is_empty() {
        return;
    }

    let radius = (stroke.width * scale / 2.0).max(0.5);
    let to_px =
        |p: Point| Point::new((p.x - displayed.x0) * scale, (p.y - displayed.y0) * scale);

    if stroke.points.len() == 1 {
        stamp(ink, to_px(stroke.points[0]), radius, stroke);
        return;
    }

    for window in stroke.points.windows(2) {
        let start = to_px(window[0]);
        let end = to_px(window[1]);
        let step = (radius * STAMP_SPACING).max(0.5);
        let count = (start.distance(end) / step).ceil() as usize;
        for i in 0..=count {
            let t = if count == 0 { 0.0 } else { i as f64 / count as f64 };
            stamp(ink, start.lerp(end, t), radius, stroke);
        }
    }
}

fn stamp(ink: &mut RgbaImage, center: Point, radius: f64, stroke: &Stroke) {
    let (width, height) = ink.dimensions();
    let x0 = ((center.x - radius).floor() as i64).max(0);
    let x1 = ((center.x + radius).ceil() as i64).min(width as i64 - 1);
    let y0 = ((center.y - radius).floor() as i64).max(0);
    let y1 = ((center.y + radius).ceil() as i64).min(height as i64 - 1);

    let erase = stroke.tool == ToolKind::Eraser;
    let r_sq = radius * radius;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            if dx * dx + dy * dy > r_sq {
                continue;
            }
            let pixel = ink.get_pixel_mut(x as u32, y as u32);
            if erase {
                *pixel = Rgba([0, 0, 0, 0]);
            } else {
                src_over(pixel, stroke.color);
            }
        }
    }
}

/// Standard source-over alpha compositing of one color onto a pixel.
fn src_over(dst: &mut Rgba<u8>, color: Color) {
    let sa = color.a as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let blend = |sc: u8, dc: u8| -> u8 {
        let sc = sc as f32;
        let dc = dc as f32;
        ((sc * sa + dc * da * (1.0 - sa)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    *dst = Rgba([
        blend(color.r, dst[0]),
        blend(color.g, dst[1]),
        blend(color.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

/// Source-over blit of a whole layer onto a base of the same size.
pub fn blit_over(base: &mut RgbaImage, layer: &RgbaImage) {
    debug_assert_eq!(base.dimensions(), layer.dimensions());
    for (dst, src) in base.pixels_mut().zip(layer.pixels()) {
        src_over(dst, Color::new(src[0], src[1], src[2], src[3]));
    }
}

/// Multiply-blend an overlay onto a base of the same size.
///
/// White overlay pixels leave the base untouched; dark pixels darken it.
/// This is what puts the line art's dark lines over the ink while letting
/// the coloring show through the white paper areas.
pub fn multiply_blend(base: &mut RgbaImage, overlay: &RgbaImage) {
    debug_assert_eq!(base.dimensions(), overlay.dimensions());
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        let oa = src[3] as f32 / 255.0;
        for c in 0..3 {
            let bc = dst[c] as f32;
            let oc = src[c] as f32;
            let multiplied = bc * oc / 255.0;
            dst[c] = (bc * (1.0 - oa) + multiplied * oa)
                .round()
                .clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: Rect = Rect::new(0.0, 0.0, 16.0, 16.0);

    fn dot(x: f64, y: f64, width: f64, tool: ToolKind, color: Color) -> Stroke {
        Stroke::new(tool, color, width, vec![Point::new(x, y)])
    }

    #[test]
    fn test_white_canvas() {
        let canvas = white_canvas(4, 4);
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_dot_paints_center_not_corner() {
        let mut doc = StrokeDocument::new();
        doc.append(dot(8.0, 8.0, 6.0, ToolKind::Pencil, Color::black()));
        let ink = rasterize_ink(&doc, 16, 16, FULL, 1.0);

        assert_eq!(ink.get_pixel(8, 8)[3], 255);
        assert_eq!(ink.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_segment_covers_midpoint() {
        let stroke = Stroke::new(
            ToolKind::Pencil,
            Color::black(),
            4.0,
            vec![Point::new(2.0, 8.0), Point::new(14.0, 8.0)],
        );
        let mut ink = RgbaImage::new(16, 16);
        draw_stroke(&mut ink, &stroke, FULL, 1.0);

        assert_eq!(ink.get_pixel(8, 8)[3], 255);
        assert_eq!(ink.get_pixel(8, 1)[3], 0);
    }

    #[test]
    fn test_displayed_rect_offset_maps_into_pixels() {
        // Art letterboxed at y=4 in a 16x16 view, doubled to 32px native.
        let displayed = Rect::new(0.0, 4.0, 16.0, 12.0);
        let stroke = dot(8.0, 8.0, 2.0, ToolKind::Pencil, Color::black());
        let mut ink = RgbaImage::new(32, 16);
        draw_stroke(&mut ink, &stroke, displayed, 2.0);

        // Page (8, 8) -> pixel ((8-0)*2, (8-4)*2) = (16, 8).
        assert_eq!(ink.get_pixel(16, 8)[3], 255);
        assert_eq!(ink.get_pixel(8, 14)[3], 0);
    }

    #[test]
    fn test_out_of_bounds_stroke_is_clipped() {
        let mut doc = StrokeDocument::new();
        doc.append(dot(-50.0, -50.0, 8.0, ToolKind::Pencil, Color::black()));
        let ink = rasterize_ink(&doc, 16, 16, FULL, 1.0);
        assert!(ink.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_eraser_punches_ink() {
        let mut doc = StrokeDocument::new();
        doc.append(dot(8.0, 8.0, 8.0, ToolKind::Pencil, Color::black()));
        doc.append(dot(8.0, 8.0, 4.0, ToolKind::Eraser, Color::white()));
        let ink = rasterize_ink(&doc, 16, 16, FULL, 1.0);

        // Erased in the middle, ink remains at the brush fringe.
        assert_eq!(ink.get_pixel(8, 8)[3], 0);
        assert_eq!(ink.get_pixel(8, 11)[3], 255);
    }

    #[test]
    fn test_marker_ink_is_translucent() {
        let mut ink = RgbaImage::new(16, 16);
        let stroke = dot(8.0, 8.0, 4.0, ToolKind::Marker, Color::opaque(255, 0, 0).with_alpha(178));
        stamp(&mut ink, Point::new(8.0, 8.0), 2.0, &stroke);

        let px = ink.get_pixel(8, 8);
        assert_eq!(px[3], 178);
    }

    #[test]
    fn test_multiply_white_is_transparent() {
        let mut base = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        multiply_blend(&mut base, &overlay);
        assert_eq!(*base.get_pixel(0, 0), Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_multiply_black_occludes() {
        let mut base = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        multiply_blend(&mut base, &overlay);
        assert_eq!(*base.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_blit_over_respects_alpha() {
        let mut base = white_canvas(2, 2);
        let mut layer = RgbaImage::new(2, 2);
        layer.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        blit_over(&mut base, &layer);

        assert_eq!(*base.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*base.get_pixel(1, 1), Rgba([255, 255, 255, 255]));
    }
}
