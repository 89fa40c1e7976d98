//! Pure geometry for fitting line art into a viewport.
//!
//! All functions here are testable without any I/O or images.

use kurbo::{Rect, Size};

/// Letterboxed rectangle the line art occupies inside the viewport.
///
/// Aspect-fit: an image wider than the viewport (relative to aspect) fits to
/// width and centers vertically; otherwise it fits to height and centers
/// horizontally.
pub fn displayed_rect(image: Size, viewport: Size) -> Rect {
    let image_aspect = image.width / image.height;
    let viewport_aspect = viewport.width / viewport.height;

    if image_aspect > viewport_aspect {
        let width = viewport.width;
        let height = width / image_aspect;
        let y = (viewport.height - height) / 2.0;
        Rect::new(0.0, y, width, y + height)
    } else {
        let height = viewport.height;
        let width = height * image_aspect;
        let x = (viewport.width - width) / 2.0;
        Rect::new(x, 0.0, x + width, height)
    }
}

/// Scale factor mapping displayed points to native pixels.
///
/// The minimum of the per-axis factors preserves aspect and avoids cropping.
pub fn export_scale(image: Size, displayed: Rect) -> f64 {
    let scale_x = image.width / displayed.width();
    let scale_y = image.height / displayed.height();
    scale_x.min(scale_y)
}
