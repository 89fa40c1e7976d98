//! Camera module for pan/zoom transforms over a page.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Fit-to-view zoom level. The page content is laid out at viewport size, so
/// 1.0 shows the whole page.
pub const MIN_ZOOM: f64 = 1.0;
/// Maximum pinch zoom.
pub const MAX_ZOOM: f64 = 5.0;
/// Zoom level applied by a double tap from the fitted view.
pub const TAP_ZOOM: f64 = 3.0;

/// Camera manages the view transform for the canvas.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between screen coordinates and page coordinates. Page
/// coordinates coincide with screen coordinates at fit zoom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan).
    pub offset: Vec2,
    /// Current zoom level (1.0 = fit to view).
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: MIN_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera at the fitted view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts page coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to page coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to page coordinates.
    pub fn screen_to_page(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a page point to screen coordinates.
    pub fn page_to_screen(&self, page_point: Point) -> Point {
        self.transform() * page_point
    }

    /// Pan the camera by a delta in screen coordinates.
    ///
    /// The page is kept covering the viewport (no over-scroll past an edge).
    pub fn pan(&mut self, delta: Vec2, viewport: Size) {
        self.offset += delta;
        self.clamp_offset(viewport);
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64, viewport: Size) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        // Convert screen point to page before zoom
        let page_point = self.screen_to_page(screen_point);

        // Apply new zoom
        self.zoom = new_zoom;

        // Adjust offset so page_point stays at screen_point
        let new_screen = self.page_to_screen(page_point);
        let correction = Vec2::new(
            screen_point.x - new_screen.x,
            screen_point.y - new_screen.y,
        );
        self.offset += correction;
        self.clamp_offset(viewport);
    }

    /// Double-tap behavior: toggle between the fitted view and a fixed zoom
    /// centered on the tap point.
    pub fn toggle_tap_zoom(&mut self, tap: Point, viewport: Size) {
        if self.zoom > MIN_ZOOM {
            self.reset();
            return;
        }

        let page_point = self.screen_to_page(tap);
        self.zoom = TAP_ZOOM;
        self.offset = Vec2::new(
            viewport.width / 2.0 - page_point.x * self.zoom,
            viewport.height / 2.0 - page_point.y * self.zoom,
        );
        self.clamp_offset(viewport);
    }

    /// Reset camera to the fitted view.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = MIN_ZOOM;
    }

    /// Keep the scaled page covering the viewport. Since zoom >= 1, the page
    /// is never smaller than the view, so the offset stays in [view - page, 0].
    fn clamp_offset(&mut self, viewport: Size) {
        let min_x = viewport.width - viewport.width * self.zoom;
        let min_y = viewport.height - viewport.height * self.zoom;
        self.offset.x = self.offset.x.clamp(min_x, 0.0);
        self.offset.y = self.offset.y.clamp(min_y, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Size = Size::new(500.0, 500.0);

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_page_identity() {
        let camera = Camera::new();
        let screen = Point::new(100.0, 200.0);
        let page = camera.screen_to_page(screen);
        assert!((page.x - screen.x).abs() < f64::EPSILON);
        assert!((page.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.zoom = 2.5;
        camera.offset = Vec2::new(-120.0, -80.0);

        let original = Point::new(123.0, 456.0);
        let page = camera.screen_to_page(original);
        let back = camera.page_to_screen(page);

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001, VIEW); // Try to zoom way out
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);

        camera.zoom_at(Point::ZERO, 1000.0, VIEW); // Try to zoom way in
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_keeps_focal_point() {
        let mut camera = Camera::new();
        let focus = Point::new(250.0, 250.0);
        let page_before = camera.screen_to_page(focus);

        camera.zoom_at(focus, 2.0, VIEW);

        let page_after = camera.screen_to_page(focus);
        assert!((page_after.x - page_before.x).abs() < 1e-9);
        assert!((page_after.y - page_before.y).abs() < 1e-9);
    }

    #[test]
    fn test_pan_clamped_to_page_edges() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::new(250.0, 250.0), 2.0, VIEW);

        // Way past the top-left corner
        camera.pan(Vec2::new(10_000.0, 10_000.0), VIEW);
        assert!((camera.offset.x).abs() < f64::EPSILON);
        assert!((camera.offset.y).abs() < f64::EPSILON);

        // Way past the bottom-right corner
        camera.pan(Vec2::new(-10_000.0, -10_000.0), VIEW);
        assert!((camera.offset.x - (VIEW.width - VIEW.width * camera.zoom)).abs() < 1e-9);
    }

    #[test]
    fn test_pan_noop_at_fit() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(40.0, -25.0), VIEW);
        assert_eq!(camera.offset, Vec2::ZERO);
    }

    #[test]
    fn test_double_tap_zooms_in_centered() {
        let mut camera = Camera::new();
        let tap = Point::new(250.0, 250.0);
        camera.toggle_tap_zoom(tap, VIEW);

        assert!((camera.zoom - TAP_ZOOM).abs() < f64::EPSILON);
        // The tapped page point is now at the viewport center.
        let center = camera.page_to_screen(tap);
        assert!((center.x - 250.0).abs() < 1e-9);
        assert!((center.y - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_double_tap_toggles_back_to_fit() {
        let mut camera = Camera::new();
        camera.toggle_tap_zoom(Point::new(100.0, 100.0), VIEW);
        assert!(camera.zoom > MIN_ZOOM);

        camera.toggle_tap_zoom(Point::new(400.0, 400.0), VIEW);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);
        assert_eq!(camera.offset, Vec2::ZERO);
    }
}
