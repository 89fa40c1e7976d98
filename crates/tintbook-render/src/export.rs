//! Flattened export of a page for sharing.
//!
//! Composites the canvas layer stack at the line art's native resolution so
//! the shared image matches exactly what the user sees, letterboxing and all.

use crate::compose::{displayed_rect, export_scale};
use crate::raster::{blit_over, multiply_blend, rasterize_ink, white_canvas};
use image::RgbaImage;
use image::codecs::jpeg::JpegEncoder;
use kurbo::Size;
use thiserror::Error;
use tintbook_core::canvas::{BlendMode, LayerKind, layer_stack};
use tintbook_core::document::StrokeDocument;

/// JPEG quality for shared images.
pub const JPEG_QUALITY: u8 = 95;

/// Resolves a page's image name to its bundled line art.
///
/// Returning `None` is an expected state (the canvas shows "content
/// unavailable"), never an error.
pub trait AssetResolver {
    fn lookup_image(&self, name: &str) -> Option<RgbaImage>;
}

/// Errors from the encode step. Export falls back to an uncompressed image
/// instead of surfacing these.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JPEG encoding failed: {0}")]
    Encoding(String),
}

/// A flattened page ready for the platform share sheet.
pub enum ExportedImage {
    /// JPEG-encoded bytes.
    Jpeg(Vec<u8>),
    /// Uncompressed fallback when encoding fails.
    Raw(RgbaImage),
}

/// Encode a composited page as JPEG.
pub fn encode_jpeg(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    // The composite is opaque; drop the alpha channel for JPEG.
    let rgb = image::DynamicImage::ImageRgba8(image.clone()).into_rgb8();
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ExportError::Encoding(e.to_string()))?;
    Ok(bytes)
}

/// Flatten a page: white backing, ink drawn at the displayed rect and scale,
/// line art multiplied on top.
///
/// Returns `None` when the viewport is empty or the art has no pixels; the
/// share action is simply skipped, no error surfaces.
pub fn export_page(
    line_art: &RgbaImage,
    document: &StrokeDocument,
    viewport: Size,
) -> Option<ExportedImage> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    let (width, height) = line_art.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let native = Size::new(width as f64, height as f64);
    let displayed = displayed_rect(native, viewport);
    let scale = export_scale(native, displayed);

    let mut composite = RgbaImage::new(width, height);
    for layer in layer_stack() {
        match layer.kind {
            LayerKind::Backing => composite = white_canvas(width, height),
            LayerKind::Ink => {
                let ink = rasterize_ink(document, width, height, displayed, scale);
                blit_over(&mut composite, &ink);
            }
            LayerKind::LineArt => match layer.blend {
                BlendMode::Multiply => multiply_blend(&mut composite, line_art),
                BlendMode::Normal => blit_over(&mut composite, line_art),
            },
        }
    }

    match encode_jpeg(&composite) {
        Ok(bytes) => Some(ExportedImage::Jpeg(bytes)),
        Err(e) => {
            log::warn!("{e}, sharing uncompressed image");
            Some(ExportedImage::Raw(composite))
        }
    }
}

/// Resolve a page's line art by name and export it.
pub fn export_named(
    resolver: &dyn AssetResolver,
    image_name: &str,
    document: &StrokeDocument,
    viewport: Size,
) -> Option<ExportedImage> {
    let line_art = resolver.lookup_image(image_name)?;
    export_page(&line_art, document, viewport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use kurbo::Point;
    use std::collections::HashMap;
    use tintbook_core::document::{Color, Stroke};
    use tintbook_core::tools::ToolKind;

    fn line_art_16() -> RgbaImage {
        // White page with a black line down the middle column.
        let mut art = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255]));
        for y in 0..16 {
            art.put_pixel(8, y, Rgba([0, 0, 0, 255]));
        }
        art
    }

    fn red_dot_doc() -> StrokeDocument {
        let mut doc = StrokeDocument::new();
        doc.append(Stroke::new(
            ToolKind::Pencil,
            Color::opaque(255, 0, 0),
            4.0,
            vec![Point::new(4.0, 8.0)],
        ));
        doc
    }

    #[test]
    fn test_export_produces_jpeg() {
        let exported = export_page(&line_art_16(), &red_dot_doc(), Size::new(16.0, 16.0))
            .expect("export should succeed");
        match exported {
            ExportedImage::Jpeg(bytes) => {
                // JPEG start-of-image marker.
                assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
            }
            ExportedImage::Raw(_) => panic!("expected encoded output"),
        }
    }

    #[test]
    fn test_zero_viewport_is_skipped() {
        assert!(export_page(&line_art_16(), &red_dot_doc(), Size::new(0.0, 0.0)).is_none());
        assert!(export_page(&line_art_16(), &red_dot_doc(), Size::new(16.0, 0.0)).is_none());
    }

    #[test]
    fn test_empty_art_is_skipped() {
        let empty = RgbaImage::new(0, 0);
        assert!(export_page(&empty, &red_dot_doc(), Size::new(16.0, 16.0)).is_none());
    }

    #[test]
    fn test_composite_layers() {
        // Inspect the composite directly, below the encode step.
        let (width, height) = line_art_16().dimensions();
        let native = Size::new(width as f64, height as f64);
        let viewport = Size::new(16.0, 16.0);
        let displayed = displayed_rect(native, viewport);
        let scale = export_scale(native, displayed);

        let mut composite = white_canvas(width, height);
        let ink = rasterize_ink(&red_dot_doc(), width, height, displayed, scale);
        blit_over(&mut composite, &ink);
        multiply_blend(&mut composite, &line_art_16());

        // Ink shows through the white paper area.
        assert_eq!(*composite.get_pixel(4, 8), Rgba([255, 0, 0, 255]));
        // Line art's dark line occludes everything.
        assert_eq!(*composite.get_pixel(8, 0), Rgba([0, 0, 0, 255]));
        // Untouched paper stays white.
        assert_eq!(*composite.get_pixel(14, 2), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_named_export_resolves_assets() {
        struct MapResolver(HashMap<String, RgbaImage>);
        impl AssetResolver for MapResolver {
            fn lookup_image(&self, name: &str) -> Option<RgbaImage> {
                self.0.get(name).cloned()
            }
        }

        let resolver = MapResolver(HashMap::from([("Shapes_1".to_string(), line_art_16())]));
        let viewport = Size::new(16.0, 16.0);

        assert!(export_named(&resolver, "Shapes_1", &red_dot_doc(), viewport).is_some());
        assert!(export_named(&resolver, "Shapes_9", &red_dot_doc(), viewport).is_none());
    }
}
