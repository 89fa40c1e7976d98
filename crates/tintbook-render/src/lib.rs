//! Tintbook Render Library
//!
//! CPU composition of the canvas layer stack and flattened JPEG export for
//! sharing finished pages.

mod compose;
mod export;
mod raster;

pub use compose::{displayed_rect, export_scale};
pub use export::{
    AssetResolver, ExportError, ExportedImage, JPEG_QUALITY, encode_jpeg, export_named,
    export_page,
};
pub use raster::{blit_over, draw_stroke, multiply_blend, rasterize_ink, white_canvas};
