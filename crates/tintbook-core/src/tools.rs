//! Tool selection and per-tool stroke styling.

use crate::document::Color;
use serde::{Deserialize, Serialize};

/// Available drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Pencil,
    Marker,
    Crayon,
    Eraser,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Pencil,
        ToolKind::Marker,
        ToolKind::Crayon,
        ToolKind::Eraser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pencil => "Pencil",
            ToolKind::Marker => "Marker",
            ToolKind::Crayon => "Crayon",
            ToolKind::Eraser => "Eraser",
        }
    }
}

/// Brush size limits exposed to the toolbar slider.
pub const MIN_BRUSH_SIZE: f64 = 3.0;
pub const MAX_BRUSH_SIZE: f64 = 30.0;
pub const DEFAULT_BRUSH_SIZE: f64 = 10.0;

/// Marker ink alpha (~70% opacity).
const MARKER_ALPHA: u8 = 178;

/// Preset color swatches, in toolbar order.
pub const PALETTE: [Color; 14] = [
    Color::opaque(255, 59, 48),   // red
    Color::opaque(255, 149, 0),   // orange
    Color::opaque(255, 204, 0),   // yellow
    Color::opaque(52, 199, 89),   // green
    Color::opaque(0, 199, 190),   // mint
    Color::opaque(50, 173, 230),  // cyan
    Color::opaque(0, 122, 255),   // blue
    Color::opaque(88, 86, 214),   // indigo
    Color::opaque(175, 82, 222),  // purple
    Color::opaque(255, 45, 85),   // pink
    Color::opaque(162, 132, 94),  // brown
    Color::opaque(0, 0, 0),       // black
    Color::opaque(142, 142, 147), // gray
    Color::opaque(255, 255, 255), // white
];

/// Manages the current tool, color, and brush size.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Currently selected swatch color.
    pub color: Color,
    /// Base brush size; each tool derives its own effective width.
    brush_size: f64,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            color: PALETTE[0],
            brush_size: DEFAULT_BRUSH_SIZE,
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    /// Set the current color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Set the base brush size, clamped to the slider range.
    pub fn set_brush_size(&mut self, size: f64) {
        self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    /// Get the base brush size.
    pub fn brush_size(&self) -> f64 {
        self.brush_size
    }

    /// Effective (color, width) for a stroke drawn with the current tool.
    ///
    /// Marker draws semi-transparent at double width, crayon at 1.5x width,
    /// eraser at double width. The eraser color is never composited (the
    /// renderer punches alpha instead), white is just a sane placeholder.
    pub fn stroke_style(&self) -> (Color, f64) {
        match self.current_tool {
            ToolKind::Pencil => (self.color, self.brush_size),
            ToolKind::Marker => (self.color.with_alpha(MARKER_ALPHA), self.brush_size * 2.0),
            ToolKind::Crayon => (self.color, self.brush_size * 1.5),
            ToolKind::Eraser => (Color::white(), self.brush_size * 2.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool() {
        let tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Pencil);
        assert_eq!(tm.color, PALETTE[0]);
    }

    #[test]
    fn test_pencil_style_unmodified() {
        let tm = ToolManager::new();
        let (color, width) = tm.stroke_style();
        assert_eq!(color, PALETTE[0]);
        assert!((width - DEFAULT_BRUSH_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_marker_style() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Marker);
        let (color, width) = tm.stroke_style();
        assert_eq!(color.a, MARKER_ALPHA);
        assert!((width - DEFAULT_BRUSH_SIZE * 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_crayon_style() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Crayon);
        let (color, width) = tm.stroke_style();
        assert_eq!(color.a, 255);
        assert!((width - DEFAULT_BRUSH_SIZE * 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_eraser_style() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Eraser);
        let (_, width) = tm.stroke_style();
        assert!((width - DEFAULT_BRUSH_SIZE * 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_brush_size_clamped() {
        let mut tm = ToolManager::new();
        tm.set_brush_size(100.0);
        assert!((tm.brush_size() - MAX_BRUSH_SIZE).abs() < f64::EPSILON);
        tm.set_brush_size(0.5);
        assert!((tm.brush_size() - MIN_BRUSH_SIZE).abs() < f64::EPSILON);
    }
}
