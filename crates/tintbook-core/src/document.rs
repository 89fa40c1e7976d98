//! Stroke document: the drawing layer of a single page.

use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::opaque(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::opaque(255, 255, 255)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// A single committed stroke.
///
/// Strokes are immutable once created: edits to a drawing are expressed as
/// appends or whole-document replacement, never by mutating points in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Tool that produced the stroke (selects compositing in the renderer).
    pub tool: ToolKind,
    /// Stroke color, including any tool-derived alpha.
    pub color: Color,
    /// Stroke width in page points.
    pub width: f64,
    /// Path geometry in page coordinates.
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new(tool: ToolKind, color: Color, width: f64, points: Vec<Point>) -> Self {
        Self {
            tool,
            color,
            width,
            points,
        }
    }
}

/// Magic prefix + format version for the serialized drawing blob.
const BLOB_MAGIC: &[u8; 4] = b"TBD1";

/// An ordered sequence of strokes forming one page's drawing.
///
/// Insertion order is z-order is render order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeDocument {
    strokes: Vec<Stroke>,
}

impl StrokeDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from existing strokes.
    pub fn from_strokes(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    /// Strokes in z-order (back to front).
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Append a stroke on top of the existing ones.
    pub fn append(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Remove and return the most recently appended stroke.
    ///
    /// No-op returning `None` on an empty document.
    pub fn remove_last(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    /// Replace the entire stroke sequence.
    pub fn replace_all(&mut self, strokes: Vec<Stroke>) {
        self.strokes = strokes;
    }

    /// Check if the document has no strokes.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Get the number of strokes.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Whether the page shows any coloring progress.
    pub fn has_visible_content(&self) -> bool {
        !self.is_empty()
    }

    /// Serialize to the compact binary blob stored per page.
    ///
    /// Deterministic for a given stroke sequence.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = BLOB_MAGIC.to_vec();
        match bincode::serialize(&self.strokes) {
            Ok(payload) => bytes.extend(payload),
            Err(e) => log::error!("failed to encode drawing: {e}"),
        }
        bytes
    }

    /// Deserialize a drawing blob.
    ///
    /// Never fails: malformed input yields an empty document so that corrupt
    /// drawing data cannot block opening a page.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::new();
        }
        let Some(payload) = bytes.strip_prefix(BLOB_MAGIC) else {
            log::warn!("unrecognized drawing blob header, starting blank");
            return Self::new();
        };
        match bincode::deserialize(payload) {
            Ok(strokes) => Self { strokes },
            Err(e) => {
                log::warn!("malformed drawing blob ({e}), starting blank");
                Self::new()
            }
        }
    }
}
