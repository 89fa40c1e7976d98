//! Canvas controller: one page's drawing surface.
//!
//! Owns the stroke document, camera, and tool state for the page being
//! colored, and routes touches into strokes or navigation. All state here is
//! confined to the UI thread; persistence happens downstream of the events
//! this controller emits.

use crate::camera::Camera;
use crate::document::{Color, Stroke, StrokeDocument};
use crate::gesture::{GestureAction, GestureRouter, Touch, TouchPhase};
use crate::tools::{ToolKind, ToolManager};
use kurbo::{Point, Size};

/// Compositing mode of a canvas layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    /// White pixels become see-through, dark pixels occlude what's below.
    Multiply,
}

/// The three layers of the canvas, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Opaque white backing so strokes never export transparent.
    Backing,
    /// The user's editable ink.
    Ink,
    /// Static line art on top of the ink.
    LineArt,
}

/// One layer of the visual stack.
#[derive(Debug, Clone, Copy)]
pub struct LayerSpec {
    pub kind: LayerKind,
    pub blend: BlendMode,
}

/// The canvas layer stack, bottom to top. Renderers composite in this order.
pub fn layer_stack() -> [LayerSpec; 3] {
    [
        LayerSpec {
            kind: LayerKind::Backing,
            blend: BlendMode::Normal,
        },
        LayerSpec {
            kind: LayerKind::Ink,
            blend: BlendMode::Normal,
        },
        LayerSpec {
            kind: LayerKind::LineArt,
            blend: BlendMode::Multiply,
        },
    ]
}

/// Resolution state of a page's line-art asset.
#[derive(Debug, Clone, PartialEq)]
pub enum LineArt {
    /// Asset found; size is its native pixel size.
    Resolved { name: String, size: Size },
    /// Asset missing from the bundle; the canvas shows an unavailable state.
    Missing { name: String },
}

impl LineArt {
    pub fn name(&self) -> &str {
        match self {
            LineArt::Resolved { name, .. } | LineArt::Missing { name } => name,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, LineArt::Resolved { .. })
    }
}

/// Notifications emitted by the canvas for the library to persist.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// The stroke set changed; carries the complete current document.
    DrawingChanged(StrokeDocument),
    /// The drawing was cleared outright (resets the page's last-modified).
    DrawingCleared,
}

/// In-flight stroke being drawn.
#[derive(Debug, Clone)]
struct LiveStroke {
    tool: ToolKind,
    color: Color,
    width: f64,
    points: Vec<Point>,
}

/// Controller for the layered drawing canvas of a single page.
#[derive(Debug, Clone)]
pub struct CanvasController {
    document: StrokeDocument,
    /// View transform; never touches the stroke document.
    pub camera: Camera,
    /// Current tool, color, and brush size.
    pub tools: ToolManager,
    gestures: GestureRouter,
    viewport: Size,
    line_art: LineArt,
    live: Option<LiveStroke>,
    pending_events: Vec<CanvasEvent>,
}

impl CanvasController {
    /// Create a controller bound to a page's line art and saved drawing.
    pub fn new(line_art: LineArt, document: StrokeDocument) -> Self {
        Self {
            document,
            camera: Camera::new(),
            tools: ToolManager::new(),
            gestures: GestureRouter::new(),
            viewport: Size::new(800.0, 600.0),
            line_art,
            live: None,
            pending_events: Vec::new(),
        }
    }

    /// Set the viewport size.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width, height);
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn line_art(&self) -> &LineArt {
        &self.line_art
    }

    /// The committed drawing.
    pub fn document(&self) -> &StrokeDocument {
        &self.document
    }

    /// Preview of the stroke currently being drawn, if any.
    pub fn live_stroke(&self) -> Option<Stroke> {
        self.live
            .as_ref()
            .filter(|live| !live.points.is_empty())
            .map(|live| Stroke::new(live.tool, live.color, live.width, live.points.clone()))
    }

    /// Rebind the controller to another page's drawing.
    pub fn replace_document(&mut self, line_art: LineArt, document: StrokeDocument) {
        self.line_art = line_art;
        self.document = document;
        self.live = None;
        self.camera.reset();
    }

    /// Feed one touch event through gesture routing.
    ///
    /// When the line art is missing the canvas is inert: the page shows an
    /// unavailable state instead of a drawable surface.
    pub fn handle_touch(&mut self, phase: TouchPhase, touch: Touch) {
        if !self.line_art.is_available() {
            return;
        }
        for action in self.gestures.handle(phase, touch) {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: GestureAction) {
        match action {
            GestureAction::StrokeBegan(screen) => {
                let (color, width) = self.tools.stroke_style();
                self.live = Some(LiveStroke {
                    tool: self.tools.current_tool,
                    color,
                    width,
                    points: vec![self.camera.screen_to_page(screen)],
                });
            }
            GestureAction::StrokeMoved(screen) => {
                let page = self.camera.screen_to_page(screen);
                if let Some(live) = &mut self.live {
                    live.points.push(page);
                }
            }
            GestureAction::StrokeEnded(screen) => {
                let page = self.camera.screen_to_page(screen);
                if let Some(mut live) = self.live.take() {
                    if live.points.last() != Some(&page) {
                        live.points.push(page);
                    }
                    self.document
                        .append(Stroke::new(live.tool, live.color, live.width, live.points));
                    self.notify_changed();
                }
            }
            GestureAction::StrokeCancelled => {
                self.live = None;
            }
            GestureAction::Pan(delta) => {
                self.camera.pan(delta, self.viewport);
            }
            GestureAction::Pinch { center, factor } => {
                self.camera.zoom_at(center, factor, self.viewport);
            }
            GestureAction::DoubleTap(position) => {
                self.camera.toggle_tap_zoom(position, self.viewport);
            }
        }
    }

    /// Remove exactly the most recently appended stroke. No-op when empty.
    pub fn undo_last(&mut self) {
        if self.document.remove_last().is_some() {
            self.notify_changed();
        }
    }

    /// Replace the drawing with an empty one.
    ///
    /// Distinct from undo: downstream this also clears the page's
    /// last-modified timestamp.
    pub fn clear(&mut self) {
        self.live = None;
        self.document = StrokeDocument::new();
        self.pending_events.push(CanvasEvent::DrawingCleared);
    }

    /// Drain pending change notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn notify_changed(&mut self) {
        self.pending_events
            .push(CanvasEvent::DrawingChanged(self.document.clone()));
    }
}
