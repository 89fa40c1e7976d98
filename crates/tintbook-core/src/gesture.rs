//! Gesture routing for touch input on the canvas.
//!
//! A single touch always draws; navigation takes two fingers, so pan and
//! zoom can never leak into the drawing.

use kurbo::{Point, Vec2};
use std::collections::BTreeMap;
use std::time::Instant;

/// Double-tap detection constants.
const DOUBLE_TAP_TIME_MS: u128 = 500;
const DOUBLE_TAP_DISTANCE: f64 = 5.0;

/// Movement past this distance turns a touch into a drag instead of a tap.
const TAP_SLOP: f64 = 5.0;

/// Minimum pinch span change worth reporting.
const PINCH_EPSILON: f64 = 1e-3;

/// Lifecycle phase of a single touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// One finger or stylus contact.
#[derive(Debug, Clone, Copy)]
pub struct Touch {
    pub id: u64,
    pub position: Point,
}

impl Touch {
    pub fn new(id: u64, position: Point) -> Self {
        Self { id, position }
    }
}

/// Actions produced by routing raw touches.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureAction {
    /// Single-input contact started a stroke at a screen point.
    StrokeBegan(Point),
    /// The stroking touch moved.
    StrokeMoved(Point),
    /// The stroking touch lifted; commit the stroke.
    StrokeEnded(Point),
    /// Discard any in-progress stroke without committing.
    StrokeCancelled,
    /// Two-finger drag, delta in screen coordinates.
    Pan(Vec2),
    /// Pinch around a screen point; factor is the incremental span ratio.
    Pinch { center: Point, factor: f64 },
    /// Two quick taps in place.
    DoubleTap(Point),
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Idle,
    Stroking {
        touch_id: u64,
        origin: Point,
        moved: bool,
    },
    Navigating {
        centroid: Point,
        span: f64,
    },
}

/// Routes raw touch events into stroke and navigation actions.
#[derive(Debug, Clone)]
pub struct GestureRouter {
    /// Touches currently on the surface.
    active: BTreeMap<u64, Point>,
    mode: Mode,
    /// Last tap time for double-tap detection.
    last_tap_time: Option<Instant>,
    /// Last tap position for double-tap detection.
    last_tap_position: Option<Point>,
}

impl Default for GestureRouter {
    fn default() -> Self {
        Self {
            active: BTreeMap::new(),
            mode: Mode::Idle,
            last_tap_time: None,
            last_tap_position: None,
        }
    }
}

impl GestureRouter {
    /// Create a new gesture router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of touches currently down.
    pub fn touch_count(&self) -> usize {
        self.active.len()
    }

    /// Whether a stroke is currently in flight.
    pub fn is_stroking(&self) -> bool {
        matches!(self.mode, Mode::Stroking { .. })
    }

    /// Process one touch event and return the resulting actions.
    pub fn handle(&mut self, phase: TouchPhase, touch: Touch) -> Vec<GestureAction> {
        match phase {
            TouchPhase::Began => self.handle_began(touch),
            TouchPhase::Moved => self.handle_moved(touch),
            TouchPhase::Ended => self.handle_ended(touch),
            TouchPhase::Cancelled => self.handle_cancelled(touch),
        }
    }

    fn handle_began(&mut self, touch: Touch) -> Vec<GestureAction> {
        self.active.insert(touch.id, touch.position);
        let mut actions = Vec::new();

        match self.active.len() {
            1 => {
                self.mode = Mode::Stroking {
                    touch_id: touch.id,
                    origin: touch.position,
                    moved: false,
                };
                actions.push(GestureAction::StrokeBegan(touch.position));
            }
            2 => {
                // A second finger turns the interaction into navigation.
                if matches!(self.mode, Mode::Stroking { .. }) {
                    actions.push(GestureAction::StrokeCancelled);
                }
                let (centroid, span) = self.pair_metrics();
                self.mode = Mode::Navigating { centroid, span };
            }
            _ => {}
        }

        actions
    }

    fn handle_moved(&mut self, touch: Touch) -> Vec<GestureAction> {
        if let Some(position) = self.active.get_mut(&touch.id) {
            *position = touch.position;
        }
        let mut actions = Vec::new();

        match &mut self.mode {
            Mode::Stroking {
                touch_id,
                origin,
                moved,
            } if *touch_id == touch.id => {
                if touch.position.distance(*origin) > TAP_SLOP {
                    *moved = true;
                }
                actions.push(GestureAction::StrokeMoved(touch.position));
            }
            Mode::Navigating { centroid, span } if self.active.len() >= 2 => {
                let old_centroid = *centroid;
                let old_span = *span;
                let (new_centroid, new_span) = pair_metrics_of(&self.active);

                let delta = new_centroid - old_centroid;
                if delta.hypot() > 0.0 {
                    actions.push(GestureAction::Pan(delta));
                }
                if old_span > PINCH_EPSILON && new_span > PINCH_EPSILON {
                    let factor = new_span / old_span;
                    if (factor - 1.0).abs() > PINCH_EPSILON {
                        actions.push(GestureAction::Pinch {
                            center: new_centroid,
                            factor,
                        });
                    }
                }
                self.mode = Mode::Navigating {
                    centroid: new_centroid,
                    span: new_span,
                };
            }
            _ => {}
        }

        actions
    }

    fn handle_ended(&mut self, touch: Touch) -> Vec<GestureAction> {
        self.active.remove(&touch.id);
        let mut actions = Vec::new();

        match self.mode {
            Mode::Stroking {
                touch_id,
                origin,
                moved,
            } if touch_id == touch.id => {
                self.mode = Mode::Idle;
                let position = touch.position;
                let is_tap = !moved && position.distance(origin) <= TAP_SLOP;

                if is_tap && self.completes_double_tap(position) {
                    // The second tap zooms instead of leaving a dot behind.
                    self.last_tap_time = None;
                    self.last_tap_position = None;
                    actions.push(GestureAction::StrokeCancelled);
                    actions.push(GestureAction::DoubleTap(position));
                } else {
                    if is_tap {
                        self.last_tap_time = Some(Instant::now());
                        self.last_tap_position = Some(position);
                    } else {
                        self.last_tap_time = None;
                        self.last_tap_position = None;
                    }
                    actions.push(GestureAction::StrokeEnded(position));
                }
            }
            Mode::Navigating { .. } if self.active.len() < 2 => {
                // A finger left over from navigation must not start drawing.
                self.mode = Mode::Idle;
            }
            _ => {}
        }

        actions
    }

    fn handle_cancelled(&mut self, touch: Touch) -> Vec<GestureAction> {
        self.active.remove(&touch.id);
        let mut actions = Vec::new();

        match self.mode {
            Mode::Stroking { touch_id, .. } if touch_id == touch.id => {
                self.mode = Mode::Idle;
                actions.push(GestureAction::StrokeCancelled);
            }
            Mode::Navigating { .. } if self.active.len() < 2 => {
                self.mode = Mode::Idle;
            }
            _ => {}
        }

        actions
    }

    fn completes_double_tap(&self, position: Point) -> bool {
        match (self.last_tap_time, self.last_tap_position) {
            (Some(time), Some(last)) => {
                time.elapsed().as_millis() < DOUBLE_TAP_TIME_MS
                    && position.distance(last) < DOUBLE_TAP_DISTANCE
            }
            _ => false,
        }
    }

    fn pair_metrics(&self) -> (Point, f64) {
        pair_metrics_of(&self.active)
    }
}

/// Centroid and span of the first two active touches.
fn pair_metrics_of(active: &BTreeMap<u64, Point>) -> (Point, f64) {
    let mut it = active.values();
    match (it.next(), it.next()) {
        (Some(&a), Some(&b)) => (a.midpoint(b), a.distance(b)),
        (Some(&a), None) => (a, 0.0),
        _ => (Point::ZERO, 0.0),
    }
}
