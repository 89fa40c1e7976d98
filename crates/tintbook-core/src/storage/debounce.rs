//! Debounced persistence: coalesce bursts of change signals into rare writes.
//!
//! Drawing produces one change signal per stroke, potentially dozens per
//! second. The coordinator arms a quiescence window that every new request
//! resets; the write happens once the window elapses with no further
//! requests. Lifecycle transitions bypass the window with [`SaveCoordinator::flush_now`].

use super::store::Store;
use super::Backend;
use std::time::{Duration, Instant};

/// Quiescence window for durable drawing saves.
pub const SAVE_QUIESCENCE: Duration = Duration::from_secs(1);

/// Quiescence window before refetching after remote change bursts.
pub const REMOTE_CHANGE_QUIESCENCE: Duration = Duration::from_millis(500);

/// A timer-reset-on-call debouncer.
///
/// `trigger` may be called arbitrarily often; `fire_if_ready` reports ready
/// exactly once per burst, after `window` has passed since the last trigger.
/// There is no separate cancel: a new trigger simply resets the window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    armed: bool,
    last_trigger: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed: false,
            last_trigger: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arm (or re-arm) the quiescence window.
    pub fn trigger(&mut self) {
        self.armed = true;
        self.last_trigger = Some(Instant::now());
    }

    /// Whether a trigger is waiting for its window to elapse.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Fire once the window has elapsed since the last trigger.
    pub fn fire_if_ready(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        let quiescent = match self.last_trigger {
            Some(last) => last.elapsed() >= self.window,
            None => true,
        };
        if quiescent {
            self.armed = false;
            self.last_trigger = None;
        }
        quiescent
    }

    /// Fire immediately, disarming any pending window.
    ///
    /// Returns whether a trigger was pending.
    pub fn fire_now(&mut self) -> bool {
        let was_armed = self.armed;
        self.armed = false;
        self.last_trigger = None;
        was_armed
    }
}

/// Batches rapid save requests into infrequent durable writes.
///
/// Driven by the UI loop: call [`SaveCoordinator::request_save`] on every
/// mutation and [`SaveCoordinator::poll`] each tick. Call
/// [`SaveCoordinator::flush_now`] when the app is about to lose foreground,
/// bounding data loss at that transition to zero.
#[derive(Debug, Clone)]
pub struct SaveCoordinator {
    debounce: Debouncer,
}

impl Default for SaveCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveCoordinator {
    pub fn new() -> Self {
        Self::with_window(SAVE_QUIESCENCE)
    }

    /// Coordinator with a custom quiescence window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            debounce: Debouncer::new(window),
        }
    }

    /// Note that something changed. Safe to call once per stroke.
    pub fn request_save(&mut self) {
        self.debounce.trigger();
    }

    /// Whether a save request is waiting on quiescence.
    pub fn is_pending(&self) -> bool {
        self.debounce.is_armed()
    }

    /// Perform the durable write if the window has elapsed.
    ///
    /// Returns whether a flush was attempted. The store itself skips the
    /// write when nothing is dirty.
    pub fn poll<B: Backend>(&mut self, store: &mut Store<B>) -> bool {
        if self.debounce.fire_if_ready() {
            store.save();
            true
        } else {
            false
        }
    }

    /// Write immediately, bypassing the window, and disarm the pending timer
    /// so it cannot fire a duplicate write afterwards.
    pub fn flush_now<B: Backend>(&mut self, store: &mut Store<B>) {
        self.debounce.fire_now();
        store.save();
    }
}
