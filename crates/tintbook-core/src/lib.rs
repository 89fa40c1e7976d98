//! Tintbook Core Library
//!
//! Platform-agnostic data structures and logic for the Tintbook coloring
//! book: the stroke document, tool and camera state, touch routing, the
//! durable library store, and the debounced save pipeline.

pub mod camera;
pub mod canvas;
pub mod document;
pub mod entitlement;
pub mod gesture;
pub mod library;
pub mod storage;
pub mod tools;

pub use camera::Camera;
pub use canvas::{BlendMode, CanvasController, CanvasEvent, LayerKind, LayerSpec, LineArt, layer_stack};
pub use document::{Color, Stroke, StrokeDocument};
pub use entitlement::{AlwaysUnlocked, EntitlementOracle, PurchaseError, PurchaseOutcome};
pub use gesture::{GestureAction, GestureRouter, Touch, TouchPhase};
pub use library::{Book, Library, Page, page_image_name, seed_default_library};
pub use storage::{
    Backend, BookRecord, Debouncer, FileBackend, LibraryRecord, MemoryBackend, PageRecord,
    SaveCoordinator, Store, StoreError, StoreEvent, Timestamp,
};
pub use tools::{ToolKind, ToolManager};
