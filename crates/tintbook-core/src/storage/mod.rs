//! Durable storage for the library.
//!
//! Concurrency model: the in-memory [`Store`] is confined to its single
//! owner (the library coordinator) and mutated only through `&mut`; backends
//! are `Send + Sync` and serialize their own I/O. There is no lock guarding
//! UI-facing state.

mod debounce;
mod file;
pub(crate) mod memory;
mod records;
mod store;

pub use debounce::{Debouncer, SaveCoordinator, REMOTE_CHANGE_QUIESCENCE, SAVE_QUIESCENCE};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use records::{
    BookRecord, DrawingState, LibraryRecord, PageRecord, Stamped, Timestamp,
};
pub use store::{Store, StoreEvent, LIBRARY_KEY};

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async backend operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for durable library backends.
///
/// Implementations can keep the library in memory, on the filesystem, or in
/// a replicated remote store; the keyed interface stays the same.
pub trait Backend: Send + Sync {
    /// Persist a library snapshot.
    fn save(&self, key: &str, library: &LibraryRecord) -> BoxFuture<'_, StoreResult<()>>;

    /// Load a library snapshot.
    fn load(&self, key: &str) -> BoxFuture<'_, StoreResult<LibraryRecord>>;

    /// Check whether a snapshot exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StoreResult<bool>>;
}
