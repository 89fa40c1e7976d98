//! In-memory backend implementation.

use super::{Backend, BoxFuture, LibraryRecord, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory backend for previews, tests, and ephemeral use.
#[derive(Default)]
pub struct MemoryBackend {
    libraries: RwLock<HashMap<String, LibraryRecord>>,
}

impl MemoryBackend {
    /// Create a new empty memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn save(&self, key: &str, library: &LibraryRecord) -> BoxFuture<'_, StoreResult<()>> {
        let key = key.to_string();
        let library = library.clone();
        Box::pin(async move {
            let mut libraries = self
                .libraries
                .write()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            libraries.insert(key, library);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StoreResult<LibraryRecord>> {
        let key = key.to_string();
        Box::pin(async move {
            let libraries = self
                .libraries
                .read()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            libraries
                .get(&key)
                .cloned()
                .ok_or(StoreError::NotFound(key))
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StoreResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let libraries = self
                .libraries
                .read()
                .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))?;
            Ok(libraries.contains_key(&key))
        })
    }
}
