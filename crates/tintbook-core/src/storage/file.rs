//! File-based backend implementation.

use super::{Backend, BoxFuture, LibraryRecord, StoreError, StoreResult};
use std::fs;
use std::path::PathBuf;

/// File-based backend.
///
/// Stores library snapshots as JSON files in a base directory. A replicated
/// store (cloud sync) can drop merged snapshots into the same directory and
/// feed them through `Store::apply_remote`.
pub struct FileBackend {
    /// Base directory for library storage.
    base_path: PathBuf,
}

impl FileBackend {
    /// Create a new file backend with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StoreResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StoreError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a file backend in the default location.
    pub fn default_location() -> StoreResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StoreError::Io("Could not determine home directory".to_string()))?;

        let path = base.join("tintbook").join("library");
        Self::new(path)
    }

    /// Get the file path for a library key.
    fn library_path(&self, key: &str) -> PathBuf {
        // Sanitize the key to be safe for filenames
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl Backend for FileBackend {
    fn save(&self, key: &str, library: &LibraryRecord) -> BoxFuture<'_, StoreResult<()>> {
        let path = self.library_path(key);
        let json = match serde_json::to_string_pretty(library) {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StoreError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            fs::write(&path, json).map_err(|e| {
                StoreError::Io(format!("Failed to write {}: {}", path.display(), e))
            })
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StoreResult<LibraryRecord>> {
        let path = self.library_path(key);
        let key_owned = key.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StoreError::NotFound(key_owned));
            }

            let json = fs::read_to_string(&path).map_err(|e| {
                StoreError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;

            serde_json::from_str(&json).map_err(|e| {
                StoreError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StoreResult<bool>> {
        let path = self.library_path(key);
        Box::pin(async move { Ok(path.exists()) })
    }
}
