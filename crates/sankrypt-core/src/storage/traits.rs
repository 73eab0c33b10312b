//! Artifact store trait definition.
//!
//! The core never touches a concrete storage API; hosts hand it anything that
//! implements `ArtifactStore`. Paths are relative to the store root.

use std::path::Path;

use super::types::{is_encrypted_path, ArtifactMeta};
use crate::error::Result;

/// Storage interface for plaintext files and encrypted artifacts.
///
/// Implementations must ensure:
/// - `write` creates or fully replaces the file (no partial writes visible)
/// - `list` returns every file under the root, encrypted or not
/// - `exists` never errors; an unreadable location counts as taken
pub trait ArtifactStore: Send + Sync {
    /// Read a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `SankryptError::NotFound` if the path does not exist.
    fn read(&self, path: &Path) -> Result<String>;

    /// Create or overwrite a file.
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// Returns `SankryptError::NotFound` if the path does not exist.
    fn delete(&self, path: &Path) -> Result<()>;

    /// Whether a file occupies this path.
    fn exists(&self, path: &Path) -> bool;

    /// List all files, ordered by path.
    fn list(&self) -> Result<Vec<ArtifactMeta>>;

    /// List only encrypted artifacts, ordered by path.
    fn encrypted_artifacts(&self) -> Result<Vec<ArtifactMeta>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|meta| is_encrypted_path(&meta.path))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_dyn_store(_store: &dyn ArtifactStore) {}
    }
}
