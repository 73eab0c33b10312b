//! Core data types for the storage layer.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// File suffix that marks an encrypted artifact.
pub const ENCRYPTED_EXTENSION: &str = "skenc";

/// Metadata for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMeta {
    /// Path relative to the store root
    pub path: PathBuf,

    /// Size of the stored content in bytes
    pub size: u64,

    /// Last modification timestamp
    pub modified: DateTime<Utc>,
}

impl ArtifactMeta {
    pub fn is_encrypted(&self) -> bool {
        is_encrypted_path(&self.path)
    }
}

/// Whether the path carries the encrypted-artifact suffix.
pub fn is_encrypted_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == ENCRYPTED_EXTENSION)
        .unwrap_or(false)
}
