//! In-memory artifact store for tests and embedding.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::traits::ArtifactStore;
use super::types::ArtifactMeta;
use crate::error::{Result, SankryptError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, (String, DateTime<Utc>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `(path, content)` pairs.
    pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<PathBuf>,
        C: Into<String>,
    {
        let store = Self::new();
        {
            let mut guard = store.lock();
            for (path, content) in files {
                guard.insert(path.into(), (content.into(), Utc::now()));
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, (String, DateTime<Utc>)>> {
        // A panic while holding the lock cannot leave a half-written map entry.
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ArtifactStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<String> {
        self.lock()
            .get(path)
            .map(|(content, _)| content.clone())
            .ok_or_else(|| SankryptError::NotFound(format!("File {}", path.display())))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.lock()
            .insert(path.to_path_buf(), (content.to_string(), Utc::now()));
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| SankryptError::NotFound(format!("File {}", path.display())))
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn list(&self) -> Result<Vec<ArtifactMeta>> {
        Ok(self
            .lock()
            .iter()
            .map(|(path, (content, modified))| ArtifactMeta {
                path: path.clone(),
                size: content.len() as u64,
                modified: *modified,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryStore::with_files([("b.md.skenc", "pkg"), ("a.md", "text")]);

        assert!(store.exists(Path::new("a.md")));
        assert_eq!(store.read(Path::new("a.md")).unwrap(), "text");
        assert_eq!(store.list().unwrap()[0].path, PathBuf::from("a.md"));
        assert_eq!(store.encrypted_artifacts().unwrap().len(), 1);

        store.delete(Path::new("a.md")).unwrap();
        assert!(!store.exists(Path::new("a.md")));
        assert!(store.delete(Path::new("a.md")).is_err());
    }
}
