//! Directory-backed artifact store.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::traits::ArtifactStore;
use super::types::ArtifactMeta;
use crate::error::{Result, SankryptError};
use crate::fs::write_atomic;

/// Artifact store rooted at a directory (the vault).
///
/// Hidden files and directories (names starting with `.`) are not listed.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `SankryptError::NotFound` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SankryptError::NotFound(format!(
                "Vault directory {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store-relative path to a filesystem path, refusing escapes.
    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        let mut depth = 0usize;
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                _ => {
                    return Err(SankryptError::InvalidInput(format!(
                        "Path must stay inside the vault: {}",
                        path.display()
                    )))
                }
            }
        }
        if depth == 0 {
            return Err(SankryptError::InvalidInput(
                "Path cannot be empty".to_string(),
            ));
        }
        Ok(resolved)
    }

    fn not_found(path: &Path) -> SankryptError {
        SankryptError::NotFound(format!("File {}", path.display()))
    }

    fn collect(&self, dir: &Path, out: &mut Vec<ArtifactMeta>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let file_type = entry.file_type()?;
            let full = entry.path();
            if file_type.is_dir() {
                self.collect(&full, out)?;
            } else if file_type.is_file() {
                let metadata = entry.metadata()?;
                let relative = full
                    .strip_prefix(&self.root)
                    .map_err(|e| SankryptError::Storage(e.to_string()))?
                    .to_path_buf();
                let modified = metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                out.push(ArtifactMeta {
                    path: relative,
                    size: metadata.len(),
                    modified,
                });
            }
        }
        Ok(())
    }
}

impl ArtifactStore for FsStore {
    fn read(&self, path: &Path) -> Result<String> {
        let full = self.resolve(path)?;
        match fs::read_to_string(&full) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(Self::not_found(path)),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => Err(SankryptError::Storage(
                format!("{} is not a UTF-8 text file", path.display()),
            )),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let full = self.resolve(path)?;
        write_atomic(&full, content.as_bytes())?;
        debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted file");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(Self::not_found(path)),
            Err(err) => Err(err.into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        match self.resolve(path) {
            Ok(full) => full.exists(),
            Err(_) => true,
        }
    }

    fn list(&self) -> Result<Vec<ArtifactMeta>> {
        let mut out = Vec::new();
        self.collect(&self.root, &mut out)?;
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }
}
