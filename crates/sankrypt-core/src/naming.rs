//! Collision-free output paths for encrypt and decrypt.
//!
//! Encrypting `note.md` targets `note.md.skenc`; decrypting it targets
//! `note.md` again. When the canonical target is taken the resolver tries
//! `note-ab12.md.skenc`, then `note-ab12-1.md.skenc`, `note-ab12-2.md.skenc`
//! and so on, and gives up after [`MAX_COUNTER`] numbered candidates.
//! Existing files are never selected.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::crypto::random_bytes;
use crate::error::{Result, SankryptError};
use crate::storage::{ArtifactStore, ENCRYPTED_EXTENSION};

/// Highest numbered candidate tried before giving up.
pub const MAX_COUNTER: u32 = 100;

/// Length of the random disambiguation suffix.
pub const SUFFIX_LENGTH: usize = 4;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Which way a file is being transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOperation {
    Encrypt,
    Decrypt,
}

/// A free output path and the canonical path it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub canonical: PathBuf,
}

impl ResolvedPath {
    /// Whether the canonical path was taken and a variant was chosen.
    pub fn is_renamed(&self) -> bool {
        self.path != self.canonical
    }
}

/// Split a target file name into the part that receives the suffix and the
/// tail that must stay at the end (`"note"`, `".md.skenc"`).
struct NameParts {
    canonical: String,
    base: String,
    tail: String,
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => (&name[..index], &name[index..]),
        _ => (name, ""),
    }
}

fn name_parts(file_name: &str, operation: NameOperation) -> Result<NameParts> {
    let suffix = format!(".{}", ENCRYPTED_EXTENSION);
    match operation {
        NameOperation::Encrypt => {
            let clean = file_name.strip_suffix(&suffix).unwrap_or(file_name);
            let (base, ext) = split_extension(clean);
            Ok(NameParts {
                canonical: format!("{}{}", file_name, suffix),
                base: base.to_string(),
                tail: format!("{}{}", ext, suffix),
            })
        }
        NameOperation::Decrypt => {
            let original = file_name
                .strip_suffix(&suffix)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    SankryptError::InvalidInput(format!(
                        "Not an encrypted artifact: {}",
                        file_name
                    ))
                })?;
            let (base, ext) = split_extension(original);
            Ok(NameParts {
                canonical: original.to_string(),
                base: base.to_string(),
                tail: ext.to_string(),
            })
        }
    }
}

/// Generate a random lowercase alphanumeric suffix.
pub fn random_suffix() -> Result<String> {
    let mut out = String::with_capacity(SUFFIX_LENGTH);
    // 252 = 7 * 36; rejecting larger bytes keeps the distribution uniform.
    while out.len() < SUFFIX_LENGTH {
        let bytes: [u8; 16] = random_bytes()?;
        for byte in bytes {
            if byte < 252 && out.len() < SUFFIX_LENGTH {
                out.push(SUFFIX_ALPHABET[(byte % 36) as usize] as char);
            }
        }
    }
    Ok(out)
}

/// Resolve a free output path in the store for `source`.
///
/// # Errors
///
/// - `SankryptError::InvalidInput` when decrypting a path without the
///   encrypted suffix.
/// - `SankryptError::FilenameExhaustion` when every candidate is taken.
pub fn resolve_target_path(
    store: &dyn ArtifactStore,
    source: &Path,
    operation: NameOperation,
) -> Result<ResolvedPath> {
    let suffix = random_suffix()?;
    resolve_with_suffix(|path| store.exists(path), source, operation, &suffix)
}

/// Resolve with an explicit disambiguation suffix and existence check.
pub fn resolve_with_suffix(
    exists: impl Fn(&Path) -> bool,
    source: &Path,
    operation: NameOperation,
    suffix: &str,
) -> Result<ResolvedPath> {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| {
            SankryptError::InvalidInput(format!("Path has no file name: {}", source.display()))
        })?;
    let parts = name_parts(&file_name, operation)?;
    let dir = source.parent().unwrap_or_else(|| Path::new(""));

    let canonical = dir.join(&parts.canonical);
    let resolved = |path: PathBuf| ResolvedPath {
        path,
        canonical: canonical.clone(),
    };

    if !exists(&canonical) {
        return Ok(resolved(canonical.clone()));
    }

    let with_suffix = dir.join(format!("{}-{}{}", parts.base, suffix, parts.tail));
    if !exists(&with_suffix) {
        debug!(target_path = %with_suffix.display(), "canonical target taken, using suffix");
        return Ok(resolved(with_suffix));
    }

    for counter in 1..=MAX_COUNTER {
        let numbered = dir.join(format!("{}-{}-{}{}", parts.base, suffix, counter, parts.tail));
        if !exists(&numbered) {
            debug!(target_path = %numbered.display(), counter, "suffix taken, using counter");
            return Ok(resolved(numbered));
        }
    }

    Err(SankryptError::FilenameExhaustion {
        path: canonical,
        attempts: MAX_COUNTER,
    })
}
