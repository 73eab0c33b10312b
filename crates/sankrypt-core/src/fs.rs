//! Crash-safe file replacement for the vault.
//!
//! Content goes to a hidden sibling (`.name.sankrypt-tmp`), is synced, and
//! then renamed over the destination. Readers see either the old file or the
//! new one, never a truncated package.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = "sankrypt-tmp";

/// Hidden temp path next to `destination`.
pub fn temp_path_for(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    destination.with_file_name(format!(".{}.{}", name, TEMP_SUFFIX))
}

/// Write `content` to `destination` atomically, creating parent directories.
pub fn write_atomic(destination: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp = temp_path_for(destination);
    let written = File::create(&temp).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp);
        return Err(err);
    }
    replace(&temp, destination)
}

/// Rename `temp` over `destination`.
///
/// Some platforms refuse to rename onto an existing file, so a failed rename
/// is retried once after removing the destination. The temp file is removed
/// if both attempts fail.
fn replace(temp: &Path, destination: &Path) -> io::Result<()> {
    let Err(first) = fs::rename(temp, destination) else {
        return Ok(());
    };
    let _ = fs::remove_file(destination);
    fs::rename(temp, destination).map_err(|second| {
        let _ = fs::remove_file(temp);
        io::Error::new(
            second.kind(),
            format!(
                "Could not replace {} (first attempt: {}, retry: {})",
                destination.display(),
                first,
                second
            ),
        )
    })
}
