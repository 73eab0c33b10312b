//! Path resolution for the config file and the vault.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, SankryptConfig};
use crate::constants::env;
use crate::errors::CliError;

/// Resolve the config file path, checking SANKRYPT_CONFIG first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(env::CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config file, or `None` when it does not exist.
pub fn load_config() -> anyhow::Result<Option<SankryptConfig>> {
    let path = resolve_config_path()?;
    if !path.exists() {
        return Ok(None);
    }
    read_config(&path).map(Some)
}

/// Resolve the vault directory from `--vault` or the config file.
pub fn resolve_vault_path(cli: &Cli, config: Option<&SankryptConfig>) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.vault.clone() {
        return Ok(path);
    }
    match config {
        Some(config) => Ok(config.vault_path()),
        None => {
            let config_path = resolve_config_path()?;
            Err(CliError::not_found(
                missing_config_message(&config_path),
                "Hint: Pass --vault <DIR> to use a vault without a config file.",
            )
            .into())
        }
    }
}

/// Error message when the config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "No Sankrypt config found at {}\n\nRun:\n  sankrypt init <DIR>",
        config_path.display()
    )
}

/// Turn a user-supplied path into one relative to the vault root.
///
/// Absolute paths under the root lose the root prefix; anything else is
/// returned unchanged and left for the store to accept or reject.
pub fn vault_relative(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        if let Ok(stripped) = path.strip_prefix(root) {
            return stripped.to_path_buf();
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_relative_strips_root() {
        let root = Path::new("/home/me/vault");
        assert_eq!(
            vault_relative(root, Path::new("/home/me/vault/notes/a.md")),
            PathBuf::from("notes/a.md")
        );
        assert_eq!(
            vault_relative(root, Path::new("notes/a.md")),
            PathBuf::from("notes/a.md")
        );
        assert_eq!(
            vault_relative(root, Path::new("/etc/passwd")),
            PathBuf::from("/etc/passwd")
        );
    }

    #[test]
    fn test_missing_config_message_points_to_init() {
        let message = missing_config_message(Path::new("/x/config.toml"));
        assert!(message.contains("/x/config.toml"));
        assert!(message.contains("sankrypt init"));
    }
}
