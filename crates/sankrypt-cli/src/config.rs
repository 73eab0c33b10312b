use std::path::{Path, PathBuf};
use std::time::Duration;

use sankrypt_core::lockout::{DEFAULT_LOCKOUT_SECONDS, DEFAULT_MAX_ATTEMPTS, MAX_LOCKOUT_SECONDS};
use sankrypt_core::session::DEFAULT_AUTO_LOCK_MINUTES;
use sankrypt_core::{LockoutPolicy, LockoutScope, OriginalAction, SessionConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankryptConfig {
    pub vault: VaultSection,
    #[serde(default)]
    pub security: SecuritySection,
    #[serde(default)]
    pub encrypt: EncryptSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultSection {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub auto_lock_minutes: u32,
    pub lockout_scope: LockoutScope,
    pub max_attempts: u32,
    pub lockout_seconds: u64,
    pub password_hint: String,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            auto_lock_minutes: DEFAULT_AUTO_LOCK_MINUTES,
            lockout_scope: LockoutScope::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_seconds: DEFAULT_LOCKOUT_SECONDS,
            password_hint: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptSection {
    pub original: OriginalAction,
}

impl SankryptConfig {
    pub fn new(vault_path: PathBuf) -> Self {
        Self {
            vault: VaultSection {
                path: vault_path.to_string_lossy().to_string(),
            },
            security: SecuritySection::default(),
            encrypt: EncryptSection::default(),
        }
    }

    pub fn vault_path(&self) -> PathBuf {
        PathBuf::from(&self.vault.path)
    }

    /// Build the core session settings from this file.
    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        if self.security.max_attempts == 0 {
            return Err(anyhow::anyhow!(
                "security.max_attempts must be at least 1"
            ));
        }
        if self.security.lockout_seconds > MAX_LOCKOUT_SECONDS {
            return Err(anyhow::anyhow!(
                "security.lockout_seconds must be at most {}",
                MAX_LOCKOUT_SECONDS
            ));
        }
        let hint = self.security.password_hint.trim();
        Ok(SessionConfig {
            auto_lock_minutes: self.security.auto_lock_minutes,
            lockout: LockoutPolicy {
                max_attempts: self.security.max_attempts,
                window: Duration::from_secs(self.security.lockout_seconds),
                scope: self.security.lockout_scope,
            },
            original_action: self.encrypt.original,
            password_hint: (!hint.is_empty()).then(|| hint.to_string()),
        })
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> anyhow::Result<SankryptConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &SankryptConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("sankrypt"));
        }
    }
    Ok(home_dir()?.join(".config").join("sankrypt"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = SankryptConfig::new(PathBuf::from("/tmp/notes"));
        config.security.lockout_scope = LockoutScope::Single;
        config.encrypt.original = OriginalAction::Ask;

        write_config(&path, &config).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: SankryptConfig = toml::from_str("[vault]\npath = \"/v\"\n").unwrap();
        let session = config.session_config().unwrap();
        assert_eq!(session.auto_lock_minutes, 30);
        assert_eq!(session.lockout.max_attempts, 3);
        assert_eq!(session.lockout.window, Duration::from_secs(60));
        assert_eq!(session.lockout.scope, LockoutScope::PerArtifact);
        assert_eq!(session.original_action, OriginalAction::Remove);
        assert_eq!(session.password_hint, None);
    }

    #[test]
    fn test_section_values_are_parsed() {
        let config: SankryptConfig = toml::from_str(
            "[vault]\npath = \"/v\"\n\n[security]\nauto_lock_minutes = 0\nlockout_scope = \"single\"\npassword_hint = \"  pet name  \"\n\n[encrypt]\noriginal = \"keep\"\n",
        )
        .unwrap();
        let session = config.session_config().unwrap();
        assert_eq!(session.auto_lock_minutes, 0);
        assert_eq!(session.lockout.scope, LockoutScope::Single);
        assert_eq!(session.original_action, OriginalAction::Keep);
        assert_eq!(session.password_hint.as_deref(), Some("pet name"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = SankryptConfig::new(PathBuf::from("/v"));
        config.security.max_attempts = 0;
        assert!(config.session_config().is_err());
    }

    #[test]
    fn test_oversized_lockout_rejected() {
        let mut config = SankryptConfig::new(PathBuf::from("/v"));
        config.security.lockout_seconds = u64::MAX;
        let err = config.session_config().unwrap_err();
        assert!(err.to_string().contains("lockout_seconds must be at most 86400"));

        config.security.lockout_seconds = MAX_LOCKOUT_SECONDS;
        assert!(config.session_config().is_ok());
    }
}
