//! Application context for the Sankrypt CLI.
//!
//! Bundles the parsed arguments with the lazily loaded config file.

use once_cell::unsync::OnceCell;
use secrecy::SecretString;
use zeroize::Zeroizing;

use sankrypt_core::{FsStore, Session, SessionConfig};

use crate::cli::Cli;
use crate::config::SankryptConfig;
use crate::constants::env;
use crate::ui::UiContext;

use super::prompt::TerminalPrompter;
use super::resolver::{load_config, resolve_vault_path};

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<SankryptConfig>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// UI context for a command, honoring its `--json` flag.
    pub fn ui(&self, json: bool) -> UiContext {
        UiContext::from_env(json, self.cli.quiet)
    }

    /// The config file, loaded once. `None` when no file exists.
    pub fn config(&self) -> anyhow::Result<Option<&SankryptConfig>> {
        Ok(self.config.get_or_try_init(load_config)?.as_ref())
    }

    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        match self.config()? {
            Some(config) => config.session_config(),
            None => Ok(SessionConfig::default()),
        }
    }

    /// Open the vault named by `--vault` or the config file.
    pub fn open_store(&self) -> anyhow::Result<FsStore> {
        let root = resolve_vault_path(self.cli, self.config()?)?;
        Ok(FsStore::open(root)?)
    }

    pub fn new_session(&self) -> anyhow::Result<Session> {
        Ok(Session::new(self.session_config()?))
    }

    /// Password from SANKRYPT_PASSWORD, if set and non-blank.
    pub fn env_password(&self) -> Option<SecretString> {
        env_secret(env::PASSWORD)
    }

    /// Prompter for this run, seeded with SANKRYPT_PASSWORD.
    pub fn prompter(&self, ui: &UiContext) -> TerminalPrompter {
        TerminalPrompter::new(ui.clone(), self.env_password())
    }
}

/// Read a secret from the environment. Blank values count as unset.
pub fn env_secret(name: &str) -> Option<SecretString> {
    let value = Zeroizing::new(std::env::var(name).ok()?);
    if value.trim().is_empty() {
        return None;
    }
    Some(SecretString::from(value.to_string()))
}
