use std::path::PathBuf;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{write_config, SankryptConfig};
use crate::errors::CliError;
use crate::ui::{badge, hint, kv, Badge};

pub fn handle_init(ctx: &AppContext, args: &InitArgs, vault_flag: Option<&PathBuf>) -> anyhow::Result<()> {
    let vault = args
        .path
        .clone()
        .or_else(|| vault_flag.cloned())
        .ok_or_else(|| {
            CliError::invalid_input(
                "Vault directory required.\nRun:\n  sankrypt init <DIR>",
            )
        })?;

    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}\nHint: Pass --force to overwrite it.",
            config_path.display()
        ))
        .into());
    }

    std::fs::create_dir_all(&vault).map_err(|e| {
        anyhow::anyhow!("Failed to create vault directory {}: {}", vault.display(), e)
    })?;
    let vault = vault.canonicalize().unwrap_or(vault);

    let mut config = SankryptConfig::new(vault.clone());
    if let Some(minutes) = args.auto_lock_minutes {
        config.security.auto_lock_minutes = minutes;
    }
    if let Some(original) = args.original {
        config.encrypt.original = original.into();
    }
    if let Some(scope) = args.lockout_scope {
        config.security.lockout_scope = scope.into();
    }
    if let Some(reminder) = &args.hint {
        config.security.password_hint = reminder.trim().to_string();
    }
    config.session_config()?;
    write_config(&config_path, &config)?;
    tracing::info!(config = %config_path.display(), vault = %vault.display(), "initialized");

    if !ctx.quiet() {
        let ui = ctx.ui(false);
        println!("{}", badge(&ui, Badge::Ok, "Vault ready"));
        println!("{}", kv(&ui, "Vault", &vault.display().to_string()));
        println!("{}", kv(&ui, "Config", &config_path.display().to_string()));
        println!(
            "{}",
            hint(
                &ui,
                "The first `sankrypt encrypt <FILE>` sets the master password."
            )
        );
    }
    Ok(())
}
