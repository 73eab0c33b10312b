//! change-password and strength.

use std::io::BufRead;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use zeroize::Zeroizing;

use sankrypt_core::{validate_password, ArtifactStore, PasswordPrompt, Prompter, SankryptError};

use crate::app::{env_secret, AppContext};
use crate::cli::JsonArgs;
use crate::constants::env;
use crate::errors::CliError;
use crate::ui::{badge, render::strength_label, strength_meter, Badge, ReencryptProgress};

pub fn handle_change_password(ctx: &AppContext) -> anyhow::Result<()> {
    let ui = ctx.ui(false);
    let store = ctx.open_store()?;
    let mut session = ctx.new_session()?;
    let prompter = ctx.prompter(&ui);

    let artifacts = store.encrypted_artifacts()?.len();
    if artifacts == 0 {
        return Err(CliError::invalid_input(
            "The vault has no encrypted files.\nHint: The first `sankrypt encrypt <FILE>` sets the master password.",
        )
        .into());
    }

    let current = prompter
        .password(&PasswordPrompt::Verify {
            artifacts,
            hint: session.config().password_hint.clone(),
        })?
        .ok_or_else(|| CliError::invalid_input("Cancelled."))?;

    let new = match env_secret(env::NEW_PASSWORD) {
        Some(secret) => secret,
        None => {
            if !ui.is_interactive() {
                return Err(CliError::invalid_input(format!(
                    "New password required: set {} or run in a terminal",
                    env::NEW_PASSWORD
                ))
                .into());
            }
            read_new_password(&prompter)?
        }
    };

    let progress = ReencryptProgress::new(&ui, artifacts);
    let result = session.change_password_with_progress(
        &store,
        current.expose_secret(),
        new.expose_secret(),
        |index, total, path| progress.on_artifact(index, total, path),
    );
    progress.finish();

    match result {
        Ok(report) => {
            if !ui.quiet {
                println!(
                    "{}",
                    badge(
                        &ui,
                        Badge::Ok,
                        &format!(
                            "Re-encrypted {} file(s) with the new password",
                            report.success_count
                        )
                    )
                );
            }
            Ok(())
        }
        Err(SankryptError::PartialReencryption {
            success,
            failure,
            failed,
        }) => {
            for (path, reason) in &failed {
                eprintln!(
                    "{}",
                    badge(&ui, Badge::Err, &format!("{}: {}", path.display(), reason))
                );
            }
            Err(CliError::PartialReencryption(format!(
                "Re-encrypted {} file(s), but {} failed and still use the old password.",
                success, failure
            ))
            .into())
        }
        Err(err) => Err(err.into()),
    }
}

fn read_new_password(prompter: &dyn Prompter) -> anyhow::Result<SecretString> {
    let new = prompter
        .password(&PasswordPrompt::SetNew)?
        .ok_or_else(|| CliError::invalid_input("Cancelled."))?;
    let confirmation = prompter
        .password(&PasswordPrompt::ConfirmNew)?
        .ok_or_else(|| CliError::invalid_input("Cancelled."))?;
    if new.expose_secret() != confirmation.expose_secret() {
        return Err(CliError::invalid_input("Passwords do not match.").into());
    }
    Ok(new)
}

#[derive(Serialize)]
struct StrengthOutput {
    strength: u8,
    label: &'static str,
    valid: bool,
    issues: Vec<String>,
}

pub fn handle_strength(ctx: &AppContext, args: &JsonArgs) -> anyhow::Result<()> {
    let ui = ctx.ui(args.json);
    let candidate = match ctx.env_password() {
        Some(secret) => secret,
        None if ui.is_interactive() => {
            let value = dialoguer::Password::new()
                .with_prompt("Password to score")
                .interact()?;
            SecretString::from(value)
        }
        None => read_stdin_line()?,
    };

    let report = validate_password(candidate.expose_secret());
    if ui.mode.is_json() {
        let output = StrengthOutput {
            strength: report.strength,
            label: strength_label(report.strength),
            valid: report.valid,
            issues: report.issues.iter().map(|issue| issue.to_string()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", strength_meter(&ui, report.strength));
    if report.valid {
        println!("{}", badge(&ui, Badge::Ok, "Meets the password policy"));
    }
    for issue in &report.issues {
        println!("{}", badge(&ui, Badge::Warn, &issue.to_string()));
    }
    Ok(())
}

fn read_stdin_line() -> anyhow::Result<SecretString> {
    let mut line = Zeroizing::new(String::new());
    std::io::stdin().lock().read_line(&mut line)?;
    let value = line.trim_end_matches(['\r', '\n']);
    if value.is_empty() {
        return Err(CliError::invalid_input(format!(
            "No password given: set {}, pipe one on stdin or run in a terminal",
            env::PASSWORD
        ))
        .into());
    }
    Ok(SecretString::from(value.to_string()))
}
