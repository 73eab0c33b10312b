use secrecy::ExposeSecret;

use sankrypt_core::{check_consistency, ArtifactStore, ConsistencyReport, PasswordPrompt, Prompter};

use crate::app::AppContext;
use crate::cli::JsonArgs;
use crate::errors::CliError;
use crate::ui::{badge, hint, kv, Badge, UiContext};

pub fn handle_check(ctx: &AppContext, args: &JsonArgs) -> anyhow::Result<()> {
    let ui = ctx.ui(args.json);
    let store = ctx.open_store()?;
    let prompter = ctx.prompter(&ui);
    let reminder = ctx.session_config()?.password_hint;
    check(&store, &prompter, &ui, reminder)
}

/// Sample the vault's artifacts with a password. Nothing is unlocked.
pub(super) fn check(
    store: &dyn ArtifactStore,
    prompter: &dyn Prompter,
    ui: &UiContext,
    reminder: Option<String>,
) -> anyhow::Result<()> {
    let artifacts = store.encrypted_artifacts()?.len();
    if artifacts == 0 {
        let report = ConsistencyReport {
            working_count: 0,
            failed_count: 0,
            total_sampled: 0,
            total_artifacts: 0,
            consistent: true,
        };
        if ui.mode.is_json() {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else if !ui.quiet {
            println!("{}", badge(ui, Badge::Info, "No encrypted files to check"));
        }
        return Ok(());
    }

    let prompt = PasswordPrompt::Verify {
        artifacts,
        hint: reminder,
    };
    let Some(password) = prompter.password(&prompt)? else {
        eprintln!("{}", badge(ui, Badge::Info, "Cancelled."));
        return Ok(());
    };
    let report = check_consistency(store, password.expose_secret())?;

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !ui.quiet {
        let (kind, message) = if report.consistent {
            (Badge::Ok, "Password opens every sampled file")
        } else if report.working_count == 0 {
            (Badge::Err, "Password opens none of the sampled files")
        } else {
            (Badge::Warn, "Files use more than one password")
        };
        println!("{}", badge(ui, kind, message));
        println!(
            "{}",
            kv(
                ui,
                "Sampled",
                &format!("{} of {}", report.total_sampled, report.total_artifacts)
            )
        );
        println!("{}", kv(ui, "Working", &report.working_count.to_string()));
        println!("{}", kv(ui, "Failed", &report.failed_count.to_string()));
        if !report.consistent && report.working_count > 0 {
            println!(
                "{}",
                hint(
                    ui,
                    "Decrypt the failing files with their old password and encrypt them again."
                )
            );
        }
    }

    if report.working_count == 0 {
        return Err(CliError::auth_failed_with_hint(
            "Incorrect password.",
            "Hint: Encrypted files cannot be recovered without the master password.",
        )
        .into());
    }
    Ok(())
}
