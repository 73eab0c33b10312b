//! encrypt, decrypt and show.

use std::io::Write;
use std::path::Path;

use sankrypt_core::{ConsistencyWarning, FileReport, FsStore, Outcome, Prompter, Session};

use crate::app::{vault_relative, AppContext};
use crate::cli::{DecryptArgs, EncryptArgs};
use crate::ui::{badge, hint, kv, Badge, UiContext};

pub fn handle_encrypt(ctx: &AppContext, args: &EncryptArgs) -> anyhow::Result<()> {
    let ui = ctx.ui(false);
    let store = ctx.open_store()?;
    let mut session = ctx.new_session()?;
    let prompter = ctx.prompter(&ui);
    encrypt(&mut session, &store, &prompter, &ui, args)
}

pub fn handle_decrypt(ctx: &AppContext, args: &DecryptArgs) -> anyhow::Result<()> {
    let ui = ctx.ui(false);
    let store = ctx.open_store()?;
    let mut session = ctx.new_session()?;
    let prompter = ctx.prompter(&ui);
    decrypt(&mut session, &store, &prompter, &ui, args)
}

pub(super) fn encrypt(
    session: &mut Session,
    store: &FsStore,
    prompter: &dyn Prompter,
    ui: &UiContext,
    args: &EncryptArgs,
) -> anyhow::Result<()> {
    let path = vault_relative(store.root(), &args.file);
    let keep = args.keep.then_some(true);
    match session.encrypt_file(store, prompter, &path, keep)? {
        Outcome::Done(report) => print_report(ui, "Encrypted", &report),
        Outcome::Cancelled => cancelled(ui),
    }
    Ok(())
}

pub(super) fn decrypt(
    session: &mut Session,
    store: &FsStore,
    prompter: &dyn Prompter,
    ui: &UiContext,
    args: &DecryptArgs,
) -> anyhow::Result<()> {
    if args.stdout {
        return show(session, store, prompter, ui, &args.file);
    }
    let path = vault_relative(store.root(), &args.file);
    match session.decrypt_file(store, prompter, &path)? {
        Outcome::Done(report) => print_report(ui, "Decrypted", &report),
        Outcome::Cancelled => cancelled(ui),
    }
    Ok(())
}

/// Print an artifact's plaintext without touching the vault.
pub(super) fn show(
    session: &mut Session,
    store: &FsStore,
    prompter: &dyn Prompter,
    ui: &UiContext,
    file: &Path,
) -> anyhow::Result<()> {
    let path = vault_relative(store.root(), file);
    let decrypted = match session.decrypt_artifact(store, prompter, &path)? {
        Outcome::Done(decrypted) => decrypted,
        Outcome::Cancelled => {
            cancelled(ui);
            return Ok(());
        }
    };
    if let Some(warning) = &decrypted.warning {
        print_warning(ui, warning);
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(decrypted.plaintext.as_bytes())?;
    if !decrypted.plaintext.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

fn print_report(ui: &UiContext, verb: &str, report: &FileReport) {
    if let Some(warning) = &report.warning {
        print_warning(ui, warning);
    }
    if ui.quiet {
        println!("{}", report.target.display());
        return;
    }
    println!(
        "{}",
        badge(
            ui,
            Badge::Ok,
            &format!(
                "{} {} -> {}",
                verb,
                report.source.display(),
                report.target.display()
            )
        )
    );
    if report.renamed {
        println!("{}", kv(ui, "Renamed", "target name was taken"));
    }
    if !report.source_removed {
        println!(
            "{}",
            hint(
                ui,
                &format!("Original kept at {}", report.source.display())
            )
        );
    }
}

fn print_warning(ui: &UiContext, warning: &ConsistencyWarning) {
    eprintln!("{}", badge(ui, Badge::Warn, &warning.to_string()));
    eprintln!(
        "{}",
        hint(ui, "Run `sankrypt check` to see which password your files use.")
    );
}

fn cancelled(ui: &UiContext) {
    if !ui.quiet {
        eprintln!("{}", badge(ui, Badge::Info, "Cancelled. Nothing was changed."));
    }
}
