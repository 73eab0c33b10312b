//! Interactive session: unlock once, run commands until idle or exit.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use clap::Parser;

use sankrypt_core::{AutoLockTimer, FsStore, Session, SessionObserver, SessionStatus};

use crate::app::{vault_relative, AppContext, TerminalPrompter};
use crate::cli::{DecryptArgs, ShellCommand, ShellLine};
use crate::errors::report_error;
use crate::ui::{badge, kv, Badge, UiContext};

use super::{check, files, list};

/// Prints lock changes as they happen, including from the auto-lock thread.
struct StatusPrinter {
    ui: UiContext,
}

impl SessionObserver for StatusPrinter {
    fn status_changed(&self, status: SessionStatus) {
        let line = match status {
            SessionStatus::Locked => badge(&self.ui, Badge::Locked, "Session locked"),
            SessionStatus::Unlocked => badge(&self.ui, Badge::Info, "Session unlocked"),
        };
        eprintln!("{}", line);
    }
}

enum Flow {
    Continue,
    Exit,
}

pub fn handle_shell(ctx: &AppContext) -> anyhow::Result<()> {
    let ui = ctx.ui(false);
    let store = ctx.open_store()?;
    let prompter = ctx.prompter(&ui);

    let mut session = ctx.new_session()?;
    session.subscribe(Arc::new(StatusPrinter { ui: ui.clone() }));
    let auto_lock_minutes = session.config().auto_lock_minutes;
    let session = Arc::new(Mutex::new(session));
    let timer = if auto_lock_minutes > 0 {
        Some(AutoLockTimer::start(Arc::clone(&session))?)
    } else {
        None
    };

    if !ui.quiet {
        println!(
            "{}",
            badge(
                &ui,
                Badge::Info,
                &format!("Sankrypt shell for {}", store.root().display())
            )
        );
        println!("Type `help` for commands, `exit` to leave.");
    }
    if prompter.has_env_password() {
        let mut guard = acquire(&session);
        if let Err(err) = guard.ensure_password(&store, &prompter, false, false) {
            report_error(err.into());
        }
    }

    let mut line = String::new();
    loop {
        print_prompt(&session)?;
        line.clear();
        if std::io::stdin().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        if words == ["help"] {
            print_help();
            continue;
        }

        let parsed = match ShellLine::try_parse_from(words.iter().copied()) {
            Ok(parsed) => parsed,
            Err(err) => {
                let _ = err.print();
                continue;
            }
        };

        let mut guard = acquire(&session);
        guard.auto_lock_if_idle();
        match run_line(&mut guard, &store, &prompter, &ui, parsed.command) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(err) => {
                report_error(err);
            }
        }
    }

    if let Some(timer) = timer {
        timer.stop();
    }
    acquire(&session).lock();
    Ok(())
}

fn run_line(
    session: &mut Session,
    store: &FsStore,
    prompter: &TerminalPrompter,
    ui: &UiContext,
    command: ShellCommand,
) -> anyhow::Result<Flow> {
    match command {
        ShellCommand::Encrypt(args) => files::encrypt(session, store, prompter, ui, &args)?,
        ShellCommand::Decrypt(args) => files::decrypt(session, store, prompter, ui, &args)?,
        ShellCommand::Show { file } => {
            let args = DecryptArgs { file, stdout: true };
            files::decrypt(session, store, prompter, ui, &args)?
        }
        ShellCommand::List(args) => {
            let ui = UiContext {
                mode: if args.json {
                    crate::ui::OutputMode::Json
                } else {
                    ui.mode
                },
                ..ui.clone()
            };
            list::list(store, &ui, &args)?
        }
        ShellCommand::Check => {
            check::check(store, prompter, ui, session.config().password_hint.clone())?
        }
        ShellCommand::Status => print_status(session, store, ui)?,
        ShellCommand::Lock => {
            if !session.lock() {
                println!("{}", badge(ui, Badge::Info, "Already locked"));
            }
        }
        ShellCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

fn print_status(session: &mut Session, store: &FsStore, ui: &UiContext) -> anyhow::Result<()> {
    let state = match session.status() {
        SessionStatus::Locked => "locked",
        SessionStatus::Unlocked => "unlocked",
    };
    println!("{}", kv(ui, "Session", state));
    let minutes = session.config().auto_lock_minutes;
    let auto_lock = if minutes == 0 {
        "off".to_string()
    } else {
        format!("after {} min idle", minutes)
    };
    println!("{}", kv(ui, "Auto-lock", &auto_lock));
    println!(
        "{}",
        kv(ui, "Idle", &format!("{}s", session.idle_for().as_secs()))
    );

    let blocked: Vec<_> = session
        .lockout()
        .active_records()
        .into_iter()
        .map(|record| record.artifact_path)
        .collect();
    for path in blocked {
        let status = session.is_blocked(&path);
        if status.blocked {
            let shown = vault_relative(store.root(), &path);
            println!(
                "{}",
                badge(
                    ui,
                    Badge::Locked,
                    &format!(
                        "{} blocked for {}s",
                        shown.display(),
                        status.remaining_seconds
                    )
                )
            );
        }
    }
    Ok(())
}

fn print_prompt(session: &Arc<Mutex<Session>>) -> std::io::Result<()> {
    let marker = if acquire(session).is_unlocked() { "" } else { " [locked]" };
    let mut stdout = std::io::stdout();
    write!(stdout, "sankrypt{}> ", marker)?;
    stdout.flush()
}

fn print_help() {
    let mut command = <ShellLine as clap::CommandFactory>::command();
    let _ = command.print_help();
    println!();
}

fn acquire(session: &Arc<Mutex<Session>>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
