//! Sankrypt CLI - encrypt text files in a vault with one master password.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sankrypt_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::constants::env;
use crate::errors::report_error;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        let code = report_error(err);
        std::process::exit(code);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(env::LOG).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli);

    let Some(command) = &cli.command else {
        println!("sankrypt {}", VERSION);
        println!("Run `sankrypt --help` to see available commands.");
        return Ok(());
    };

    match command {
        Commands::Init(args) => commands::handle_init(&ctx, args, cli.vault.as_ref()),
        Commands::Encrypt(args) => commands::handle_encrypt(&ctx, args),
        Commands::Decrypt(args) => commands::handle_decrypt(&ctx, args),
        Commands::List(args) => commands::handle_list(&ctx, args),
        Commands::Check(args) => commands::handle_check(&ctx, args),
        Commands::ChangePassword => commands::handle_change_password(&ctx),
        Commands::Strength(args) => commands::handle_strength(&ctx, args),
        Commands::Shell => commands::handle_shell(&ctx),
        Commands::Completions { shell } => commands::handle_completions(*shell),
    }
}
