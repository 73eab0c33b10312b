use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use sankrypt_core::{LockoutScope, OriginalAction, VERSION};

/// Sankrypt - encrypt text files in a vault with one master password
#[derive(Parser)]
#[command(name = "sankrypt")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault directory
    #[arg(long, global = true, env = "SANKRYPT_VAULT")]
    pub vault: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Vault directory (created if missing)
    #[arg(value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Minutes of inactivity before the shell locks (0 disables)
    #[arg(long, value_name = "MINUTES")]
    pub auto_lock_minutes: Option<u32>,

    /// What to do with the original after encrypting
    #[arg(long, value_enum)]
    pub original: Option<OriginalArg>,

    /// Whether every file keeps its own lockout or only the latest one counts
    #[arg(long, value_enum)]
    pub lockout_scope: Option<ScopeArg>,

    /// Reminder shown when the master password is asked for
    #[arg(long)]
    pub hint: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OriginalArg {
    Remove,
    Keep,
    Ask,
}

impl From<OriginalArg> for OriginalAction {
    fn from(value: OriginalArg) -> Self {
        match value {
            OriginalArg::Remove => OriginalAction::Remove,
            OriginalArg::Keep => OriginalAction::Keep,
            OriginalArg::Ask => OriginalAction::Ask,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    PerArtifact,
    Single,
}

impl From<ScopeArg> for LockoutScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::PerArtifact => LockoutScope::PerArtifact,
            ScopeArg::Single => LockoutScope::Single,
        }
    }
}

/// Arguments for the `encrypt` command
#[derive(Args)]
pub struct EncryptArgs {
    /// File to encrypt, relative to the vault
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Keep the plaintext original
    #[arg(long)]
    pub keep: bool,
}

/// Arguments for the `decrypt` command
#[derive(Args)]
pub struct DecryptArgs {
    /// Encrypted file, relative to the vault
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the plaintext instead of writing it back to the vault
    #[arg(long)]
    pub stdout: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Include plaintext files
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands that only toggle JSON output
#[derive(Args)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config file and vault directory
    Init(InitArgs),

    /// Encrypt a file with the master password
    Encrypt(EncryptArgs),

    /// Decrypt an encrypted file
    ///
    /// Failed attempts are only counted within one process, so a lockout
    /// ends when this command exits. Use `sankrypt shell` to have repeated
    /// wrong passwords lock a file out.
    Decrypt(DecryptArgs),

    /// List files in the vault
    List(ListArgs),

    /// Check that the master password opens the vault's files
    Check(JsonArgs),

    /// Re-encrypt every file under a new master password
    ChangePassword,

    /// Score a candidate password
    Strength(JsonArgs),

    /// Interactive session that stays unlocked until idle
    Shell,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Commands accepted inside `sankrypt shell`.
#[derive(Parser)]
#[command(name = "sankrypt-shell", no_binary_name = true, disable_version_flag = true)]
#[command(help_template = "{subcommands}")]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand)]
pub enum ShellCommand {
    /// Encrypt a file
    Encrypt(EncryptArgs),
    /// Decrypt a file back into the vault
    Decrypt(DecryptArgs),
    /// Print a decrypted file
    Show {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List files
    List(ListArgs),
    /// Check password consistency
    Check,
    /// Show lock state and lockouts
    Status,
    /// Lock the session now
    Lock,
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
        ShellLine::command().debug_assert();
    }

    #[test]
    fn test_shell_line_parses_without_binary_name() {
        let line = ShellLine::try_parse_from(["encrypt", "notes/a.md", "--keep"]).unwrap();
        match line.command {
            ShellCommand::Encrypt(args) => {
                assert_eq!(args.file, PathBuf::from("notes/a.md"));
                assert!(args.keep);
            }
            _ => panic!("expected encrypt"),
        }
        assert!(matches!(
            ShellLine::try_parse_from(["quit"]).unwrap().command,
            ShellCommand::Exit
        ));
    }

    #[test]
    fn test_decrypt_help_says_lockout_is_per_process() {
        let cli = Cli::command();
        let decrypt = cli.find_subcommand("decrypt").unwrap();
        let long_about = decrypt.get_long_about().unwrap().to_string();
        assert!(long_about.contains("only counted within one process"));
        assert!(long_about.contains("sankrypt shell"));
    }
}
