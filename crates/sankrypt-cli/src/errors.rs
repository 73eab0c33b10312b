//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use sankrypt_core::SankryptError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, vault, file)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong password, too many attempts)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Some artifacts could not be re-encrypted
    PartialReencryption(String),

    /// Artifact is temporarily blocked
    LockedOut(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => write!(f, "{}\n{}", message, hint),
            CliError::AuthFailed { message, hint } => match hint {
                Some(h) => write!(f, "{}\n{}", message, h),
                None => write!(f, "{}", message),
            },
            CliError::InvalidInput(message)
            | CliError::PartialReencryption(message)
            | CliError::LockedOut(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::PartialReencryption(_) => exit_codes::PARTIAL_REENCRYPTION,
            CliError::LockedOut(_) => exit_codes::LOCKED_OUT,
        }
    }
}

impl From<SankryptError> for CliError {
    fn from(err: SankryptError) -> Self {
        match err {
            SankryptError::AuthenticationFailure => CliError::auth_failed_with_hint(
                "Incorrect password.",
                "Hint: Encrypted files cannot be recovered without the master password.",
            ),
            SankryptError::NotFound(what) => CliError::not_found(
                format!("Not found: {}", what),
                "Hint: File paths are relative to the vault directory.",
            ),
            SankryptError::LockedOut {
                path,
                remaining_seconds,
            } => CliError::LockedOut(format!(
                "Too many failed attempts on {}. Try again in {} second(s).",
                path.display(),
                remaining_seconds
            )),
            err @ SankryptError::PartialReencryption { .. } => {
                CliError::PartialReencryption(err.to_string())
            }
            other => CliError::InvalidInput(other.to_string()),
        }
    }
}

/// Exit code for an error that reached `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code();
    }
    match err.downcast_ref::<SankryptError>() {
        Some(SankryptError::AuthenticationFailure) => exit_codes::AUTH_FAILED,
        Some(SankryptError::NotFound(_)) => exit_codes::NOT_FOUND,
        Some(SankryptError::LockedOut { .. }) => exit_codes::LOCKED_OUT,
        Some(SankryptError::PartialReencryption { .. }) => exit_codes::PARTIAL_REENCRYPTION,
        Some(
            SankryptError::PasswordPolicy(_)
            | SankryptError::PasswordUnchanged
            | SankryptError::InvalidInput(_)
            | SankryptError::FilenameExhaustion { .. }
            | SankryptError::Format(_),
        ) => exit_codes::INVALID_INPUT,
        _ => 1,
    }
}

/// Print an error that reached the top level and return its exit code.
pub fn report_error(err: anyhow::Error) -> i32 {
    let code = exit_code_for(&err);
    match err.downcast::<SankryptError>() {
        Ok(core) => eprintln!("Error: {}", CliError::from(core)),
        Err(err) => eprintln!("Error: {:#}", err),
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let cases = [
            (SankryptError::AuthenticationFailure, exit_codes::AUTH_FAILED),
            (SankryptError::NotFound("x".into()), exit_codes::NOT_FOUND),
            (
                SankryptError::LockedOut {
                    path: PathBuf::from("a.skenc"),
                    remaining_seconds: 12,
                },
                exit_codes::LOCKED_OUT,
            ),
            (
                SankryptError::PartialReencryption {
                    success: 2,
                    failure: 1,
                    failed: Vec::new(),
                },
                exit_codes::PARTIAL_REENCRYPTION,
            ),
            (SankryptError::PasswordUnchanged, exit_codes::INVALID_INPUT),
        ];
        for (err, code) in cases {
            assert_eq!(CliError::from(err).exit_code(), code);
        }
    }

    #[test]
    fn test_exit_code_for_anyhow_errors() {
        let err = anyhow::Error::new(SankryptError::AuthenticationFailure);
        assert_eq!(exit_code_for(&err), exit_codes::AUTH_FAILED);

        let err = anyhow::Error::new(CliError::invalid_input("bad"));
        assert_eq!(exit_code_for(&err), exit_codes::INVALID_INPUT);

        let err = anyhow::anyhow!("plain failure");
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_locked_out_message_mentions_wait() {
        let err = CliError::from(SankryptError::LockedOut {
            path: PathBuf::from("a.skenc"),
            remaining_seconds: 42,
        });
        assert!(err.to_string().contains("42 second(s)"));
    }
}
