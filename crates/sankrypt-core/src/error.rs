//! Error types for Sankrypt core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.
//!
//! User cancellation is deliberately absent: a dismissed prompt is an
//! outcome (`Ok(false)` or [`crate::session::Outcome::Cancelled`]), not an error.

use std::path::PathBuf;

use thiserror::Error;

use crate::crypto::PasswordIssue;

/// Result type alias for Sankrypt operations.
pub type Result<T> = std::result::Result<T, SankryptError>;

/// Core error type for Sankrypt operations.
#[derive(Debug, Error)]
pub enum SankryptError {
    /// Malformed package or unsupported format version. Never retryable.
    #[error("Format error: {0}")]
    Format(String),

    /// Wrong password or tampered ciphertext (tag mismatch)
    #[error("Incorrect password or corrupted data")]
    AuthenticationFailure,

    /// Candidate password fails the strength policy
    #[error("Password does not meet requirements: {}", format_issues(.0))]
    PasswordPolicy(Vec<PasswordIssue>),

    /// New password equals the current one
    #[error("New password cannot be the same as the current password")]
    PasswordUnchanged,

    /// Naming resolver ran out of candidates
    #[error("Could not find a free file name for {} after {attempts} attempts", .path.display())]
    FilenameExhaustion { path: PathBuf, attempts: u32 },

    /// Some artifacts failed during a password change
    #[error("Re-encrypted {success} artifact(s), but {failure} failed; some artifacts may use a different password")]
    PartialReencryption {
        success: usize,
        failure: usize,
        failed: Vec<(PathBuf, String)>,
    },

    /// Artifact is inside its lockout window
    #[error("Decryption of {} is blocked for {remaining_seconds} more second(s)", .path.display())]
    LockedOut {
        path: PathBuf,
        remaining_seconds: u64,
    },

    /// Encryption primitive failure (not an authentication failure)
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Artifact store backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SankryptError {
    /// Whether another password guess may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SankryptError::AuthenticationFailure)
    }
}

fn format_issues(issues: &[PasswordIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
