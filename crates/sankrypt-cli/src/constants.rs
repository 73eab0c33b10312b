//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, clap usage errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, vault, file).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong password, too many attempts).
    pub const AUTH_FAILED: i32 = 5;

    /// Password change left some artifacts on the old password.
    pub const PARTIAL_REENCRYPTION: i32 = 6;

    /// Artifact is inside its lockout window.
    pub const LOCKED_OUT: i32 = 7;
}

/// Environment variables read by the CLI.
pub mod env {
    pub const PASSWORD: &str = "SANKRYPT_PASSWORD";
    pub const NEW_PASSWORD: &str = "SANKRYPT_NEW_PASSWORD";
    pub const CONFIG: &str = "SANKRYPT_CONFIG";
    pub const LOG: &str = "SANKRYPT_LOG";
}
