//! Cryptographic operations for Sankrypt.
//!
//! - **PBKDF2-HMAC-SHA256** (310,000 rounds) derives a 256-bit key per artifact
//! - **AES-256-GCM** encrypts and authenticates the text
//! - A one-byte version header lets the package format evolve
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of encrypted artifacts
//! - Offline brute-force attacks on the master password
//! - Silent tampering with stored packages
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session's memory

pub mod cipher;
pub mod key;
pub mod package;
pub mod password;

pub use cipher::{decrypt, decrypt_package, encrypt, self_test};
pub use key::{derive_key, DerivedKey, PBKDF2_ITERATIONS};
pub use package::{EncryptedPackage, PACKAGE_VERSION};
pub use password::{
    password_hint, score_strength, validate_password, PasswordIssue, PasswordReport,
    MIN_PASSWORD_LENGTH,
};

use crate::error::{Result, SankryptError};

/// Fill a fixed-size array from the operating system CSPRNG.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| SankryptError::Crypto(format!("Failed to generate random bytes: {}", e)))?;
    Ok(bytes)
}
