//! AES-256-GCM text encryption with per-call salt and nonce.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use tracing::debug;
use zeroize::Zeroize;

use super::key::{derive_key, DerivedKey, SALT_LENGTH};
use super::package::{EncryptedPackage, IV_LENGTH};
use super::random_bytes;
use crate::error::{Result, SankryptError};

const SELF_TEST_PROBE: &str = "Sankrypt encryption test";

fn cipher_for(key: &DerivedKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SankryptError::Crypto(format!("Invalid AES key: {}", e)))
}

/// Encrypt text with a password into a base64 package.
///
/// A fresh salt and nonce are drawn for every call, so encrypting the same
/// text twice never yields the same package.
///
/// # Examples
///
/// ```
/// use sankrypt_core::crypto::{decrypt, encrypt};
///
/// let package = encrypt("secret note", "Tr0ub4dor&9Zx").unwrap();
/// assert_eq!(decrypt(&package, "Tr0ub4dor&9Zx").unwrap(), "secret note");
/// ```
pub fn encrypt(plaintext: &str, password: &str) -> Result<String> {
    let salt: [u8; SALT_LENGTH] = random_bytes()?;
    let iv: [u8; IV_LENGTH] = random_bytes()?;
    let key = derive_key(password, &salt)?;

    let ciphertext = cipher_for(&key)?
        .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|e| SankryptError::Crypto(format!("Encryption failed: {}", e)))?;

    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "encrypted package"
    );
    Ok(EncryptedPackage::new(salt, iv, ciphertext).to_base64())
}

/// Decrypt a base64 package with a password.
///
/// # Errors
///
/// - `SankryptError::Format` for malformed packages or unsupported versions;
///   no key derivation is attempted in that case.
/// - `SankryptError::AuthenticationFailure` when the tag does not verify,
///   which covers both a wrong password and tampered bytes.
pub fn decrypt(package: &str, password: &str) -> Result<String> {
    let package = EncryptedPackage::from_base64(package)?;
    decrypt_package(&package, password)
}

/// Decrypt an already-parsed package.
pub fn decrypt_package(package: &EncryptedPackage, password: &str) -> Result<String> {
    let key = derive_key(password, package.salt())?;

    let plaintext = cipher_for(&key)?
        .decrypt(Nonce::from_slice(package.iv()), package.ciphertext())
        .map_err(|_| SankryptError::AuthenticationFailure)?;

    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        SankryptError::Format("Decrypted content is not valid UTF-8".to_string())
    })
}

/// Check that a password survives an encrypt/decrypt cycle.
pub fn self_test(password: &str) -> bool {
    encrypt(SELF_TEST_PROBE, password)
        .and_then(|package| decrypt(&package, password))
        .map(|text| text == SELF_TEST_PROBE)
        .unwrap_or(false)
}
