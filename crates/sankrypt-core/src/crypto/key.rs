//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Every artifact carries its own random salt, so the same master password
//! yields a different key per artifact.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, SankryptError};

/// PBKDF2 iteration count for format version 1.
pub const PBKDF2_ITERATIONS: u32 = 310_000;

/// Length of the salt stored in every package.
pub const SALT_LENGTH: usize = 16;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256).
pub const KEY_LENGTH: usize = 32;

/// A cryptographic key derived from a password.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate cipher operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an AES-256 key from a password and salt.
///
/// Same password + salt always produces the same key.
///
/// # Errors
///
/// Returns `SankryptError::InvalidInput` if the salt is not exactly
/// [`SALT_LENGTH`] bytes.
///
/// # Examples
///
/// ```
/// use sankrypt_core::crypto::derive_key;
///
/// let salt = [7u8; 16];
/// let key = derive_key("correct horse battery", &salt).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(password: &str, salt: &[u8]) -> Result<DerivedKey> {
    if salt.len() != SALT_LENGTH {
        return Err(SankryptError::InvalidInput(format!(
            "Salt must be exactly {} bytes (got {})",
            SALT_LENGTH,
            salt.len()
        )));
    }

    // Derived in place so no unzeroized copy of the key is left on the stack.
    let mut derived = DerivedKey {
        key: [0u8; KEY_LENGTH],
    };
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut derived.key);

    Ok(derived)
}
