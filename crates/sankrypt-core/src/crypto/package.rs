//! Binary package framing.
//!
//! ```text
//! byte 0:       version (0x01 = AES-256-GCM/PBKDF2-SHA256)
//! bytes 1..17:  salt (16 bytes)
//! bytes 17..29: iv (12 bytes)
//! bytes 29..:   ciphertext || 16-byte authentication tag
//! ```
//!
//! The byte sequence is stored base64-encoded (standard alphabet, padded).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::key::SALT_LENGTH;
use crate::error::{Result, SankryptError};

/// The only package version this build reads and writes.
pub const PACKAGE_VERSION: u8 = 0x01;

/// Length of the AES-GCM nonce.
pub const IV_LENGTH: usize = 12;

/// Length of the AES-GCM authentication tag.
pub const TAG_LENGTH: usize = 16;

/// Bytes before the ciphertext: version + salt + iv.
pub const HEADER_LENGTH: usize = 1 + SALT_LENGTH + IV_LENGTH;

/// A parsed, version-checked encrypted package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPackage {
    salt: [u8; SALT_LENGTH],
    iv: [u8; IV_LENGTH],
    ciphertext: Vec<u8>,
}

impl EncryptedPackage {
    pub(crate) fn new(salt: [u8; SALT_LENGTH], iv: [u8; IV_LENGTH], ciphertext: Vec<u8>) -> Self {
        Self {
            salt,
            iv,
            ciphertext,
        }
    }

    pub fn version(&self) -> u8 {
        PACKAGE_VERSION
    }

    pub fn salt(&self) -> &[u8; SALT_LENGTH] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8; IV_LENGTH] {
        &self.iv
    }

    /// Ciphertext with the authentication tag appended.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Serialize to the raw byte layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LENGTH + self.ciphertext.len());
        bytes.push(PACKAGE_VERSION);
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Serialize to the stored base64 form.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse the raw byte layout.
    ///
    /// # Errors
    ///
    /// Returns `SankryptError::Format` if the version byte is unsupported or
    /// the package is too short to hold a header and a tag. The version is
    /// checked first so a foreign format is reported as such.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let version = *bytes
            .first()
            .ok_or_else(|| SankryptError::Format("Package is empty".to_string()))?;
        if version != PACKAGE_VERSION {
            return Err(SankryptError::Format(format!(
                "Unsupported encryption version 0x{:02x}",
                version
            )));
        }
        if bytes.len() < HEADER_LENGTH + TAG_LENGTH {
            return Err(SankryptError::Format(format!(
                "Package truncated ({} bytes, need at least {})",
                bytes.len(),
                HEADER_LENGTH + TAG_LENGTH
            )));
        }

        let mut salt = [0u8; SALT_LENGTH];
        salt.copy_from_slice(&bytes[1..1 + SALT_LENGTH]);
        let mut iv = [0u8; IV_LENGTH];
        iv.copy_from_slice(&bytes[1 + SALT_LENGTH..HEADER_LENGTH]);

        Ok(Self {
            salt,
            iv,
            ciphertext: bytes[HEADER_LENGTH..].to_vec(),
        })
    }

    /// Parse the stored base64 form. Surrounding whitespace is ignored.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim().as_bytes())
            .map_err(|e| SankryptError::Format(format!("Invalid base64: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}
