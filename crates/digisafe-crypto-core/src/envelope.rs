//! Persisted vault envelope — salt, nonce, ciphertext as base64 JSON.
//!
//! This module provides:
//! - [`VaultEnvelope`] — the stored record
//! - [`VaultEnvelope::from_json`] / [`VaultEnvelope::to_json`] — string form for a key-value store
//!
//! # Layout
//!
//! ```text
//! { "version": 1, "salt": "<base64>", "iv": "<base64>", "ciphertext": "<base64>" }
//! ```
//!
//! `version` is optional on read: records written before it existed carry
//! only the three base64 fields and are read as version 1. Version 1 means
//! PBKDF2-HMAC-SHA256 with [`PBKDF2_ITERATIONS`](crate::kdf::PBKDF2_ITERATIONS)
//! and AES-256-GCM with the tag appended to the ciphertext.

use crate::error::CryptoError;
use crate::kdf::SALT_LEN;
use crate::symmetric::{SealedData, NONCE_LEN, TAG_LEN};
use data_encoding::BASE64;
use serde::{Deserialize, Serialize};

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

const fn legacy_version() -> u8 {
    ENVELOPE_VERSION
}

/// The only persisted artifact of a vault.
///
/// Holds nothing derived from the PIN except through PBKDF2 and AES-GCM;
/// safe to write to disk or local storage as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEnvelope {
    /// Envelope format version.
    #[serde(default = "legacy_version")]
    pub version: u8,
    /// Base64 of the 16-byte PBKDF2 salt.
    pub salt: String,
    /// Base64 of the 12-byte AES-GCM nonce.
    pub iv: String,
    /// Base64 of `ciphertext || tag`.
    pub ciphertext: String,
}

/// Binary form of an envelope after base64 decoding and length checks.
pub(crate) struct DecodedEnvelope {
    pub salt: [u8; SALT_LEN],
    pub sealed: SealedData,
}

impl VaultEnvelope {
    pub(crate) fn from_parts(salt: &[u8; SALT_LEN], sealed: &SealedData) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            salt: BASE64.encode(salt),
            iv: BASE64.encode(&sealed.nonce),
            ciphertext: BASE64.encode(&sealed.ciphertext),
        }
    }

    /// Parse the stored string form.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if the JSON is malformed, a field
    /// is missing, or the version is not supported.
    pub fn from_json(raw: &str) -> Result<Self, CryptoError> {
        let envelope: Self = serde_json::from_str(raw)
            .map_err(|e| CryptoError::InvalidInput(format!("malformed vault envelope: {e}")))?;
        envelope.check_version()?;
        Ok(envelope)
    }

    /// Serialize to the stored string form.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Unexpected` if serialization fails.
    pub fn to_json(&self) -> Result<String, CryptoError> {
        serde_json::to_string(self)
            .map_err(|e| CryptoError::Unexpected(format!("envelope serialization failed: {e}")))
    }

    /// Reject versions this build cannot read.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for any version other than
    /// [`ENVELOPE_VERSION`].
    pub fn check_version(&self) -> Result<(), CryptoError> {
        if self.version == ENVELOPE_VERSION {
            Ok(())
        } else {
            Err(CryptoError::InvalidInput(format!(
                "unsupported vault envelope version {} (expected {ENVELOPE_VERSION})",
                self.version
            )))
        }
    }

    /// Decode the three base64 fields.
    ///
    /// Every decoding or length problem is reported as
    /// `CryptoError::Authentication`, exactly like a failed tag check, so a
    /// damaged envelope is indistinguishable from a wrong PIN.
    pub(crate) fn decode(&self) -> Result<DecodedEnvelope, CryptoError> {
        self.check_version()?;

        let salt: [u8; SALT_LEN] = decode_fixed(&self.salt)?;
        let nonce: [u8; NONCE_LEN] = decode_fixed(&self.iv)?;
        let ciphertext = BASE64
            .decode(self.ciphertext.as_bytes())
            .map_err(|_| CryptoError::Authentication)?;
        if ciphertext.len() < TAG_LEN {
            return Err(CryptoError::Authentication);
        }

        Ok(DecodedEnvelope {
            salt,
            sealed: SealedData { nonce, ciphertext },
        })
    }

    /// Decoded salt, used to tell whether an envelope still belongs to a key.
    pub(crate) fn decoded_salt(&self) -> Result<[u8; SALT_LEN], CryptoError> {
        decode_fixed(&self.salt)
    }
}

fn decode_fixed<const N: usize>(field: &str) -> Result<[u8; N], CryptoError> {
    let bytes = BASE64
        .decode(field.as_bytes())
        .map_err(|_| CryptoError::Authentication)?;
    bytes.try_into().map_err(|_| CryptoError::Authentication)
}
