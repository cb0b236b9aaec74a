//! Vault sealing and opening — PIN → key → AES-GCM → [`VaultEnvelope`].
//!
//! This module provides:
//! - [`create_vault`] — seal a payload under a PIN with a fresh salt and nonce
//! - [`open_vault`] — re-derive the key from the stored salt and open the envelope
//! - [`VaultKey`] — a derived key bound to its salt, for re-sealing a vault
//!   after edits without asking for the PIN again
//!
//! Payloads are any `serde` type; they are encrypted as UTF-8 JSON. The
//! intermediate JSON bytes are zeroized after use.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::envelope::VaultEnvelope;
use crate::error::CryptoError;
use crate::kdf::{self, KEY_LEN, SALT_LEN};
use crate::memory::SecretBytes;
use crate::symmetric;

/// A PBKDF2-derived vault key together with the salt it came from.
///
/// Lives only in memory and is zeroized on drop. Sealing with it reuses the
/// salt and draws a fresh nonce for every call.
pub struct VaultKey {
    salt: [u8; SALT_LEN],
    key: SecretBytes<KEY_LEN>,
}

impl VaultKey {
    /// Derive a key for a brand-new vault (fresh random salt).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for an empty PIN and
    /// `CryptoError::Unexpected` if the CSPRNG fails.
    pub fn generate(pin: &str) -> Result<Self, CryptoError> {
        let salt = kdf::generate_salt()?;
        Self::derive(pin, &salt)
    }

    /// Re-derive the key for an existing salt.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for an empty PIN or a salt that is
    /// not 16 bytes.
    pub fn derive(pin: &str, salt: &[u8]) -> Result<Self, CryptoError> {
        let key = kdf::derive_key(pin, salt)?;
        let mut fixed = [0u8; SALT_LEN];
        fixed.copy_from_slice(salt);
        Ok(Self { salt: fixed, key })
    }

    /// Derive the key from an envelope's salt and open it in one step.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for an empty PIN or unsupported
    /// envelope version, and `CryptoError::Authentication` for a wrong PIN
    /// or any damage to the envelope.
    pub fn unlock<T: DeserializeOwned>(
        envelope: &VaultEnvelope,
        pin: &str,
    ) -> Result<(Self, T), CryptoError> {
        if pin.is_empty() {
            return Err(CryptoError::InvalidInput("PIN must not be empty".into()));
        }
        envelope.check_version()?;
        let salt = match envelope.decoded_salt() {
            Ok(salt) => salt,
            Err(e) => {
                // Spend the same derivation time as a wrong PIN would.
                drop(kdf::derive_key(pin, &[0u8; SALT_LEN])?);
                return Err(e);
            }
        };
        let key = Self::derive(pin, &salt)?;
        let payload = key.open(envelope)?;
        Ok((key, payload))
    }

    /// The salt this key was derived with.
    #[must_use]
    pub const fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// Encrypt `payload` into a new envelope (fresh nonce, same salt).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Unexpected` if the payload cannot be serialized
    /// or the cipher fails.
    pub fn seal<T: Serialize + ?Sized>(&self, payload: &T) -> Result<VaultEnvelope, CryptoError> {
        let plaintext = Zeroizing::new(serde_json::to_vec(payload).map_err(|e| {
            CryptoError::Unexpected(format!("payload serialization failed: {e}"))
        })?);
        let sealed = symmetric::encrypt(&plaintext, &self.key)?;
        Ok(VaultEnvelope::from_parts(&self.salt, &sealed))
    }

    /// Decrypt an envelope sealed under this key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Authentication` if the envelope was sealed under a
    /// different salt or key, or has been altered. Returns
    /// `CryptoError::Unexpected` if the authenticated plaintext does not
    /// deserialize into `T`.
    pub fn open<T: DeserializeOwned>(&self, envelope: &VaultEnvelope) -> Result<T, CryptoError> {
        let decoded = envelope.decode()?;
        if decoded.salt != self.salt {
            return Err(CryptoError::Authentication);
        }
        let plaintext = symmetric::decrypt(&decoded.sealed, &self.key)?;
        serde_json::from_slice(plaintext.expose()).map_err(|e| {
            CryptoError::Unexpected(format!(
                "decrypted payload does not match the expected shape: {e}"
            ))
        })
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultKey(***)")
    }
}

/// Derive the vault key for `pin` and `salt`.
///
/// Thin wrapper over [`kdf::derive_key`], kept here so the three vault
/// operations live side by side.
///
/// # Errors
///
/// See [`kdf::derive_key`].
pub fn derive_key(pin: &str, salt: &[u8]) -> Result<SecretBytes<KEY_LEN>, CryptoError> {
    kdf::derive_key(pin, salt)
}

/// Seal `payload` under `pin` with a fresh salt and nonce.
///
/// Pure computation; persisting the envelope is the caller's job.
///
/// # Errors
///
/// Returns `CryptoError::InvalidInput` for an empty PIN and
/// `CryptoError::Unexpected` for serialization, CSPRNG or cipher failures.
pub fn create_vault<T: Serialize + ?Sized>(
    payload: &T,
    pin: &str,
) -> Result<VaultEnvelope, CryptoError> {
    VaultKey::generate(pin)?.seal(payload)
}

/// Open an envelope with `pin`.
///
/// # Errors
///
/// Returns `CryptoError::Authentication` for a wrong PIN or any corruption of
/// the envelope (no finer distinction is made), `CryptoError::InvalidInput`
/// for an empty PIN or unsupported version.
pub fn open_vault<T: DeserializeOwned>(envelope: &VaultEnvelope, pin: &str) -> Result<T, CryptoError> {
    VaultKey::unlock(envelope, pin).map(|(_, payload)| payload)
}
