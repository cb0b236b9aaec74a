//! PIN-based key derivation (PBKDF2-HMAC-SHA256).
//!
//! This module provides:
//! - [`derive_key`] — turn a PIN and a 16-byte salt into a 256-bit AES key
//! - [`generate_salt`] — fresh random salt for a new vault
//!
//! # Parameters
//!
//! The iteration count is a fixed property of envelope format version 1 and
//! is not configurable per call. An envelope written with another count would
//! otherwise be silently misread as a wrong PIN. A future change of count
//! must come with a new envelope version.

use crate::error::CryptoError;
use crate::memory::{fill_random, SecretBytes};
use zeroize::Zeroize;

/// PBKDF2 iteration count for envelope format version 1.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Derive the vault key from `pin` and `salt`.
///
/// Deterministic: the same `(pin, salt)` always yields the same key. The PIN
/// is used as its UTF-8 bytes. Deliberately slow; callers with a UI thread
/// should run it off that thread.
///
/// # Errors
///
/// Returns `CryptoError::InvalidInput` if the PIN is empty or the salt is not
/// exactly [`SALT_LEN`] bytes.
pub fn derive_key(pin: &str, salt: &[u8]) -> Result<SecretBytes<KEY_LEN>, CryptoError> {
    if pin.is_empty() {
        return Err(CryptoError::InvalidInput("PIN must not be empty".into()));
    }
    if salt.len() != SALT_LEN {
        return Err(CryptoError::InvalidInput(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }

    let mut output = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(pin.as_bytes(), salt, PBKDF2_ITERATIONS, &mut output);

    let key = SecretBytes::new(output);
    output.zeroize();
    Ok(key)
}

/// Generate a fresh salt from the OS CSPRNG.
///
/// # Errors
///
/// Returns `CryptoError::Unexpected` if the CSPRNG fails.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;
    Ok(salt)
}
