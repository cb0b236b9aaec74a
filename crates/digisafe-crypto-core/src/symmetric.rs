//! AES-256-GCM authenticated encryption.
//!
//! This module provides:
//! - [`encrypt`] — encrypt with a fresh random 96-bit nonce, returning [`SealedData`]
//! - [`decrypt`] — authenticate and decrypt [`SealedData`] into a [`SecretBuffer`]
//!
//! The vault uses no additional authenticated data. The tag is kept appended
//! to the ciphertext (`ciphertext || tag`), which is the layout WebCrypto and
//! most other AES-GCM APIs produce, so envelopes stay interchangeable.

use crate::error::CryptoError;
use crate::kdf::KEY_LEN;
use crate::memory::{fill_random, SecretBuffer, SecretBytes};
use ring::aead;
use zeroize::Zeroize;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Output of one encryption: the nonce plus `ciphertext || tag`.
///
/// Any change to either field makes [`decrypt`] fail.
#[must_use = "encrypted data must be stored"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedData {
    /// 96-bit random nonce, unique per encryption.
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted bytes followed by the 16-byte tag.
    pub ciphertext: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Core encryption
// ---------------------------------------------------------------------------

fn aes_key(key: &SecretBytes<KEY_LEN>) -> Result<aead::LessSafeKey, CryptoError> {
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key.expose())
        .map_err(|_| CryptoError::Unexpected("failed to create AES-256-GCM key".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` with a freshly generated nonce.
///
/// # Errors
///
/// Returns `CryptoError::Unexpected` if the CSPRNG or the cipher fails.
pub fn encrypt(plaintext: &[u8], key: &SecretBytes<KEY_LEN>) -> Result<SealedData, CryptoError> {
    let cipher = aes_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    fill_random(&mut nonce_bytes)?;
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    if cipher
        .seal_in_place_append_tag(nonce, aead::Aad::empty(), &mut in_out)
        .is_err()
    {
        in_out.zeroize();
        return Err(CryptoError::Unexpected(
            "AES-256-GCM encryption failed".into(),
        ));
    }

    Ok(SealedData {
        nonce: nonce_bytes,
        ciphertext: in_out,
    })
}

/// Authenticate and decrypt `sealed` under `key`.
///
/// Either the exact original plaintext comes back or the call fails; there
/// is no partial output. The working buffer is zeroized before returning.
///
/// # Errors
///
/// Returns `CryptoError::Authentication` if the tag does not verify (wrong
/// key, altered nonce, altered ciphertext, truncated input).
pub fn decrypt(sealed: &SealedData, key: &SecretBytes<KEY_LEN>) -> Result<SecretBuffer, CryptoError> {
    let cipher = aes_key(key)?;
    let nonce = aead::Nonce::assume_unique_for_key(sealed.nonce);

    let mut in_out = sealed.ciphertext.clone();
    let result = cipher
        .open_in_place(nonce, aead::Aad::empty(), &mut in_out)
        .map(|plaintext| SecretBuffer::new(plaintext))
        .map_err(|_| CryptoError::Authentication);
    in_out.zeroize();
    result
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
