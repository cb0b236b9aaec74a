//! `digisafe-crypto-core` — Safe Folder cryptography for DigiSafe.
//!
//! PIN → PBKDF2-HMAC-SHA256 → AES-256-GCM → base64 JSON envelope.
//! Zero I/O, zero persistence: storing the envelope is the caller's job,
//! and nothing in this crate logs PINs, keys, or plaintext.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod kdf;
pub mod symmetric;

pub mod envelope;
pub mod vault;

pub use envelope::{VaultEnvelope, ENVELOPE_VERSION};
pub use error::CryptoError;
pub use kdf::{generate_salt, KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
pub use memory::{disable_core_dumps, SecretBuffer, SecretBytes};
pub use symmetric::{SealedData, NONCE_LEN, TAG_LEN};
pub use vault::{create_vault, derive_key, open_vault, VaultKey};
