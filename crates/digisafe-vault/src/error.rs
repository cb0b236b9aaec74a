//! Vault error types for `digisafe-vault`.

use digisafe_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by Safe Folder operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Cryptographic operation failed (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// No vault has been created under the configured identifier.
    #[error("no vault found")]
    NoVault,

    /// A vault already exists; reset it before creating a new one.
    #[error("a vault already exists")]
    VaultAlreadyExists,

    /// Vault is locked — operation requires an unlocked vault.
    #[error("vault is locked")]
    Locked,

    /// PIN does not satisfy the configured policy.
    #[error("invalid PIN: {0}")]
    InvalidPin(String),

    /// Too many failed unlock attempts — brute-force cooldown active.
    #[error("rate limited: {remaining_ms}ms remaining")]
    RateLimited {
        /// Milliseconds remaining in the cooldown period.
        remaining_ms: u64,
    },

    /// Reset was requested without explicit confirmation.
    #[error("reset not confirmed")]
    ResetNotConfirmed,

    /// Evidence item fields are unusable (unknown kind, empty name).
    #[error("invalid evidence item: {0}")]
    InvalidItem(String),

    /// Evidence item not found by ID.
    #[error("evidence item not found: {0}")]
    ItemNotFound(u64),

    /// The key-value store rejected a key or held unreadable data.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Short message suitable for the person at the keyboard.
    ///
    /// Every authentication failure reads the same, whatever its cause.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Crypto(e) => e.user_message().into(),
            Self::NoVault => "no Safe Folder exists yet".into(),
            Self::VaultAlreadyExists => "a Safe Folder already exists".into(),
            Self::Locked => "the Safe Folder is locked".into(),
            Self::InvalidPin(reason) | Self::InvalidItem(reason) => reason.clone(),
            Self::RateLimited { remaining_ms } => {
                format!(
                    "too many attempts, try again in {}s",
                    remaining_ms.div_ceil(1000)
                )
            }
            Self::ResetNotConfirmed => "reset must be confirmed".into(),
            Self::ItemNotFound(id) => format!("no evidence item with id {id}"),
            Self::Storage(_) | Self::Io(_) | Self::Config(_) => {
                "something went wrong, please try again".into()
            }
        }
    }

    /// `true` for a wrong PIN or a damaged envelope.
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::Crypto(CryptoError::Authentication))
    }
}
