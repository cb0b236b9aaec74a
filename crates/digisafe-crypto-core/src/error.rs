//! Cryptographic error types for `digisafe-crypto-core`.

use thiserror::Error;

/// Errors produced by vault cryptography.
///
/// The taxonomy is intentionally coarse. A wrong PIN and a corrupted or
/// tampered envelope both surface as [`CryptoError::Authentication`] and
/// carry no detail, so the error itself cannot be used to tell the two apart.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Caller-supplied input is malformed (envelope JSON, salt length,
    /// empty PIN, unsupported envelope version). Recoverable by re-prompting.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// AEAD verification failed — wrong PIN, or the envelope was altered.
    #[error("incorrect PIN or corrupted data")]
    Authentication,

    /// A primitive failed for a reason unrelated to authentication
    /// (cipher setup, CSPRNG, payload serialization).
    #[error("unexpected cryptographic failure: {0}")]
    Unexpected(String),
}

impl CryptoError {
    /// Short message suitable for showing to the person at the keyboard.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid input, please try again",
            Self::Authentication => "incorrect PIN",
            Self::Unexpected(_) => "something went wrong, please try again",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_error_carries_no_detail() {
        let msg = CryptoError::Authentication.to_string();
        assert_eq!(msg, "incorrect PIN or corrupted data");
        assert_eq!(CryptoError::Authentication.user_message(), "incorrect PIN");
    }

    #[test]
    fn unexpected_error_maps_to_retry_message() {
        let err = CryptoError::Unexpected("boom".into());
        assert!(err.to_string().contains("boom"));
        assert!(err.user_message().contains("try again"));
    }
}
