//! Safe Folder configuration — plain JSON next to the store.
//!
//! Holds no secrets: only policy knobs that must be readable before the
//! vault is unlocked.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::store::validate_key;

/// Safe Folder policy and storage settings.
///
/// Persisted to `{data_dir}/config.json`. All fields have defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SafeFolderConfig {
    /// Store key the envelope lives under. The attempt counter uses
    /// `{vaultId}.attempts`.
    #[serde(default = "default_vault_id")]
    pub vault_id: String,

    /// Minimum PIN length in characters.
    #[serde(default = "default_min_pin_len")]
    pub min_pin_len: usize,

    /// Maximum PIN length in characters.
    #[serde(default = "default_max_pin_len")]
    pub max_pin_len: usize,

    /// Seconds of inactivity before an unlocked vault locks itself.
    /// `0` disables auto-lock.
    #[serde(default = "default_auto_lock_timeout")]
    pub auto_lock_timeout_secs: u64,

    /// Seed new vaults with the sample evidence list.
    #[serde(default = "default_seed")]
    pub seed_default_evidence: bool,
}

impl Default for SafeFolderConfig {
    fn default() -> Self {
        Self {
            vault_id: default_vault_id(),
            min_pin_len: default_min_pin_len(),
            max_pin_len: default_max_pin_len(),
            auto_lock_timeout_secs: default_auto_lock_timeout(),
            seed_default_evidence: default_seed(),
        }
    }
}

fn default_vault_id() -> String {
    "digisafe_vault".into()
}
const fn default_min_pin_len() -> usize {
    4
}
const fn default_max_pin_len() -> usize {
    6
}
const fn default_auto_lock_timeout() -> u64 {
    900
}
const fn default_seed() -> bool {
    true
}

const CONFIG_FILE: &str = "config.json";

impl SafeFolderConfig {
    /// Load from `{data_dir}/config.json`.
    ///
    /// Missing or unparseable files fall back to [`Default::default()`].
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        fs::read_to_string(&path).map_or_else(
            |_| Self::default(),
            |contents| {
                serde_json::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!(path = %path.display(), "ignoring unreadable config: {e}");
                    Self::default()
                })
            },
        )
    }

    /// Persist to `{data_dir}/config.json` (write `.tmp`, then rename).
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Io` on filesystem failure and
    /// `VaultError::Config` if serialization fails.
    pub fn save(&self, data_dir: &Path) -> Result<(), VaultError> {
        fs::create_dir_all(data_dir)?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::Config(format!("failed to serialize config: {e}")))?;
        let tmp = data_dir.join(format!("{CONFIG_FILE}.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, data_dir.join(CONFIG_FILE))?;
        Ok(())
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Config` for a zero or inverted PIN length range,
    /// or a vault id that is not a valid store key.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.min_pin_len == 0 {
            return Err(VaultError::Config("minPinLen must be at least 1".into()));
        }
        if self.min_pin_len > self.max_pin_len {
            return Err(VaultError::Config(format!(
                "minPinLen ({}) exceeds maxPinLen ({})",
                self.min_pin_len, self.max_pin_len
            )));
        }
        validate_key(&self.vault_id)
            .map_err(|_| VaultError::Config(format!("invalid vaultId {:?}", self.vault_id)))?;
        Ok(())
    }

    /// Idle timeout, or `None` when auto-lock is disabled.
    #[must_use]
    pub const fn auto_lock_timeout(&self) -> Option<Duration> {
        if self.auto_lock_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.auto_lock_timeout_secs))
        }
    }

    /// Store key of the failed-attempt record.
    #[must_use]
    pub fn attempts_key(&self) -> String {
        format!("{}.attempts", self.vault_id)
    }

    /// Enforce the PIN length policy.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidPin` when the PIN is too short or too long.
    pub fn check_pin(&self, pin: &str) -> Result<(), VaultError> {
        let len = pin.chars().count();
        if len < self.min_pin_len {
            return Err(VaultError::InvalidPin(format!(
                "PIN must be at least {} characters",
                self.min_pin_len
            )));
        }
        if len > self.max_pin_len {
            return Err(VaultError::InvalidPin(format!(
                "PIN must be at most {} characters",
                self.max_pin_len
            )));
        }
        Ok(())
    }
}
