//! Failed-unlock bookkeeping and brute-force backoff.
//!
//! The record is stored next to the envelope as `{vaultId}.attempts`. It
//! contains only a counter and a timestamp, never anything PIN-derived.

use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::store::KeyValueStore;

/// Brute-force backoff schedule: `(min_failed_attempts, delay_ms)`.
///
/// Checked in order — first matching threshold wins.
const BACKOFF_SCHEDULE: &[(u32, u64)] = &[
    (10, 300_000), // 10+ attempts → 5 minutes
    (8, 30_000),   //  8+ attempts → 30 seconds
    (5, 5_000),    //  5+ attempts → 5 seconds
    (3, 1_000),    //  3+ attempts → 1 second
];

/// Consecutive failed unlock attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// Failures since the last successful unlock.
    pub attempts: u32,
    /// Epoch seconds of the most recent failure.
    pub last_attempt_at: Option<u64>,
}

impl AttemptRecord {
    /// Read the record under `key`; absent means no failures.
    ///
    /// An unreadable record is treated as absent: whoever can corrupt it can
    /// also delete it.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn load(store: &impl KeyValueStore, key: &str) -> Result<Self, VaultError> {
        let Some(raw) = store.get(key)? else {
            return Ok(Self::default());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("discarding unreadable attempt record: {e}");
            Self::default()
        }))
    }

    /// Write the record under `key`, or remove it when there are no failures.
    ///
    /// # Errors
    ///
    /// Propagates store write failures.
    pub fn save(&self, store: &mut impl KeyValueStore, key: &str) -> Result<(), VaultError> {
        if self.attempts == 0 {
            return store.remove(key);
        }
        let json = serde_json::to_string(self)
            .map_err(|e| VaultError::Storage(format!("failed to serialize attempts: {e}")))?;
        store.set(key, &json)
    }

    /// Milliseconds left before another attempt is allowed, if any.
    #[must_use]
    pub fn cooldown_remaining(&self, now_secs: u64) -> Option<u64> {
        let delay_ms = required_delay_ms(self.attempts);
        if delay_ms == 0 {
            return None;
        }
        let last_attempt = self.last_attempt_at?;
        let elapsed_ms = now_secs.saturating_sub(last_attempt).saturating_mul(1000);
        if elapsed_ms < delay_ms {
            Some(delay_ms.saturating_sub(elapsed_ms))
        } else {
            None
        }
    }

    /// Count one more failure at `now_secs`.
    pub fn record_failure(&mut self, now_secs: u64) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_attempt_at = Some(now_secs);
    }
}

/// Delay (ms) imposed after `attempts` consecutive failures.
#[must_use]
pub fn required_delay_ms(attempts: u32) -> u64 {
    BACKOFF_SCHEDULE
        .iter()
        .find(|&&(threshold, _)| attempts >= threshold)
        .map_or(0, |&(_, delay)| delay)
}

/// Current time as seconds since the Unix epoch.
#[must_use]
pub fn current_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
