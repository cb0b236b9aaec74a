//! Unlocked-session state: the derived key and the decrypted evidence list.

use std::fmt;
use std::time::{Duration, Instant};

use digisafe_crypto_core::VaultKey;
use zeroize::Zeroize;

use crate::evidence::EvidenceItem;

/// Everything that exists only while the vault is unlocked.
///
/// Dropping the session zeroizes the evidence list; the key zeroizes itself.
pub struct UnlockedSession {
    pub(crate) key: VaultKey,
    pub(crate) items: Vec<EvidenceItem>,
    last_activity: Instant,
}

impl UnlockedSession {
    pub(crate) fn new(key: VaultKey, items: Vec<EvidenceItem>, now: Instant) -> Self {
        Self {
            key,
            items,
            last_activity: now,
        }
    }

    /// Decrypted evidence items.
    #[must_use]
    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// `true` once `timeout` has passed since the last activity.
    #[must_use]
    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) >= timeout
    }

    /// Replace the evidence list, zeroizing the old one.
    pub(crate) fn replace_items(&mut self, items: Vec<EvidenceItem>) {
        let mut old = std::mem::replace(&mut self.items, items);
        old.zeroize();
    }
}

impl Drop for UnlockedSession {
    fn drop(&mut self) {
        self.items.zeroize();
    }
}

impl fmt::Debug for UnlockedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnlockedSession(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::default_evidence;

    fn session(now: Instant) -> UnlockedSession {
        let key = VaultKey::derive("4242", &[7u8; 16]).unwrap();
        UnlockedSession::new(key, default_evidence(), now)
    }

    #[test]
    fn idle_after_timeout() {
        let start = Instant::now();
        let s = session(start);
        let timeout = Duration::from_secs(60);
        assert!(!s.is_idle(start, timeout));
        assert!(!s.is_idle(start + Duration::from_secs(59), timeout));
        assert!(s.is_idle(start + Duration::from_secs(60), timeout));
    }

    #[test]
    fn touch_resets_idle_clock() {
        let start = Instant::now();
        let mut s = session(start);
        let timeout = Duration::from_secs(60);
        s.touch(start + Duration::from_secs(50));
        assert!(!s.is_idle(start + Duration::from_secs(100), timeout));
    }

    #[test]
    fn replace_items_swaps_list() {
        let mut s = session(Instant::now());
        s.replace_items(Vec::new());
        assert!(s.items().is_empty());
    }

    #[test]
    fn debug_is_masked() {
        let s = session(Instant::now());
        let debug = format!("{s:?}");
        assert_eq!(debug, "UnlockedSession(***)");
        assert!(!debug.contains("Screenshot"));
    }
}
