//! Safe Folder lifecycle — create, unlock, lock, reset, edit, change PIN.
//!
//! This module orchestrates the vault around the crypto core:
//! PIN → PBKDF2 → AES-256-GCM envelope → key-value store. It holds no
//! cryptography of its own. Two keys are used in the store:
//!
//! - `{vaultId}` — JSON [`VaultEnvelope`]
//! - `{vaultId}.attempts` — failed-unlock counter ([`AttemptRecord`])
//!
//! State is derived, not tracked: the store says whether a vault exists, and
//! the in-memory [`UnlockedSession`] says whether it is open. Every
//! state-changing call takes `&mut self`, so one controller can never hold
//! two decrypted copies or race two unlock attempts.

use std::fmt;
use std::time::Instant;

use digisafe_crypto_core::{CryptoError, VaultEnvelope, VaultKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::attempts::{current_epoch_secs, AttemptRecord};
use crate::config::SafeFolderConfig;
use crate::error::VaultError;
use crate::evidence::{default_evidence, next_id, EvidenceItem, EvidenceKind};
use crate::session::UnlockedSession;
use crate::store::KeyValueStore;

/// Observable vault state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VaultState {
    /// Nothing stored under the vault id.
    NoVault,
    /// Envelope stored, nothing decrypted in memory.
    Locked,
    /// Envelope decrypted; key and items held in memory.
    Unlocked,
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVault => f.write_str("no vault"),
            Self::Locked => f.write_str("locked"),
            Self::Unlocked => f.write_str("unlocked"),
        }
    }
}

/// The Safe Folder controller.
pub struct SafeFolder<S: KeyValueStore> {
    store: S,
    config: SafeFolderConfig,
    session: Option<UnlockedSession>,
}

impl<S: KeyValueStore> SafeFolder<S> {
    /// Build a controller over `store`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Config` if `config` fails validation.
    pub fn new(store: S, config: SafeFolderConfig) -> Result<Self, VaultError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            session: None,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &SafeFolderConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// `true` if an envelope is stored under the vault id.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn has_vault(&self) -> Result<bool, VaultError> {
        Ok(self.store.get(&self.config.vault_id)?.is_some())
    }

    /// Current state.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn state(&self) -> Result<VaultState, VaultError> {
        if self.session.is_some() {
            return Ok(VaultState::Unlocked);
        }
        if self.has_vault()? {
            Ok(VaultState::Locked)
        } else {
            Ok(VaultState::NoVault)
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Create a new vault and leave it unlocked.
    ///
    /// `items` seeds the vault; `None` uses the sample evidence list when
    /// `seedDefaultEvidence` is set, or an empty list otherwise.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidPin`] if the PIN violates the length policy
    /// - [`VaultError::VaultAlreadyExists`] if an envelope is already stored
    /// - [`VaultError::Crypto`] if sealing fails
    pub fn create(&mut self, pin: &str, items: Option<Vec<EvidenceItem>>) -> Result<(), VaultError> {
        self.config.check_pin(pin)?;
        if self.has_vault()? {
            return Err(VaultError::VaultAlreadyExists);
        }

        let mut items = items.unwrap_or_else(|| {
            if self.config.seed_default_evidence {
                default_evidence()
            } else {
                Vec::new()
            }
        });

        let sealed = VaultKey::generate(pin)
            .and_then(|key| key.seal(&items).map(|envelope| (key, envelope)))
            .map_err(VaultError::from);
        let key = match sealed.and_then(|(key, envelope)| {
            self.write_envelope(&envelope)?;
            Ok(key)
        }) {
            Ok(key) => key,
            Err(e) => {
                items.zeroize();
                return Err(e);
            }
        };
        let attempts_key = self.config.attempts_key();
        self.clear_attempts(&attempts_key);

        tracing::info!(items = items.len(), "safe folder created");
        self.session = Some(UnlockedSession::new(key, items, Instant::now()));
        Ok(())
    }

    /// Unlock the vault with `pin`.
    ///
    /// Any session already open is discarded first, so at most one decrypted
    /// copy exists even when unlock is called twice.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidPin`] for an empty PIN
    /// - [`VaultError::NoVault`] if nothing is stored
    /// - [`VaultError::RateLimited`] while a backoff is active
    /// - [`VaultError::Crypto`] with `CryptoError::InvalidInput` for a malformed
    ///   stored record, or `CryptoError::Authentication` for a wrong PIN or a
    ///   damaged envelope
    pub fn unlock(&mut self, pin: &str) -> Result<(), VaultError> {
        self.session = None;
        if pin.is_empty() {
            return Err(VaultError::InvalidPin("PIN must not be empty".into()));
        }

        let envelope = self.read_envelope()?;
        let attempts_key = self.config.attempts_key();
        let mut record = AttemptRecord::load(&self.store, &attempts_key)?;
        let now_secs = current_epoch_secs();
        if let Some(remaining_ms) = record.cooldown_remaining(now_secs) {
            tracing::debug!(remaining_ms, "unlock refused during cooldown");
            return Err(VaultError::RateLimited { remaining_ms });
        }

        match VaultKey::unlock::<Vec<EvidenceItem>>(&envelope, pin) {
            Ok((key, items)) => {
                if record.attempts > 0 {
                    self.clear_attempts(&attempts_key);
                }
                tracing::info!(items = items.len(), "safe folder unlocked");
                self.session = Some(UnlockedSession::new(key, items, Instant::now()));
                Ok(())
            }
            Err(CryptoError::Authentication) => {
                record.record_failure(now_secs);
                record.save(&mut self.store, &attempts_key)?;
                tracing::warn!(attempts = record.attempts, "safe folder unlock failed");
                Err(CryptoError::Authentication.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lock the vault, discarding the key and decrypted items.
    ///
    /// Locking an already-locked vault is a no-op.
    pub fn lock(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("safe folder locked");
        }
    }

    /// Lock if the session has been idle past the configured timeout.
    ///
    /// Returns `true` if this call locked the vault.
    pub fn lock_if_idle(&mut self) -> bool {
        self.lock_if_idle_at(Instant::now())
    }

    /// [`lock_if_idle`](Self::lock_if_idle) against an explicit clock reading.
    pub fn lock_if_idle_at(&mut self, now: Instant) -> bool {
        let Some(timeout) = self.config.auto_lock_timeout() else {
            return false;
        };
        let idle = self
            .session
            .as_ref()
            .is_some_and(|session| session.is_idle(now, timeout));
        if idle {
            self.session = None;
            tracing::info!("safe folder auto-locked after inactivity");
        }
        idle
    }

    /// Permanently delete the vault. Irreversible.
    ///
    /// # Errors
    ///
    /// - [`VaultError::ResetNotConfirmed`] unless `confirmed` is `true`
    /// - [`VaultError::NoVault`] if nothing is stored
    pub fn reset(&mut self, confirmed: bool) -> Result<(), VaultError> {
        if !confirmed {
            return Err(VaultError::ResetNotConfirmed);
        }
        if !self.has_vault()? {
            return Err(VaultError::NoVault);
        }
        self.session = None;
        self.store.remove(&self.config.vault_id)?;
        self.store.remove(&self.config.attempts_key())?;
        tracing::warn!("safe folder reset; all evidence deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Unlocked operations
    // -----------------------------------------------------------------------

    /// Decrypted evidence items.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] unless the vault is unlocked.
    pub fn items(&mut self) -> Result<&[EvidenceItem], VaultError> {
        Ok(self.active_session()?.items())
    }

    /// Add an evidence item and re-seal the vault. Returns the new id.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Locked`] unless unlocked
    /// - [`VaultError::InvalidItem`] for an empty name
    /// - sealing or storage failures
    pub fn add_item(&mut self, kind: EvidenceKind, name: &str, date: &str) -> Result<u64, VaultError> {
        if name.trim().is_empty() {
            return Err(VaultError::InvalidItem("name must not be empty".into()));
        }
        let session = self.active_session()?;
        let id = next_id(session.items());
        let mut updated = session.items().to_vec();
        updated.push(EvidenceItem::new(id, kind, name, date));
        self.commit(updated)?;
        tracing::debug!(id, "evidence item added");
        Ok(id)
    }

    /// Remove the item with `id` and re-seal the vault.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Locked`] unless unlocked
    /// - [`VaultError::ItemNotFound`] if no item has that id
    /// - sealing or storage failures
    pub fn remove_item(&mut self, id: u64) -> Result<(), VaultError> {
        let session = self.active_session()?;
        if !session.items().iter().any(|item| item.id == id) {
            return Err(VaultError::ItemNotFound(id));
        }
        let updated: Vec<EvidenceItem> = session
            .items()
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        self.commit(updated)?;
        tracing::debug!(id, "evidence item removed");
        Ok(())
    }

    /// Re-key the vault under `new_pin` with a fresh salt.
    ///
    /// `current_pin` is verified against the stored envelope first and
    /// shares the brute-force counter with [`unlock`](Self::unlock).
    ///
    /// # Errors
    ///
    /// - [`VaultError::Locked`] unless unlocked
    /// - [`VaultError::InvalidPin`] if `new_pin` violates the policy
    /// - [`VaultError::RateLimited`] while a backoff is active
    /// - [`VaultError::Crypto`] with `CryptoError::Authentication` if
    ///   `current_pin` is wrong
    pub fn change_pin(&mut self, current_pin: &str, new_pin: &str) -> Result<(), VaultError> {
        self.active_session()?;
        self.config.check_pin(new_pin)?;

        let envelope = self.read_envelope()?;
        let attempts_key = self.config.attempts_key();
        let mut record = AttemptRecord::load(&self.store, &attempts_key)?;
        let now_secs = current_epoch_secs();
        if let Some(remaining_ms) = record.cooldown_remaining(now_secs) {
            return Err(VaultError::RateLimited { remaining_ms });
        }

        match VaultKey::unlock::<Vec<EvidenceItem>>(&envelope, current_pin) {
            Ok((_, mut stored)) => stored.zeroize(),
            Err(CryptoError::Authentication) => {
                record.record_failure(now_secs);
                record.save(&mut self.store, &attempts_key)?;
                tracing::warn!(attempts = record.attempts, "PIN change re-authentication failed");
                return Err(CryptoError::Authentication.into());
            }
            Err(e) => return Err(e.into()),
        }

        let new_key = VaultKey::generate(new_pin)?;
        let session = self.active_session()?;
        let envelope = new_key.seal(session.items())?;
        self.write_envelope(&envelope)?;
        // The stored envelope is now under the new key; later edits must
        // seal with it whatever happens to the attempt record.
        if let Some(session) = self.session.as_mut() {
            session.key = new_key;
        }
        self.clear_attempts(&attempts_key);
        tracing::info!("safe folder PIN changed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// The open session, after applying idle auto-lock and refreshing the
    /// activity timestamp.
    fn active_session(&mut self) -> Result<&mut UnlockedSession, VaultError> {
        let now = Instant::now();
        self.lock_if_idle_at(now);
        let session = self.session.as_mut().ok_or(VaultError::Locked)?;
        session.touch(now);
        Ok(session)
    }

    /// Seal `updated`, overwrite the stored envelope, then adopt it in
    /// memory. On failure the session keeps its previous items.
    fn commit(&mut self, mut updated: Vec<EvidenceItem>) -> Result<(), VaultError> {
        let sealed = match self.session.as_ref() {
            Some(session) => session.key.seal(&updated).map_err(VaultError::from),
            None => Err(VaultError::Locked),
        };
        let written = sealed.and_then(|envelope| self.write_envelope(&envelope));
        if let Err(e) = written {
            updated.zeroize();
            return Err(e);
        }
        if let Some(session) = self.session.as_mut() {
            session.replace_items(updated);
        }
        Ok(())
    }

    /// Drop the failed-attempt record after the envelope has been written.
    /// A store error here only leaves a stale counter behind, so it is
    /// logged rather than reported.
    fn clear_attempts(&mut self, attempts_key: &str) {
        if let Err(e) = AttemptRecord::default().save(&mut self.store, attempts_key) {
            tracing::warn!(error = %e, "could not clear failed-attempt record");
        }
    }

    fn read_envelope(&self) -> Result<VaultEnvelope, VaultError> {
        let raw = self
            .store
            .get(&self.config.vault_id)?
            .ok_or(VaultError::NoVault)?;
        Ok(VaultEnvelope::from_json(&raw)?)
    }

    fn write_envelope(&mut self, envelope: &VaultEnvelope) -> Result<(), VaultError> {
        let json = envelope.to_json()?;
        self.store.set(&self.config.vault_id, &json)
    }
}

impl<S: KeyValueStore> fmt::Debug for SafeFolder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeFolder")
            .field("vault_id", &self.config.vault_id)
            .field("unlocked", &self.session.is_some())
            .finish_non_exhaustive()
    }
}
