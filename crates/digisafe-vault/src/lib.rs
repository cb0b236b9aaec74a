//! `digisafe-vault` — Safe Folder controller for DigiSafe.
//!
//! Drives the vault lifecycle (create, unlock, lock, reset), evidence edits
//! with whole-payload re-encryption, PIN changes, idle auto-lock and
//! brute-force backoff, on top of a pluggable string key-value store.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod attempts;
pub mod config;
pub mod error;
pub mod evidence;
pub mod safe_folder;
pub mod session;
pub mod store;

pub use attempts::AttemptRecord;
pub use config::SafeFolderConfig;
pub use error::VaultError;
pub use evidence::{default_evidence, EvidenceItem, EvidenceKind};
pub use safe_folder::{SafeFolder, VaultState};
pub use session::UnlockedSession;
pub use store::{FileStore, KeyValueStore, MemoryStore};
