//! Evidence items — the payload the Safe Folder encrypts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::VaultError;

/// Kind of evidence an item points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    /// Screenshot or photo.
    Image,
    /// Chat log, note, exported text.
    Text,
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Text => f.write_str("text"),
        }
    }
}

impl FromStr for EvidenceKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "text" => Ok(Self::Text),
            other => Err(VaultError::InvalidItem(format!(
                "unknown evidence kind {other:?} (expected \"image\" or \"text\")"
            ))),
        }
    }
}

/// One evidence descriptor stored in the vault.
///
/// Wire shape: `{ "id": 1, "type": "text", "name": "...", "date": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub name: String,
    pub date: String,
}

impl EvidenceItem {
    #[must_use]
    pub fn new(id: u64, kind: EvidenceKind, name: &str, date: &str) -> Self {
        Self {
            id,
            kind,
            name: name.to_owned(),
            date: date.to_owned(),
        }
    }
}

impl Zeroize for EvidenceItem {
    fn zeroize(&mut self) {
        self.id.zeroize();
        self.name.zeroize();
        self.date.zeroize();
    }
}

/// Items a freshly created vault is seeded with.
#[must_use]
pub fn default_evidence() -> Vec<EvidenceItem> {
    vec![
        EvidenceItem::new(1, EvidenceKind::Image, "Screenshot_IG_Harassment.png", "Oct 24, 2023"),
        EvidenceItem::new(2, EvidenceKind::Text, "WhatsApp_Threat_Log.txt", "Oct 25, 2023"),
        EvidenceItem::new(3, EvidenceKind::Text, "Stalker_Profile_URLs.json", "Oct 28, 2023"),
    ]
}

/// Next free identifier: one past the current maximum.
#[must_use]
pub fn next_id(items: &[EvidenceItem]) -> u64 {
    items
        .iter()
        .map(|item| item.id)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}
