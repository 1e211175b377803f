//! The applied-content ledger: persisted idempotence records.
//!
//! Every successfully applied block leaves an [`AppliedRecord`] behind.
//! Before applying a block, the mutation layer consults the ledger; a hit
//! means the block was already spliced into that file and the apply is a
//! no-op. This is what makes re-running a sequence after a mid-plan failure
//! resume from the failure point instead of duplicating earlier blocks.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How block identity is derived for ledger lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKeyMode {
    /// Key by (path, block name). Editing a template and re-running does
    /// *not* re-append the block — the name already exists in the ledger.
    /// This is the default.
    #[default]
    ByName,
    /// Key by (path, rendered-content fingerprint). Template drift produces
    /// a new key, so edited blocks re-apply alongside the old content.
    ByContent,
}

impl StateKeyMode {
    /// Derive the ledger key for a block.
    pub fn key(self, block: &str, content: &str) -> String {
        match self {
            Self::ByName => format!("name:{block}"),
            Self::ByContent => format!("content:{}", fingerprint(content)),
        }
    }
}

/// One persisted ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedRecord {
    /// Unique record identity (stable across re-serialization).
    pub id: Uuid,
    /// Resolved target file path.
    pub path: PathBuf,
    /// Ledger key as produced by [`StateKeyMode::key`].
    pub key: String,
    /// Block name, kept for inspection even under `ByContent` keying.
    pub block: String,
    /// Fingerprint of the rendered content at apply time.
    pub fingerprint: String,
    pub applied_at: DateTime<Utc>,
}

impl AppliedRecord {
    pub fn new(path: &Path, key: impl Into<String>, block: impl Into<String>, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.to_path_buf(),
            key: key.into(),
            block: block.into(),
            fingerprint: fingerprint(content),
            applied_at: Utc::now(),
        }
    }
}

/// FNV-1a 64-bit content fingerprint, rendered as fixed-width hex.
///
/// Collision resistance beyond accidental duplication is not required here;
/// the ledger key also carries the file path.
pub fn fingerprint(content: &str) -> String {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in content.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    format!("{hash:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        assert_eq!(fingerprint("abc"), fingerprint("abc"));
        assert_ne!(fingerprint("abc"), fingerprint("abd"));
        assert_eq!(fingerprint("").len(), 16);
    }

    #[test]
    fn by_name_key_ignores_content() {
        let mode = StateKeyMode::ByName;
        assert_eq!(mode.key("Block", "v1"), mode.key("Block", "v2"));
    }

    #[test]
    fn by_content_key_tracks_content() {
        let mode = StateKeyMode::ByContent;
        assert_ne!(mode.key("Block", "v1"), mode.key("Block", "v2"));
        assert_eq!(mode.key("A", "same"), mode.key("B", "same"));
    }

    #[test]
    fn record_carries_fingerprint() {
        let rec = AppliedRecord::new(Path::new("src/x.rs"), "name:Init", "Init", "body");
        assert_eq!(rec.fingerprint, fingerprint("body"));
        assert!(!rec.id.is_nil());
    }
}
