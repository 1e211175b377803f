//! JSON-file applied-content ledger.
//!
//! The full record set lives in one `applied.json` under the configured
//! state directory. The file is read once when the store opens and rewritten
//! atomically (temp file + rename) on every insert, so a crash mid-write
//! never leaves a truncated ledger behind. Record volume is small — one
//! entry per generated block — so whole-file rewrites are fine.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use tracing::debug;

use graft_core::{
    application::{EngineError, ports::StateStore},
    domain::AppliedRecord,
    error::{GraftError, GraftResult},
};

const LEDGER_FILE: &str = "applied.json";

/// Durable ledger backed by a JSON file under the state directory.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    ledger_path: PathBuf,
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    keys: HashSet<(PathBuf, String)>,
    records: Vec<AppliedRecord>,
}

impl JsonStateStore {
    /// Open (or initialize) the ledger under `state_dir`.
    ///
    /// A missing directory or ledger file is not an error — first runs start
    /// with an empty ledger and the directory is created on first insert.
    pub fn open(state_dir: impl Into<PathBuf>) -> GraftResult<Self> {
        let state_dir = state_dir.into();
        let ledger_path = state_dir.join(LEDGER_FILE);

        let records: Vec<AppliedRecord> = if ledger_path.exists() {
            let raw = fs::read_to_string(&ledger_path)
                .map_err(|e| store_error(format!("read {}: {e}", ledger_path.display())))?;
            serde_json::from_str(&raw)
                .map_err(|e| store_error(format!("parse {}: {e}", ledger_path.display())))?
        } else {
            Vec::new()
        };

        debug!(path = %ledger_path.display(), records = records.len(), "ledger opened");

        let keys = records
            .iter()
            .map(|r| (r.path.clone(), r.key.clone()))
            .collect();

        Ok(Self {
            ledger_path,
            inner: Arc::new(RwLock::new(Inner { keys, records })),
        })
    }

    /// Persist the current record set atomically.
    fn save(&self, records: &[AppliedRecord]) -> GraftResult<()> {
        if let Some(dir) = self.ledger_path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| store_error(format!("create {}: {e}", dir.display())))?;
        }

        let raw = serde_json::to_string_pretty(records)
            .map_err(|e| store_error(format!("serialize ledger: {e}")))?;

        let tmp = self.ledger_path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| store_error(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.ledger_path)
            .map_err(|e| store_error(format!("rename {}: {e}", tmp.display())))?;
        Ok(())
    }
}

impl StateStore for JsonStateStore {
    fn contains(&self, path: &Path, key: &str) -> GraftResult<bool> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        Ok(inner.keys.contains(&(path.to_path_buf(), key.to_string())))
    }

    fn insert(&self, record: AppliedRecord) -> GraftResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error())?;
        inner.keys.insert((record.path.clone(), record.key.clone()));
        inner.records.push(record);
        // Durable before returning; idempotence across restarts depends on it.
        self.save(&inner.records)
    }

    fn records(&self) -> GraftResult<Vec<AppliedRecord>> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        Ok(inner.records.clone())
    }
}

fn store_error(reason: String) -> GraftError {
    EngineError::StateStore { reason }.into()
}

fn lock_error() -> GraftError {
    EngineError::StateStore {
        reason: "Ledger lock poisoned".into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_on_empty_dir_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::open(dir.path()).unwrap();
        assert!(store.records().unwrap().is_empty());
    }

    #[test]
    fn insert_is_durable_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = JsonStateStore::open(dir.path()).unwrap();
            store
                .insert(AppliedRecord::new(Path::new("src/a.rs"), "name:Init", "Init", "body"))
                .unwrap();
        }

        let reopened = JsonStateStore::open(dir.path()).unwrap();
        assert!(reopened.contains(Path::new("src/a.rs"), "name:Init").unwrap());
        assert_eq!(reopened.records().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_ledger_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LEDGER_FILE), "not json").unwrap();
        assert!(JsonStateStore::open(dir.path()).is_err());
    }
}
