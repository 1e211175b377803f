//! In-memory applied-content ledger for testing.

use std::{
    collections::HashSet,
    path::Path,
    sync::{Arc, RwLock},
};

use graft_core::{application::ports::StateStore, domain::AppliedRecord, error::GraftResult};

/// In-memory ledger; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    keys: HashSet<(std::path::PathBuf, String)>,
    records: Vec<AppliedRecord>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for MemoryStateStore {
    fn contains(&self, path: &Path, key: &str) -> GraftResult<bool> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        Ok(inner.keys.contains(&(path.to_path_buf(), key.to_string())))
    }

    fn insert(&self, record: AppliedRecord) -> GraftResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error())?;
        inner.keys.insert((record.path.clone(), record.key.clone()));
        inner.records.push(record);
        Ok(())
    }

    fn records(&self) -> GraftResult<Vec<AppliedRecord>> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        Ok(inner.records.clone())
    }
}

fn lock_error() -> graft_core::error::GraftError {
    graft_core::application::EngineError::StateStore {
        reason: "Ledger lock poisoned".into(),
    }
    .into()
}
