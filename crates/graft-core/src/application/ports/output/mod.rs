//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `graft-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::AppliedRecord;
use crate::error::GraftResult;

/// Port for target-tree filesystem operations.
///
/// Implemented by:
/// - `graft_adapters::filesystem::LocalFilesystem` (production)
/// - `graft_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Methods take `&self`; implementations use interior mutability where
///   needed, so the engine can hold the port behind a `Box<dyn Filesystem>`
///   without threading `&mut` through the mutation layer.
pub trait Filesystem: Send + Sync {
    /// Read a file's full content.
    fn read_file(&self, path: &Path) -> GraftResult<String>;

    /// Write content to a file, replacing any existing content.
    fn write_file(&self, path: &Path, content: &str) -> GraftResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> GraftResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for the persisted applied-content ledger.
///
/// Implemented by:
/// - `graft_adapters::state::JsonStateStore` (one JSON file per state dir)
/// - `graft_adapters::state::MemoryStateStore` (testing)
///
/// Lookups are point queries by (path, block key); inserts must be durable
/// before returning, since idempotence across process restarts depends on
/// the ledger surviving.
pub trait StateStore: Send + Sync {
    /// `true` if a block with this key was already applied to this path.
    fn contains(&self, path: &Path, key: &str) -> GraftResult<bool>;

    /// Record a successful apply.
    fn insert(&self, record: AppliedRecord) -> GraftResult<()>;

    /// All records, for inspection and tests.
    fn records(&self) -> GraftResult<Vec<AppliedRecord>>;
}

/// Port for structural content validation.
///
/// Implemented by:
/// - `graft_adapters::validator::SymbolValidator` (duplicate-declaration scan)
/// - `graft_adapters::validator::NoopValidator` (non-code targets)
///
/// The engine calls this with the *merged* prospective file body (existing
/// content plus candidate block) strictly before any mutation is committed.
pub trait ContentValidator: Send + Sync {
    fn validate(&self, source: &str) -> GraftResult<()>;
}
