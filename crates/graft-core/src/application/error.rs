//! Application layer errors.
//!
//! These errors represent failures while executing a render plan against the
//! filesystem and state store. Configuration and render failures are
//! `DomainError` from `crate::domain`; content rejections are
//! `ValidationError` from `crate::error`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while applying a render plan.
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    /// An anchor marker was not found in the target file.
    #[error("anchor '{anchor}' not found in {path}")]
    AnchorNotFound { anchor: String, path: PathBuf },

    /// An anchor marker occurs more than once; insertion would be ambiguous.
    #[error("anchor '{anchor}' occurs {count} times in {path}; expected exactly one")]
    AnchorAmbiguous {
        anchor: String,
        path: PathBuf,
        count: usize,
    },

    /// The target file is absent and the rule says that is fatal.
    #[error("{message}")]
    MissingFile { path: PathBuf, message: String },

    /// The target file exists and the rule says that is fatal.
    #[error("file already exists: {path}")]
    ExistingFile { path: PathBuf },

    /// A filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// The applied-content state store failed.
    #[error("State store error: {reason}")]
    StateStore { reason: String },
}

impl EngineError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::AnchorNotFound { anchor, path } => vec![
                format!("'{}' has no '//+graft={}' marker line", path.display(), anchor),
                "Generate the file's seed definition first, or restore the marker".into(),
            ],
            Self::AnchorAmbiguous { anchor, path, .. } => vec![
                format!("Remove the duplicate '//+graft={}' markers in {}", anchor, path.display()),
                "An anchor must occur exactly once per file".into(),
            ],
            Self::MissingFile { path, .. } => vec![
                format!("Expected {} to exist", path.display()),
                "Run the sequence that seeds this file first".into(),
            ],
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::StateStore { .. } => vec![
                "The applied-content ledger could not be read or written".into(),
                "Check the state directory permissions".into(),
            ],
            Self::ExistingFile { .. } => vec!["The rule forbids touching an existing file".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AnchorNotFound { .. }
            | Self::AnchorAmbiguous { .. }
            | Self::MissingFile { .. }
            | Self::ExistingFile { .. } => ErrorCategory::Mutation,
            Self::Filesystem { .. } | Self::StateStore { .. } => ErrorCategory::Internal,
        }
    }
}
