//! Unified error handling for Graft Core.
//!
//! This module provides a unified error type that wraps domain, engine, and
//! validation errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::EngineError;
use crate::domain::DomainError;

/// Root error type for Graft Core operations.
///
/// This enum wraps all possible errors that can occur when using graft-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum GraftError {
    /// Errors from the domain layer (configuration and render failures).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the engine and file mutation layer.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Structural validation rejected rendered content.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

/// Content validation failures, raised by `ContentValidator` implementations
/// strictly before any file mutation is committed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The candidate block would redeclare a symbol already present in the
    /// target scope.
    #[error("symbol '{symbol}' already declared in {scope}")]
    DuplicateSymbol { symbol: String, scope: String },

    /// The combined source is not structurally sound.
    #[error("parse error: {detail}")]
    Parse { detail: String },
}

impl GraftError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Engine(e) => e.suggestions(),
            Self::Validation(ValidationError::DuplicateSymbol { symbol, .. }) => vec![
                format!("'{}' is already declared in the target file", symbol),
                "The generated block was rejected; the file is unchanged".into(),
                "Rename the entity/action, or remove the existing declaration".into(),
            ],
            Self::Validation(ValidationError::Parse { .. }) => vec![
                "The rendered content is not structurally valid".into(),
                "Inspect the template body for unbalanced delimiters".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Graft".into(),
                "Please report this issue at: https://github.com/cosecruz/graft/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Render => ErrorCategory::Render,
            },
            Self::Engine(e) => e.category(),
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    NotFound,
    Render,
    Validation,
    Mutation,
    Internal,
}

/// Convenient result type alias.
pub type GraftResult<T> = Result<T, GraftError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> GraftResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> GraftResult<T> {
        self.map_err(|e| GraftError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}
