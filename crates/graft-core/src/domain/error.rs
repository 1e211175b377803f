// ============================================================================
// domain/error.rs - DOMAIN ERROR TAXONOMY
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for retry logic)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors — detected before any rendering
    // ========================================================================
    #[error("Group '{name}' is already registered")]
    DuplicateGroup { name: String },

    #[error("Unknown group '{name}'")]
    UnknownGroup { name: String },

    #[error("Unknown definition '{name}' in group '{group}'")]
    UnknownDefinition { group: String, name: String },

    #[error("Group '{group}' requires argument '{arg}'")]
    MissingRequiredArg { group: String, arg: String },

    #[error("No branch of select '{key}' matches '{value}'")]
    NoMatchingBranch { key: String, value: String },

    #[error("Select '{key}' has no discriminator argument")]
    MissingDiscriminator { key: String },

    // ========================================================================
    // Render Errors — abort the current plan entry
    // ========================================================================
    #[error("Template syntax error: {detail}")]
    TemplateSyntax { detail: String },

    #[error("Unresolved template variable '{name}'")]
    UnresolvedVariable { name: String },

    #[error("Undefined pipeline function '{name}'")]
    UnknownPipeline { name: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownGroup { name } => vec![
                format!("No group named '{}' is registered", name),
                "Run: graft list".into(),
            ],
            Self::UnknownDefinition { group, name } => vec![
                format!("Group '{}' has no definition '{}'", group, name),
                format!("Run: graft list to see '{}' definitions", group),
            ],
            Self::MissingRequiredArg { group, arg } => vec![
                format!("Group '{}' cannot render without '{}'", group, arg),
                format!("Pass '{}' in the argument map before building the sequence", arg),
            ],
            Self::NoMatchingBranch { key, value } => vec![
                format!("'{}' is not a branch name for select '{}'", value, key),
                "Branch names are matched exactly (case-sensitive)".into(),
            ],
            Self::UnknownPipeline { name } => vec![
                format!("'{}' is not a registered pipeline function", name),
                "Register it before building the engine, or fix the template".into(),
            ],
            Self::UnresolvedVariable { name } => vec![
                format!("The template references '{}' but the argument map does not carry it", name),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateGroup { .. }
            | Self::MissingRequiredArg { .. }
            | Self::NoMatchingBranch { .. }
            | Self::MissingDiscriminator { .. } => ErrorCategory::Configuration,
            Self::UnknownGroup { .. } | Self::UnknownDefinition { .. } => ErrorCategory::NotFound,
            Self::TemplateSyntax { .. }
            | Self::UnresolvedVariable { .. }
            | Self::UnknownPipeline { .. } => ErrorCategory::Render,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    NotFound,
    Render,
}
