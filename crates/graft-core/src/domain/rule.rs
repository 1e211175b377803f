//! Per-apply rules: how one rendered block interacts with its target file.
//!
//! A [`Rule`] travels with every template definition and secondary output.
//! The file mutation layer consults it in a fixed order: missing-file policy,
//! existing-file policy, then splice strategy. See the mutator for the exact
//! sequencing.

use std::path::Path;

/// Marker prefix for anchor comments embedded in generated files.
///
/// An anchor line looks like `//+graft=BindRoutes`. Insertions at an anchor
/// land immediately above the marker line and leave the marker in place, so
/// the same anchor can receive any number of future insertions.
pub const ANCHOR_PREFIX: &str = "//+graft=";

/// Policy when the target file does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnMissingFile {
    /// Write a new file whose entire body is the rendered block.
    #[default]
    Create,
    /// Fail with the rule's message constructor (or a default message).
    Error,
    /// Skip this block silently.
    Ignore,
}

/// Policy when the target file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnExistingFile {
    /// Proceed to the splice strategy.
    #[default]
    Splice,
    /// Skip this block silently.
    Ignore,
    /// Fail.
    Error,
}

/// Where the rendered block lands inside the target file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpliceAt {
    /// The block becomes the file's entire body, replacing prior contents.
    /// Used for freshly seeded file headers.
    Init,
    /// Appended after the existing body, blank-line separated.
    #[default]
    End,
    /// Inserted above the named anchor marker; the marker stays in place.
    Anchor,
}

/// Constructor for the error message raised when `OnMissingFile::Error` fires.
pub type MissingFileError = fn(&Path) -> String;

/// The full policy set for one content-insertion operation.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub on_missing: OnMissingFile,
    pub on_existing: OnExistingFile,
    pub splice_at: SpliceAt,

    /// Anchor name, required when `splice_at == Anchor`. The name is itself
    /// a template, rendered with the step's arguments (anchors are commonly
    /// per-entity, e.g. `{{ entity | sPascal }}ServiceMethods`).
    pub anchor: Option<String>,

    /// Write the mutated file as soon as this block passes validation.
    /// When `false` the mutation is held in memory and flushed once at the
    /// end of a successful plan, coalescing multiple edits to one file.
    pub auto_apply: bool,

    /// Caller-supplied message for the `OnMissingFile::Error` path.
    pub missing_file_error: Option<MissingFileError>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_missing(mut self, policy: OnMissingFile) -> Self {
        self.on_missing = policy;
        self
    }

    pub fn on_existing(mut self, policy: OnExistingFile) -> Self {
        self.on_existing = policy;
        self
    }

    pub fn splice_at(mut self, at: SpliceAt) -> Self {
        self.splice_at = at;
        self
    }

    /// Set the splice strategy to [`SpliceAt::Anchor`] with the given name.
    pub fn anchor(mut self, name: impl Into<String>) -> Self {
        self.splice_at = SpliceAt::Anchor;
        self.anchor = Some(name.into());
        self
    }

    pub fn auto_apply(mut self, yes: bool) -> Self {
        self.auto_apply = yes;
        self
    }

    pub fn missing_file_error(mut self, f: MissingFileError) -> Self {
        self.missing_file_error = Some(f);
        self
    }

    /// Build the anchor marker line content for a rendered anchor name.
    pub fn marker(anchor_name: &str) -> String {
        format!("{ANCHOR_PREFIX}{anchor_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_zero_value_rules() {
        let rule = Rule::new();
        assert_eq!(rule.on_missing, OnMissingFile::Create);
        assert_eq!(rule.on_existing, OnExistingFile::Splice);
        assert_eq!(rule.splice_at, SpliceAt::End);
        assert!(!rule.auto_apply);
        assert!(rule.anchor.is_none());
    }

    #[test]
    fn anchor_setter_switches_strategy() {
        let rule = Rule::new().anchor("BindRoutes");
        assert_eq!(rule.splice_at, SpliceAt::Anchor);
        assert_eq!(rule.anchor.as_deref(), Some("BindRoutes"));
    }

    #[test]
    fn marker_format() {
        assert_eq!(Rule::marker("BindRoutes"), "//+graft=BindRoutes");
    }
}
