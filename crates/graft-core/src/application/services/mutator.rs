//! The file mutation and state layer.
//!
//! One [`FileMutator`] lives for the duration of one `Engine::apply` run.
//! For every plan entry it executes the fixed per-apply contract:
//!
//! 1. consult the applied ledger — a hit is a silent no-op (idempotence);
//! 2. apply the missing-file policy if the target is absent;
//! 3. apply the existing-file policy if the target is present;
//! 4. splice the rendered block per the rule's strategy (Init / End / Anchor);
//! 5. validate the merged result *before* anything is committed;
//! 6. write immediately (`auto_apply`) or hold the mutated body in the
//!    pending working set, flushed once at the end of a successful plan.
//!
//! The pending set coalesces multiple edits to the same file: a later entry
//! targeting a held path splices into the in-memory body, not the stale
//! on-disk one. On a mid-plan failure the pending set is simply dropped —
//! held blocks were never written and never recorded, so a re-run
//! regenerates them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::application::error::EngineError;
use crate::application::ports::{ContentValidator, Filesystem, StateStore};
use crate::domain::{AppliedRecord, OnExistingFile, OnMissingFile, Rule, SpliceAt, StateKeyMode};
use crate::error::GraftResult;

/// Post-render hook applied to the full file body just before it is written.
pub type Hook = fn(&str) -> String;

/// One fully resolved apply request (all templates already rendered).
#[derive(Debug)]
pub struct ApplyRequest<'a> {
    pub path: PathBuf,
    /// Resolved block name (ledger identity and logging).
    pub block: String,
    /// Rendered content block.
    pub content: String,
    /// Resolved anchor name, when the rule splices at an anchor.
    pub anchor: Option<String>,
    pub rule: &'a Rule,
}

/// What happened to one apply request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Written to storage and recorded.
    Applied,
    /// Mutated in memory; will be written at flush.
    Held,
    /// No-op (ledger hit, or an Ignore policy fired).
    Skipped,
}

/// A mutated file body waiting for the end-of-plan flush.
#[derive(Debug, Default)]
struct PendingFile {
    body: String,
    /// (ledger key, block name, rendered content) per held block, so the
    /// ledger records can be created when the body finally lands on disk.
    blocks: Vec<(String, String, String)>,
}

pub struct FileMutator<'a> {
    fs: &'a dyn Filesystem,
    state: &'a dyn StateStore,
    validator: &'a dyn ContentValidator,
    key_mode: StateKeyMode,
    before_save: Option<Hook>,
    pending: BTreeMap<PathBuf, PendingFile>,
}

impl<'a> FileMutator<'a> {
    pub fn new(
        fs: &'a dyn Filesystem,
        state: &'a dyn StateStore,
        validator: &'a dyn ContentValidator,
        key_mode: StateKeyMode,
        before_save: Option<Hook>,
    ) -> Self {
        Self {
            fs,
            state,
            validator,
            key_mode,
            before_save,
            pending: BTreeMap::new(),
        }
    }

    /// Execute the per-apply contract for one request.
    pub fn apply(&mut self, req: ApplyRequest<'_>) -> GraftResult<Outcome> {
        let key = self.key_mode.key(&req.block, &req.content);

        // Step 1: idempotence — already in the ledger means already spliced.
        if self.state.contains(&req.path, &key)? {
            debug!(path = %req.path.display(), block = %req.block, "ledger hit, skipping");
            return Ok(Outcome::Skipped);
        }

        // Steps 2-3: existence policies against the effective current body
        // (pending overlay first, then storage).
        let current = self.current_body(&req.path)?;

        let new_body = match current {
            None => match req.rule.on_missing {
                OnMissingFile::Ignore => {
                    trace!(path = %req.path.display(), "missing target ignored");
                    return Ok(Outcome::Skipped);
                }
                OnMissingFile::Error => {
                    let message = match req.rule.missing_file_error {
                        Some(mk) => mk(&req.path),
                        None => format!("file not exists: {}", req.path.display()),
                    };
                    return Err(EngineError::MissingFile {
                        path: req.path.clone(),
                        message,
                    }
                    .into());
                }
                // A created file's entire initial body is the block.
                OnMissingFile::Create => req.content.clone(),
            },
            Some(body) => match req.rule.on_existing {
                OnExistingFile::Ignore => {
                    trace!(path = %req.path.display(), "existing target ignored");
                    return Ok(Outcome::Skipped);
                }
                OnExistingFile::Error => {
                    return Err(EngineError::ExistingFile {
                        path: req.path.clone(),
                    }
                    .into());
                }
                OnExistingFile::Splice => self.splice(&req, &body)?,
            },
        };

        // Step 5 precondition: nothing is committed until the merged body
        // passes structural validation.
        self.validator.validate(&new_body)?;

        // Step 6: commit now or hold for the end-of-plan flush.
        if req.rule.auto_apply {
            self.commit(&req.path, &new_body, &key, &req.block, &req.content)?;
            Ok(Outcome::Applied)
        } else {
            let entry = self.pending.entry(req.path.clone()).or_default();
            entry.body = new_body;
            entry.blocks.push((key, req.block.clone(), req.content.clone()));
            Ok(Outcome::Held)
        }
    }

    /// Write all held files and record their ledger entries.
    pub fn flush(&mut self) -> GraftResult<()> {
        let pending = std::mem::take(&mut self.pending);
        for (path, file) in pending {
            debug!(path = %path.display(), blocks = file.blocks.len(), "flushing pending file");
            self.write(&path, &file.body)?;
            for (key, block, content) in &file.blocks {
                self.state.insert(AppliedRecord::new(&path, key, block, content))?;
            }
        }
        Ok(())
    }

    /// Effective current body: pending overlay first, then storage.
    fn current_body(&self, path: &Path) -> GraftResult<Option<String>> {
        if let Some(file) = self.pending.get(path) {
            return Ok(Some(file.body.clone()));
        }
        if self.fs.exists(path) {
            return Ok(Some(self.fs.read_file(path)?));
        }
        Ok(None)
    }

    /// Apply the rule's splice strategy to an existing body.
    fn splice(&self, req: &ApplyRequest<'_>, body: &str) -> GraftResult<String> {
        match req.rule.splice_at {
            SpliceAt::Init => Ok(req.content.clone()),
            SpliceAt::End => Ok(append_block(body, &req.content)),
            SpliceAt::Anchor => {
                let anchor = req.anchor.as_deref().unwrap_or_default();
                insert_at_anchor(body, anchor, &req.content, &req.path)
            }
        }
    }

    fn commit(&mut self, path: &Path, body: &str, key: &str, block: &str, content: &str) -> GraftResult<()> {
        self.write(path, body)?;

        // An auto-applied write lands any blocks previously held for this
        // path as well; move their ledger records over and drop the overlay.
        if let Some(file) = self.pending.remove(path) {
            for (held_key, held_block, held_content) in &file.blocks {
                self.state
                    .insert(AppliedRecord::new(path, held_key, held_block, held_content))?;
            }
        }

        self.state.insert(AppliedRecord::new(path, key, block, content))
    }

    fn write(&self, path: &Path, body: &str) -> GraftResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs.create_dir_all(parent)?;
            }
        }
        let body = match self.before_save {
            Some(hook) => hook(body),
            None => body.to_string(),
        };
        self.fs.write_file(path, &body)
    }
}

/// Append a block after an existing body, separated by exactly one blank
/// line regardless of how many trailing newlines the body carried.
fn append_block(body: &str, block: &str) -> String {
    let trimmed = body.trim_end_matches('\n');
    if trimmed.is_empty() {
        return block.to_string();
    }
    format!("{trimmed}\n\n{block}")
}

/// Insert `block` immediately above the line carrying the anchor marker,
/// re-indented to the marker's leading whitespace. The marker line stays in
/// place so future applies can target the same anchor.
fn insert_at_anchor(body: &str, anchor: &str, block: &str, path: &Path) -> GraftResult<String> {
    let marker = Rule::marker(anchor);
    let lines: Vec<&str> = body.lines().collect();
    let hits: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.contains(&marker))
        .map(|(i, _)| i)
        .collect();

    match hits.as_slice() {
        [] => Err(EngineError::AnchorNotFound {
            anchor: anchor.to_string(),
            path: path.to_path_buf(),
        }
        .into()),
        [line_idx] => {
            let marker_line = lines[*line_idx];
            let indent: String = marker_line
                .chars()
                .take_while(|c| c.is_whitespace())
                .collect();

            let mut out: Vec<String> = lines[..*line_idx].iter().map(|l| (*l).to_string()).collect();
            for block_line in block.lines() {
                if block_line.is_empty() {
                    out.push(String::new());
                } else {
                    out.push(format!("{indent}{block_line}"));
                }
            }
            out.extend(lines[*line_idx..].iter().map(|l| (*l).to_string()));

            let mut joined = out.join("\n");
            if body.ends_with('\n') {
                joined.push('\n');
            }
            Ok(joined)
        }
        many => Err(EngineError::AnchorAmbiguous {
            anchor: anchor.to_string(),
            path: path.to_path_buf(),
            count: many.len(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_separates_with_blank_line() {
        assert_eq!(append_block("a\n", "b"), "a\n\nb");
        assert_eq!(append_block("", "b"), "b");
        assert_eq!(append_block("a\n\n\n", "b"), "a\n\nb");
    }

    #[test]
    fn anchor_insert_keeps_marker_and_indent() {
        let body = "fn reg() {\n    //+graft=Bind\n}\n";
        let out = insert_at_anchor(body, "Bind", "route_a();", Path::new("x.rs")).unwrap();
        assert_eq!(out, "fn reg() {\n    route_a();\n    //+graft=Bind\n}\n");
    }

    #[test]
    fn anchor_missing_is_error() {
        let err = insert_at_anchor("fn f() {}\n", "Bind", "x", Path::new("x.rs")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::GraftError::Engine(EngineError::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn anchor_ambiguous_is_error() {
        let body = "//+graft=Bind\n//+graft=Bind\n";
        let err = insert_at_anchor(body, "Bind", "x", Path::new("x.rs")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::GraftError::Engine(EngineError::AnchorAmbiguous { count: 2, .. })
        ));
    }

    #[test]
    fn multiline_block_is_indented_per_line() {
        let body = "    //+graft=Bind\n";
        let out = insert_at_anchor(body, "Bind", "a();\nb();", Path::new("x.rs")).unwrap();
        assert_eq!(out, "    a();\n    b();\n    //+graft=Bind\n");
    }
}
