//! Domain layer: the pure generation model.
//!
//! Everything in this module is deterministic and I/O-free. Template
//! definitions, groups, and sequences are immutable after registration;
//! the engine in `crate::application` walks them to produce a render plan.

pub mod args;
pub mod error;
pub mod ledger;
pub mod pipeline;
pub mod render;
pub mod rule;
pub mod sequence;
pub mod template;

pub use args::{ArgMap, ForwardArgs, forward_all};
pub use error::{DomainError, ErrorCategory};
pub use ledger::{AppliedRecord, StateKeyMode, fingerprint};
pub use pipeline::{PipelineFn, PipelineRegistry, Pluralizer};
pub use render::render;
pub use rule::{ANCHOR_PREFIX, MissingFileError, OnExistingFile, OnMissingFile, Rule, SpliceAt};
pub use sequence::{SeqNode, Sequence, SequenceElement};
pub use template::{GroupRegistry, GroupTemplate, SecondaryOutput, TemplateDefinition};
