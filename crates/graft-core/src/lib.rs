//! Graft Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Graft
//! code generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            graft-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │        (Engine, FileMutator)            │
//! │      Orchestrates Generation Runs       │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (Driven: Filesystem, State, Validator)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     graft-adapters (Infrastructure)     │
//! │ (LocalFilesystem, JsonStateStore, etc)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (GroupTemplate, Sequence, Pipelines)   │
//! │        No External Dependencies         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graft_core::prelude::*;
//!
//! // 1. Build an engine with injected adapters and registered groups
//! let mut engine = Engine::new(config, filesystem, state, validator);
//! engine.register_templates(groups)?;
//!
//! // 2. One generation run: args -> plan -> apply
//! engine.set_args(ArgMap::from_pairs([("subdomain", "cms"), ("entity", "Article")]));
//! engine.build_seq(&sequence)?;
//! engine.apply()?;
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Engine, EngineConfig,
        ports::{ContentValidator, Filesystem, StateStore},
    };
    pub use crate::domain::{
        ArgMap, GroupTemplate, OnExistingFile, OnMissingFile, PipelineRegistry, Rule,
        SecondaryOutput, Sequence, SequenceElement, SpliceAt, StateKeyMode, TemplateDefinition,
        forward_all,
    };
    pub use crate::error::{GraftError, GraftResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
