//! Command handlers.
//!
//! Each submodule implements one subcommand. The shared [`build_engine`]
//! helper wires the production adapters, the configured pluralizer rules,
//! and the built-in groups into a ready engine.

pub mod completions;
pub mod handler;
pub mod internal;
pub mod list;
pub mod module;

use graft_adapters::{JsonStateStore, LocalFilesystem, SymbolValidator, builtin_groups};
use graft_core::application::{Engine, EngineConfig};
use graft_core::domain::{PipelineRegistry, Pluralizer, StateKeyMode};

use crate::cli::GlobalArgs;
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

/// Build the production engine: local filesystem, JSON ledger, symbol
/// validator, domain pluralizer rules, built-in groups.
pub(crate) fn build_engine(global: &GlobalArgs, config: &AppConfig) -> CliResult<Engine> {
    let root = global
        .root
        .clone()
        .unwrap_or_else(|| config.generator.root.clone());
    if !root.exists() {
        return Err(CliError::RootNotFound { path: root });
    }

    let state_dir = global
        .state_dir
        .clone()
        .unwrap_or_else(|| root.join(&config.generator.state_dir));

    let key_mode = match config.generator.key_mode.as_str() {
        "content" => StateKeyMode::ByContent,
        _ => StateKeyMode::ByName,
    };

    let engine_config = EngineConfig::new()
        .root(root)
        .state_dir(state_dir.clone())
        .key_mode(key_mode);

    let state = JsonStateStore::open(state_dir)?;

    let mut engine = Engine::new(
        engine_config,
        Box::new(LocalFilesystem::new()),
        Box::new(state),
        Box::new(SymbolValidator::new()),
    );

    // Domain vocabulary the suffix rules get wrong.
    let mut pluralizer = Pluralizer::new();
    pluralizer.add_uncountable("cms");
    pluralizer.add_irregular("staff", "staffs");
    engine.use_pipelines(PipelineRegistry::with_builtin_rules(pluralizer));

    engine.register_templates(builtin_groups::all_groups())?;
    Ok(engine)
}
