//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "graft",
    bin_name = "graft",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Sequenced, idempotent code generation",
    long_about = "Graft generates and incrementally patches an entity-oriented \
                  service layer, re-runnable without duplicating content.",
    after_help = "EXAMPLES:\n\
        \x20 graft module cms article\n\
        \x20 graft handler cms article --method POST --action Create\n\
        \x20 graft handler cms article --method GET --action Get --route '/{id}'\n\
        \x20 graft list",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate the full API module for an entity.
    #[command(
        visible_alias = "m",
        about = "Generate model, repo, API, dto, and service files for an entity",
        after_help = "EXAMPLES:\n\
            \x20 graft module cms article\n\
            \x20 graft module billing invoice"
    )]
    Module(ModuleArgs),

    /// Generate one HTTP verb handler for an entity.
    #[command(
        visible_alias = "h",
        about = "Generate a verb handler plus its dto and service wiring",
        after_help = "EXAMPLES:\n\
            \x20 graft handler cms article --method POST  --action Create\n\
            \x20 graft handler cms article --method GET   --action Get --route '/{id}'\n\
            \x20 graft handler cms article --method LIST  --action List"
    )]
    Handler(HandlerArgs),

    /// Generate an internal (non-HTTP) module for an entity.
    #[command(
        about = "Generate dto and service files only",
        after_help = "EXAMPLES:\n\
            \x20 graft internal cms article"
    )]
    Internal(InternalArgs),

    /// List registered template groups.
    #[command(
        visible_alias = "ls",
        about = "List template groups and their definitions"
    )]
    List(ListArgs),

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions(CompletionsArgs),
}

// ── Per-command arguments ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ModuleArgs {
    /// Logical subdomain the entity belongs to (e.g. cms, billing).
    pub subdomain: String,

    /// Entity identifier (any casing; templates re-case as needed).
    pub entity: String,
}

#[derive(Debug, Args)]
pub struct HandlerArgs {
    /// Logical subdomain the entity belongs to.
    pub subdomain: String,

    /// Entity identifier.
    pub entity: String,

    /// HTTP verb handler to generate.
    #[arg(long, value_enum)]
    pub method: Method,

    /// Action name (becomes the handler and service method identifier).
    #[arg(long)]
    pub action: String,

    /// Route suffix under the entity path, `{param}` style (e.g. "/{id}").
    #[arg(long, default_value = "")]
    pub route: String,
}

#[derive(Debug, Args)]
pub struct InternalArgs {
    /// Logical subdomain the entity belongs to.
    pub subdomain: String,

    /// Entity identifier.
    pub entity: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Also list each group's definitions.
    #[arg(long, short = 'l')]
    pub long: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Supported verb handlers. `LIST` is a collection `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    Get,
    List,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// The select-branch name this method maps to.
    pub fn branch(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::List => "LIST",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}
