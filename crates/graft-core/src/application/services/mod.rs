//! Application services.
//!
//! [`Engine`] is the public orchestrator; [`mutator`] holds the per-file
//! splice contract it delegates to.

pub mod engine;
pub mod mutator;

pub use engine::{Engine, EngineConfig, Hook};
