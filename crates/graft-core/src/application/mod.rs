//! Application layer: orchestration of one generation run.
//!
//! The [`Engine`] turns a sequence plus an argument map into a flattened
//! render plan and executes it against the driven ports. The file mutation
//! contract lives in `services::mutator`; everything I/O-shaped goes through
//! the port traits in [`ports`].

pub mod error;
pub mod ports;
pub mod services;

pub use error::EngineError;
pub use services::{Engine, EngineConfig, Hook};
