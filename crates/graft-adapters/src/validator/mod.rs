//! Content validators implementing the `ContentValidator` port.

pub mod symbols;

pub use symbols::SymbolValidator;

use graft_core::{application::ports::ContentValidator, error::GraftResult};

/// Validator that accepts everything. For targets that are not source code
/// (docs, config fragments) where a structural scan has no meaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl NoopValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ContentValidator for NoopValidator {
    fn validate(&self, _source: &str) -> GraftResult<()> {
        Ok(())
    }
}
