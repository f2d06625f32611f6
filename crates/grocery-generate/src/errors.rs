use thiserror::Error;

use grocery_core::Error;

use crate::model::GenerationReport;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A phase failed after earlier phases were committed; the report lists them.
    #[error("generation failed: {source}")]
    Failed {
        source: Error,
        report: Box<GenerationReport>,
    },
}

impl GenerateError {
    /// The underlying warehouse error.
    pub fn core(&self) -> &Error {
        match self {
            GenerateError::Failed { source, .. } => source,
        }
    }
}
