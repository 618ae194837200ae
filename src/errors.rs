use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline failures. Per-cell parse problems are not represented
/// here: they degrade to a null value plus a warning and never abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source file not found or unreadable: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("could not decode '{}' with any supported encoding", path.display())]
    DecodingFailure { path: PathBuf },

    #[error("table processing failed: {0}")]
    Frame(#[from] polars::error::PolarsError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}
