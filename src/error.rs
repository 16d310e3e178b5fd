use std::path::PathBuf;

use thiserror::Error;

/// Faults that abort a pipeline run. Per-row issues (unparsable numbers,
/// shipment ingredients that match nothing) are recovered in place and
/// reported through `RunDiagnostics` instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to load source {path}: {message}")]
    SourceLoad { path: PathBuf, message: String },

    #[error("failed to load reference table {path}: {message}")]
    Reference { path: PathBuf, message: String },

    #[error("merge failed: {0}")]
    Merge(String),
}

impl PipelineError {
    pub fn source_load(path: &std::path::Path, message: impl Into<String>) -> Self {
        PipelineError::SourceLoad {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn reference(path: &std::path::Path, message: impl Into<String>) -> Self {
        PipelineError::Reference {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
