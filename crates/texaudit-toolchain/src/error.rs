//! Error types for texaudit-toolchain

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("{0} not found on PATH")]
    ToolNotFound(String),

    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("{program} failed with code {code}: {output}")]
    Failed {
        program: String,
        code: i32,
        output: String,
    },

    #[error("unknown tool category '{0}' (expected latex or poppler)")]
    UnknownCategory(String),

    #[error("invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("failed to read manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ToolchainError>;
