//! Error types for texaudit-core

use std::path::PathBuf;

use thiserror::Error;

/// Fatal input errors.
///
/// Anything that stops a report from being produced at all ends up here.
/// Malformed markup never does: extractors degrade to partial results.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("project root is not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("entry file not found: {}", .0.display())]
    EntryNotFound(PathBuf),

    #[error("bibliography file not found: {}", .0.display())]
    BibliographyNotFound(PathBuf),

    #[error("no .tex files found under {}", .0.display())]
    NoTexFiles(PathBuf),

    #[error("a section name is required for the section target")]
    SectionNameRequired,

    #[error("failed to parse {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// Whether this error means "nothing to check" rather than bad input.
    pub fn is_empty_project(&self) -> bool {
        matches!(self, Self::NoTexFiles(_))
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
