//! Command implementations for the texaudit CLI
//!
//! Each command module parses its own arguments and delegates to
//! texaudit-core, texaudit-remote or texaudit-toolchain. Reports go to
//! stdout as JSON; diagnostics go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use texaudit_core::AuditError;
use texaudit_remote::RemoteError;
use texaudit_toolchain::ToolchainError;
use thiserror::Error;

pub mod citations;
pub mod compile_log;
pub mod rasterize;
pub mod review_pages;
pub mod structure;
pub mod toolchain;
pub mod verify;

/// Exit status for runs that completed but should fail a pipeline.
pub const EXIT_FINDINGS: u8 = 1;

/// Exit status for unusable input.
pub const EXIT_INPUT: u8 = 2;

/// Bad command-line input that is not an [`AuditError`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InputError(pub String);

pub fn input_error(message: impl Into<String>) -> anyhow::Error {
    InputError(message.into()).into()
}

/// Map a command failure to the process exit status.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if let Some(audit) = err.downcast_ref::<AuditError>() {
        return if audit.is_empty_project() {
            ExitCode::from(EXIT_FINDINGS)
        } else {
            ExitCode::from(EXIT_INPUT)
        };
    }
    if err.downcast_ref::<InputError>().is_some()
        || matches!(err.downcast_ref::<RemoteError>(), Some(RemoteError::InvalidTimeout(_)))
    {
        return ExitCode::from(EXIT_INPUT);
    }
    match err.downcast_ref::<ToolchainError>() {
        Some(
            ToolchainError::UnknownCategory(_) | ToolchainError::Pattern { .. } | ToolchainError::Manifest { .. },
        ) => ExitCode::from(EXIT_INPUT),
        _ => ExitCode::from(EXIT_FINDINGS),
    }
}

/// Arguments shared by every command that reads a project.
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Project root directory
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Canonical project root, or an input error.
pub fn project_root(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(AuditError::InvalidRoot(path.to_path_buf()).into());
    }
    Ok(path.canonicalize()?)
}

/// Resolve `path` against `root` unless it is absolute.
pub fn under_root(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    println!("{}", texaudit_core::to_json(value, pretty)?);
    Ok(())
}
