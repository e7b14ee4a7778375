/*
 * compile.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * latexmk invocation
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, ToolchainError};
use crate::probe::{ToolCategory, locate};
use crate::process::run_with_timeout;

pub const DEFAULT_TIMEOUT_SECS: u64 = 240;

/// Output lines kept from a failed run.
pub const OUTPUT_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileOutcome {
    pub success: bool,
    pub code: i32,
    pub pdf: PathBuf,
    pub output_tail: Vec<String>,
}

/// The argument list for a non-interactive PDF build of `entry`.
pub fn latexmk_args(entry: &Path) -> Vec<String> {
    let name = entry
        .file_name()
        .map_or_else(|| entry.display().to_string(), |n| n.to_string_lossy().into_owned());
    vec![
        "-pdf".to_string(),
        "-interaction=nonstopmode".to_string(),
        "-halt-on-error".to_string(),
        name,
    ]
}

/// Compile `entry` with `latexmk` found on `PATH`.
pub fn compile_pdf(entry: &Path, timeout: Duration) -> Result<CompileOutcome> {
    let latexmk =
        locate("latexmk", ToolCategory::Latex).ok_or_else(|| ToolchainError::ToolNotFound("latexmk".into()))?;
    compile_pdf_with(&latexmk, entry, timeout)
}

/// Compile `entry` with an explicit `latexmk` binary.
///
/// Runs in the entry's directory. A non-zero exit is not an error: the
/// outcome carries the code and the tail of the combined output.
pub fn compile_pdf_with(latexmk: &Path, entry: &Path, timeout: Duration) -> Result<CompileOutcome> {
    let cwd = entry.parent().filter(|p| !p.as_os_str().is_empty());
    let output = run_with_timeout(latexmk, &latexmk_args(entry), cwd, timeout)?;
    let pdf = entry.with_extension("pdf");

    if output.success() {
        debug!("compiled {}", pdf.display());
        Ok(CompileOutcome {
            success: true,
            code: 0,
            pdf,
            output_tail: Vec::new(),
        })
    } else {
        warn!("latexmk failed with code {}", output.code);
        Ok(CompileOutcome {
            success: false,
            code: output.code,
            pdf,
            output_tail: output.tail(OUTPUT_TAIL_LINES),
        })
    }
}

impl CompileOutcome {
    /// Convert a failed outcome into an error.
    pub fn into_result(self) -> Result<PathBuf> {
        if self.success {
            Ok(self.pdf)
        } else {
            Err(ToolchainError::Failed {
                program: "latexmk".to_string(),
                code: self.code,
                output: self.output_tail.join("\n"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_use_file_name() {
        let args = latexmk_args(Path::new("/paper/src/main.tex"));
        assert_eq!(args, vec!["-pdf", "-interaction=nonstopmode", "-halt-on-error", "main.tex"]);
    }

    #[cfg(unix)]
    fn fake_latexmk(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("latexmk");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_keeps_output_tail() {
        let temp = tempfile::TempDir::new().unwrap();
        let entry = temp.path().join("main.tex");
        std::fs::write(&entry, "").unwrap();
        let bin = fake_latexmk(temp.path(), "i=0; while [ $i -lt 30 ]; do echo line$i; i=$((i+1)); done; exit 12");

        let outcome = compile_pdf_with(&bin, &entry, Duration::from_secs(10)).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.code, 12);
        assert_eq!(outcome.output_tail.len(), OUTPUT_TAIL_LINES);
        assert_eq!(outcome.output_tail.last().map(String::as_str), Some("line29"));

        let err = outcome.into_result().unwrap_err();
        assert!(err.to_string().starts_with("latexmk failed with code 12"));
    }

    #[cfg(unix)]
    #[test]
    fn test_success_runs_in_entry_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let entry = temp.path().join("main.tex");
        std::fs::write(&entry, "").unwrap();
        let bin = fake_latexmk(temp.path(), "touch main.pdf");

        let outcome = compile_pdf_with(&bin, &entry, Duration::from_secs(10)).unwrap();
        assert!(outcome.success);
        assert!(temp.path().join("main.pdf").is_file());
        assert_eq!(outcome.into_result().unwrap(), entry.with_extension("pdf"));
    }
}
