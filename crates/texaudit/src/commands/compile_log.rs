/*
 * compile_log.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compile-log command implementation
 */

use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use texaudit_toolchain::log::DEFAULT_MAX_ENTRIES;
use texaudit_toolchain::{LogLimits, analyze_log};

use super::{EXIT_FINDINGS, input_error, print_json};

#[derive(Debug, Args)]
pub struct CompileLogArgs {
    /// Path to a .log file or saved compiler output
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Compiler output passed directly
    #[arg(long)]
    pub log_text: Option<String>,

    /// Maximum number of extracted errors
    #[arg(long, default_value_t = DEFAULT_MAX_ENTRIES)]
    pub max_errors: usize,

    /// Maximum number of extracted warnings
    #[arg(long, default_value_t = DEFAULT_MAX_ENTRIES)]
    pub max_warnings: usize,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Exit with status 1 when the log has errors or a fatal marker
    #[arg(long)]
    pub fail_on_errors: bool,
}

fn load_log(args: &CompileLogArgs) -> Result<String> {
    if let Some(path) = &args.log_file {
        let bytes = std::fs::read(path)
            .map_err(|e| input_error(format!("Failed to read {}: {}", path.display(), e)))?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    if let Some(text) = &args.log_text {
        return Ok(text.clone());
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(input_error(
            "Provide --log-file, --log-text, or pipe log content via stdin.",
        ));
    }
    let mut bytes = Vec::new();
    stdin.read_to_end(&mut bytes).context("Failed to read stdin")?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Execute the compile-log command
pub fn execute(args: CompileLogArgs) -> Result<ExitCode> {
    let text = load_log(&args)?;
    let analysis = analyze_log(
        &text,
        LogLimits {
            max_errors: args.max_errors,
            max_warnings: args.max_warnings,
        },
    );
    print_json(&analysis, args.pretty)?;

    if args.fail_on_errors && analysis.has_errors() {
        Ok(ExitCode::from(EXIT_FINDINGS))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
