/*
 * toolchain.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Toolchain command implementation
 */

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;

use texaudit_toolchain::{Probe, ToolchainReport, parse_tools};

use super::{EXIT_FINDINGS, print_json};

const DEFAULT_TOOLS: &str = "latexmk:latex,pdflatex:latex,pdfinfo:poppler,pdftoppm:poppler";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Args)]
pub struct ToolchainArgs {
    /// Comma-separated tools to check, as name or name:category (latex, poppler)
    #[arg(long, default_value = DEFAULT_TOOLS)]
    pub tools: String,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Exit with status 1 when any tool is missing
    #[arg(long)]
    pub fail_on_missing: bool,
}

fn print_text(report: &ToolchainReport) {
    for tool in &report.tools {
        let status = if tool.found { "OK".green() } else { "MISSING".red() };
        let mut line = format!("[{}] {} ({})", status, tool.name, tool.category);
        if let Some(path) = &tool.path {
            line.push_str(&format!(" -> {path}"));
        }
        println!("{line}");
        if let Some(hint) = &tool.install_hint {
            println!("  hint: {hint}");
        }
    }
}

/// Execute the toolchain command
pub fn execute(args: ToolchainArgs) -> Result<ExitCode> {
    let tools = parse_tools(&args.tools)?;
    let report = Probe::from_env().check(&tools);

    match args.format {
        OutputFormat::Json => print_json(&report, args.pretty)?,
        OutputFormat::Text => print_text(&report),
    }

    if args.fail_on_missing && !report.all_found {
        Ok(ExitCode::from(EXIT_FINDINGS))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
