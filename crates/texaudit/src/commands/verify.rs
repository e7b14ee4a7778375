/*
 * verify.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Verify command implementation
 */

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, ValueEnum};

use texaudit_core::{Project, VerifyOptions, VerifyTarget, verify_report};

use super::{ProjectArgs, print_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Figures,
    Tables,
    Section,
}

impl From<TargetArg> for VerifyTarget {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Figures => Self::Figures,
            TargetArg::Tables => Self::Tables,
            TargetArg::Section => Self::Section,
        }
    }
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// What to verify
    #[arg(long, value_enum)]
    pub target: TargetArg,

    /// Entry file, relative to the project root (detected when omitted)
    #[arg(long)]
    pub main_tex: Option<PathBuf>,

    /// Section to verify (case-insensitive substring); required for --target section
    #[arg(long)]
    pub section_name: Option<String>,

    /// Minimum word count for the section
    #[arg(long)]
    pub min_section_words: Option<usize>,
}

/// Execute the verify command
pub fn execute(args: VerifyArgs) -> Result<ExitCode> {
    let project = Project::open(&args.project.project_root)?;
    let options = VerifyOptions {
        entry: args.main_tex,
        section_name: args.section_name,
        min_section_words: args.min_section_words,
        ..VerifyOptions::new(args.target.into())
    };
    let report = verify_report(&project, &options)?;
    print_json(&report, args.project.pretty)?;
    Ok(ExitCode::SUCCESS)
}
