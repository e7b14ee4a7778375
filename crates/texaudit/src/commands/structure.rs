/*
 * structure.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Structure command implementation
 */

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use tracing::debug;

use texaudit_core::{Project, StructureOptions, structure_report};

use super::{EXIT_FINDINGS, ProjectArgs, print_json};

#[derive(Debug, Args)]
pub struct StructureArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Entry file, relative to the project root (detected when omitted)
    #[arg(long)]
    pub main_tex: Option<PathBuf>,

    /// Bibliography file (every .bib file when omitted)
    #[arg(long)]
    pub bib_file: Option<PathBuf>,

    /// Maximum number of issues listed
    #[arg(long)]
    pub max_issues: Option<usize>,
}

/// Execute the structure command
///
/// Prints the report even for an empty project, then exits 1.
pub fn execute(args: StructureArgs) -> Result<ExitCode> {
    let project = Project::open(&args.project.project_root)?;
    let options = StructureOptions {
        entry: args.main_tex,
        bibliography: args.bib_file,
        max_issues: args.max_issues,
    };
    let report = structure_report(&project, &options)?;
    debug!("{} issues", report.summary.issues);
    print_json(&report, args.project.pretty)?;

    if report.has_sources() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_FINDINGS))
    }
}
