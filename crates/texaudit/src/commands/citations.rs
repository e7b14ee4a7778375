/*
 * citations.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Citations command implementation
 */

//! Citations command implementation.
//!
//! The local report is always produced. With `--remote`, every bibliography
//! entry in scope is also looked up on Crossref, one request at a time, and
//! the per-entry results are appended to the payload.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use texaudit_core::{CitationOptions, CitationReport, Project, RemoteConfig, citation_report};
use texaudit_remote::{CrossrefClient, Matcher, ValidationResult, status_counts};

use super::{ProjectArgs, print_json};

#[derive(Debug, Args)]
pub struct CitationsArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Entry file; limits the scan to its inclusion tree
    #[arg(long)]
    pub main_tex: Option<PathBuf>,

    /// Bibliography file (every .bib file when omitted)
    #[arg(long)]
    pub bib_file: Option<PathBuf>,

    /// Validate entries against Crossref
    #[arg(long)]
    pub remote: bool,

    /// Per-request timeout in seconds for remote lookups
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Candidates requested per title search
    #[arg(long)]
    pub rows: Option<usize>,

    /// Contact address sent to Crossref
    #[arg(long)]
    pub mailto: Option<String>,
}

#[derive(Debug, Serialize)]
struct CitationOutput {
    #[serde(flatten)]
    report: CitationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_results: Option<Vec<ValidationResult>>,
}

fn remote_config(base: &RemoteConfig, args: &CitationsArgs) -> RemoteConfig {
    let mut config = base.clone();
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(mailto) = &args.mailto {
        config.mailto = Some(mailto.clone());
    }
    config
}

/// Execute the citations command
pub fn execute(args: CitationsArgs) -> Result<ExitCode> {
    let project = Project::open(&args.project.project_root)?;
    let options = CitationOptions {
        entry: args.main_tex.clone(),
        bibliography: args.bib_file.clone(),
    };
    let mut report = citation_report(&project, &options)?;

    let validation_results = if args.remote {
        let config = remote_config(&project.config().remote, &args);
        let client = CrossrefClient::new(&config).context("Failed to create HTTP client")?;
        info!("validating {} entries against {}", report.bib_entries.len(), config.base_url);
        let results = Matcher::new(&client, config.rows).validate_all(&report.bib_entries);
        report.summary.remote_status_counts = Some(status_counts(&results));
        Some(results)
    } else {
        None
    };

    let output = CitationOutput {
        report,
        validation_results,
    };
    print_json(&output, args.project.pretty)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CitationsArgs,
    }

    #[test]
    fn test_flags_override_config() {
        let harness = Harness::parse_from(["t", "--remote", "--timeout", "2.5", "--mailto", "me@example.org"]);
        let config = remote_config(&RemoteConfig::default(), &harness.args);
        assert_eq!(config.timeout, 2.5);
        assert_eq!(config.rows, RemoteConfig::default().rows);
        assert_eq!(config.mailto.as_deref(), Some("me@example.org"));
    }
}
