/*
 * review_pages.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Review-pages command implementation
 */

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use texaudit_core::to_json;
use texaudit_toolchain::rasterize::DEFAULT_OUTPUT_DIR;
use texaudit_toolchain::review::{DEFAULT_CHECKS, DEFAULT_GLOB};
use texaudit_toolchain::{build_review, pages_from_dir, pages_from_manifest, parse_checks};

use super::{EXIT_FINDINGS, ProjectArgs, input_error, project_root, under_root};

#[derive(Debug, Args)]
pub struct ReviewPagesArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Manifest written by `texaudit rasterize` (preferred input)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Directory containing page images
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub images_dir: PathBuf,

    /// Glob pattern for page images in --images-dir
    #[arg(long, default_value = DEFAULT_GLOB)]
    pub glob: String,

    /// Comma-separated checklist items for each page
    #[arg(long, default_value_t = DEFAULT_CHECKS.join(","))]
    pub checks: String,

    /// Write JSON here instead of stdout (project-root relative)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Execute the review-pages command
pub fn execute(args: ReviewPagesArgs) -> Result<ExitCode> {
    let root = project_root(&args.project.project_root)?;
    let checks = parse_checks(&args.checks);

    let pages = match &args.manifest {
        Some(manifest) => {
            let path = under_root(&root, manifest);
            if !path.is_file() {
                return Err(input_error(format!("Manifest not found: {}", path.display())));
            }
            pages_from_manifest(&path, &root)?
        }
        None => pages_from_dir(&under_root(&root, &args.images_dir), &args.glob)?,
    };

    if pages.is_empty() {
        eprintln!("No page images found. Run `texaudit rasterize` first.");
        return Ok(ExitCode::from(EXIT_FINDINGS));
    }

    let review = build_review(&pages, &root, &checks);
    let text = to_json(&review, args.project.pretty)?;
    match &args.output {
        Some(output) => {
            let path = under_root(&root, output);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, format!("{text}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("wrote review template to {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(ExitCode::SUCCESS)
}
