/*
 * rasterize.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rasterize command implementation
 */

//! Rasterize command implementation.
//!
//! The PDF is `--pdf`, or the entry file with a `.pdf` extension. It is
//! built with latexmk first when `--force-compile` is given, or when it is
//! missing and `--compile-if-missing` is given.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::debug;

use texaudit_core::Project;
use texaudit_toolchain::compile::DEFAULT_TIMEOUT_SECS;
use texaudit_toolchain::rasterize::{DEFAULT_DPI, DEFAULT_OUTPUT_DIR};
use texaudit_toolchain::{RasterOptions, build_manifest, compile_pdf, rasterize_pdf};

use super::{ProjectArgs, input_error, print_json, project_root, under_root};

#[derive(Debug, Args)]
pub struct RasterizeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Entry file, used to infer or compile the PDF
    #[arg(long)]
    pub main_tex: Option<PathBuf>,

    /// PDF to render (absolute or project-root relative)
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Output directory for page images
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Rasterization DPI (at least 72)
    #[arg(long, default_value_t = DEFAULT_DPI)]
    pub dpi: u32,

    /// First page to render
    #[arg(long, default_value_t = 1)]
    pub first_page: u32,

    /// Last page to render, inclusive
    #[arg(long)]
    pub last_page: Option<u32>,

    /// List only the first N rendered pages in the manifest
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Compile with latexmk if the PDF is missing
    #[arg(long)]
    pub compile_if_missing: bool,

    /// Always compile with latexmk before rendering
    #[arg(long)]
    pub force_compile: bool,

    /// Timeout in seconds for compile and rasterize commands
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

/// Execute the rasterize command
pub fn execute(args: RasterizeArgs) -> Result<ExitCode> {
    let root = project_root(&args.project.project_root)?;
    let project = Project::open(&root)?;
    // A wrong --main-tex only matters when the PDF has to be inferred or built.
    let main_tex = project.entry(args.main_tex.as_deref()).ok().flatten();
    let timeout = Duration::from_secs(args.timeout);

    let pdf = match (&args.pdf, &main_tex) {
        (Some(pdf), _) => under_root(&root, pdf),
        (None, Some(entry)) => entry.with_extension("pdf"),
        (None, None) => return Err(input_error("Could not infer PDF: provide --pdf or --main-tex")),
    };

    let needs_compile = args.force_compile || (args.compile_if_missing && !pdf.is_file());
    if needs_compile {
        let Some(entry) = &main_tex else {
            return Err(input_error("Compile requested but main TeX file could not be resolved"));
        };
        debug!("compiling {}", entry.display());
        compile_pdf(entry, timeout)?.into_result()?;
    }

    if !pdf.is_file() {
        return Err(input_error(format!(
            "PDF not found: {}. Use --compile-if-missing or provide an existing --pdf.",
            pdf.display()
        )));
    }

    let output_dir = under_root(&root, &args.output_dir);
    let options = RasterOptions {
        dpi: args.dpi,
        first_page: args.first_page,
        last_page: args.last_page,
        timeout,
    };
    let rendered = rasterize_pdf(&pdf, &output_dir, &options)?;
    let manifest = build_manifest(&root, &pdf, &output_dir, options.effective_dpi(), &rendered, args.max_pages);
    print_json(&manifest, args.project.pretty)?;
    Ok(ExitCode::SUCCESS)
}
