//! texaudit CLI - Main entry point

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "texaudit")]
#[command(version)]
#[command(about = "Structure and citation validator for LaTeX projects", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the project's structure and consistency issues
    Structure(commands::structure::StructureArgs),

    /// Check citations against the bibliography, optionally online
    Citations(commands::citations::CitationsArgs),

    /// Verify figures, tables or one named section
    Verify(commands::verify::VerifyArgs),

    /// Check that the LaTeX and Poppler binaries are installed
    Toolchain(commands::toolchain::ToolchainArgs),

    /// Extract errors and warnings from a compile log
    CompileLog(commands::compile_log::CompileLogArgs),

    /// Render PDF pages to PNG images for layout review
    Rasterize(commands::rasterize::RasterizeArgs),

    /// Build a page-by-page layout review template
    ReviewPages(commands::review_pages::ReviewPagesArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "texaudit=debug" } else { "texaudit=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Structure(args) => commands::structure::execute(args),
        Commands::Citations(args) => commands::citations::execute(args),
        Commands::Verify(args) => commands::verify::execute(args),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
        Commands::CompileLog(args) => commands::compile_log::execute(args),
        Commands::Rasterize(args) => commands::rasterize::execute(args),
        Commands::ReviewPages(args) => commands::review_pages::execute(args),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            commands::exit_code_for(&err)
        }
    }
}
