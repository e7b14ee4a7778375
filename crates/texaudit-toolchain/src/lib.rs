//! External collaborators for texaudit
//!
//! Everything that touches a LaTeX or Poppler binary, or the files they
//! produce, lives here:
//!
//! - [`probe`] - is the toolchain installed, and where
//! - [`compile`] - `latexmk` builds
//! - [`log`] - errors and warnings from a compile log
//! - [`rasterize`] - `pdftoppm` page rendering and manifests
//! - [`review`] - page-by-page layout review scaffolds
//!
//! Subprocesses run through [`process::run_with_timeout`] so that no call
//! can hang past its deadline.

pub mod compile;
pub mod error;
pub mod image;
pub mod log;
pub mod probe;
pub mod process;
pub mod rasterize;
pub mod review;

pub use compile::{CompileOutcome, compile_pdf};
pub use error::{Result, ToolchainError};
pub use log::{LogAnalysis, LogLimits, analyze_log};
pub use probe::{Probe, ToolCategory, ToolSpec, ToolStatus, ToolchainReport, default_tools, parse_tools};
pub use rasterize::{RasterManifest, RasterOptions, build_manifest, rasterize_pdf};
pub use review::{PageRef, PageReview, build_review, pages_from_dir, pages_from_manifest, parse_checks};
