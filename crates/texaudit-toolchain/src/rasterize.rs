/*
 * rasterize.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * pdftoppm invocation and page manifests
 */

//! PDF rasterization.
//!
//! Pages are rendered with `pdftoppm -png` into `<output>/page-N.png` and
//! listed in page order, together with a manifest that the page-review
//! scaffold can read back.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ToolchainError};
use crate::probe::{ToolCategory, locate};
use crate::process::run_with_timeout;

pub const MIN_DPI: u32 = 72;
pub const DEFAULT_DPI: u32 = 170;
pub const DEFAULT_OUTPUT_DIR: &str = ".texaudit/renders/page_review";
pub const PAGE_PREFIX: &str = "page";

pub const REVIEW_INSTRUCTION: &str = "Open each page image in order and inspect layout issues page by page \
     (overflow, clipping, spacing, caption overlap, table alignment, figure placement).";

static PAGE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)$").expect("Invalid regex pattern for page suffix"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterOptions {
    pub dpi: u32,
    pub first_page: u32,
    pub last_page: Option<u32>,
    pub timeout: Duration,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            first_page: 1,
            last_page: None,
            timeout: Duration::from_secs(crate::compile::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RasterOptions {
    /// DPI floored at [`MIN_DPI`].
    pub fn effective_dpi(&self) -> u32 {
        self.dpi.max(MIN_DPI)
    }

    pub fn pdftoppm_args(&self, pdf: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            "-png".to_string(),
            "-r".to_string(),
            self.effective_dpi().to_string(),
            "-f".to_string(),
            self.first_page.max(1).to_string(),
        ];
        if let Some(last) = self.last_page {
            args.push("-l".to_string());
            args.push(last.to_string());
        }
        args.push(pdf.display().to_string());
        args.push(output_dir.join(PAGE_PREFIX).display().to_string());
        args
    }
}

/// Page number from a `page-N.png` file name, 0 when absent.
pub fn page_number(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|stem| PAGE_SUFFIX_RE.captures(&stem.to_string_lossy()).map(|c| c[1].to_string()))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// Rendered page images in `dir`, ordered by page number.
pub fn list_page_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path.extension().is_some_and(|ext| ext == "png")
                && path
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(&format!("{PAGE_PREFIX}-")))
        })
        .collect();
    pages.sort_by_key(|p| (page_number(p), p.clone()));
    Ok(pages)
}

/// Rasterize with `pdftoppm` found on `PATH` or a Poppler install location.
pub fn rasterize_pdf(pdf: &Path, output_dir: &Path, options: &RasterOptions) -> Result<Vec<PathBuf>> {
    let pdftoppm = locate("pdftoppm", ToolCategory::Poppler)
        .ok_or_else(|| ToolchainError::ToolNotFound("pdftoppm".into()))?;
    rasterize_pdf_with(&pdftoppm, pdf, output_dir, options)
}

pub fn rasterize_pdf_with(
    pdftoppm: &Path,
    pdf: &Path,
    output_dir: &Path,
    options: &RasterOptions,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let output = run_with_timeout(pdftoppm, &options.pdftoppm_args(pdf, output_dir), None, options.timeout)?;
    if !output.success() {
        return Err(ToolchainError::Failed {
            program: "pdftoppm".to_string(),
            code: output.code,
            output: output.stderr_string().trim().to_string(),
        });
    }
    let pages = list_page_images(output_dir)?;
    debug!("rendered {} pages into {}", pages.len(), output_dir.display());
    Ok(pages)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    pub page: u32,
    pub image: String,
    pub image_relative_to_project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RasterSummary {
    pub project_root: String,
    pub pdf: String,
    pub output_dir: String,
    pub dpi: u32,
    pub rendered_pages: usize,
    pub listed_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RasterManifest {
    pub summary: RasterSummary,
    pub pages: Vec<PageImage>,
    pub review_instruction: &'static str,
}

/// `path` relative to `root` with `/` separators, if it lies under it.
pub fn relative_to(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(|rel| {
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    })
}

/// Manifest over `rendered`, listing at most `max_pages` when positive.
pub fn build_manifest(
    project_root: &Path,
    pdf: &Path,
    output_dir: &Path,
    dpi: u32,
    rendered: &[PathBuf],
    max_pages: Option<usize>,
) -> RasterManifest {
    let listed = match max_pages {
        Some(n) if n > 0 => &rendered[..n.min(rendered.len())],
        _ => rendered,
    };
    let pages: Vec<PageImage> = listed
        .iter()
        .map(|path| PageImage {
            page: page_number(path),
            image: path.display().to_string(),
            image_relative_to_project: relative_to(path, project_root),
        })
        .collect();

    RasterManifest {
        summary: RasterSummary {
            project_root: project_root.display().to_string(),
            pdf: pdf.display().to_string(),
            output_dir: output_dir.display().to_string(),
            dpi: dpi.max(MIN_DPI),
            rendered_pages: rendered.len(),
            listed_pages: pages.len(),
        },
        pages,
        review_instruction: REVIEW_INSTRUCTION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_page_number() {
        assert_eq!(page_number(Path::new("out/page-07.png")), 7);
        assert_eq!(page_number(Path::new("out/page-12.png")), 12);
        assert_eq!(page_number(Path::new("out/cover.png")), 0);
    }

    #[test]
    fn test_args() {
        let opts = RasterOptions {
            dpi: 30,
            first_page: 0,
            last_page: Some(4),
            ..Default::default()
        };
        let args = opts.pdftoppm_args(Path::new("paper.pdf"), Path::new("out"));
        assert_eq!(args, vec!["-png", "-r", "72", "-f", "1", "-l", "4", "paper.pdf", "out/page"]);
    }

    #[test]
    fn test_list_orders_numerically() {
        let temp = TempDir::new().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "notes.txt", "other-3.png"] {
            std::fs::write(temp.path().join(name), "").unwrap();
        }
        let pages = list_page_images(temp.path()).unwrap();
        let numbers: Vec<u32> = pages.iter().map(|p| page_number(p)).collect();
        assert_eq!(numbers, vec![1, 2, 10]);
    }

    #[test]
    fn test_manifest_limits_listing() {
        let root = Path::new("/proj");
        let rendered: Vec<PathBuf> = (1..=3)
            .map(|n| PathBuf::from(format!("/proj/out/page-{n}.png")))
            .collect();
        let manifest = build_manifest(root, Path::new("/proj/main.pdf"), Path::new("/proj/out"), 170, &rendered, Some(2));
        assert_eq!(manifest.summary.rendered_pages, 3);
        assert_eq!(manifest.summary.listed_pages, 2);
        assert_eq!(manifest.pages[1].image_relative_to_project.as_deref(), Some("out/page-2.png"));

        let outside = build_manifest(root, Path::new("x.pdf"), Path::new("/tmp"), 10, &[PathBuf::from("/tmp/page-1.png")], None);
        assert_eq!(outside.pages[0].image_relative_to_project, None);
        assert_eq!(outside.summary.dpi, MIN_DPI);
    }

    #[cfg(unix)]
    #[test]
    fn test_rasterize_with_fake_pdftoppm() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("pdftoppm");
        // The last argument is the output prefix.
        let script = "#!/bin/sh\nfor a; do prefix=$a; done\ntouch \"$prefix-1.png\" \"$prefix-2.png\"\n";
        std::fs::write(&bin, script).unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let out = temp.path().join("renders");
        let pages = rasterize_pdf_with(&bin, Path::new("paper.pdf"), &out, &RasterOptions::default()).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].ends_with("page-1.png"));
    }

    #[cfg(unix)]
    #[test]
    fn test_rasterize_failure() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("pdftoppm");
        std::fs::write(&bin, "#!/bin/sh\necho 'Syntax Error: broken' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = rasterize_pdf_with(&bin, Path::new("x.pdf"), &temp.path().join("o"), &RasterOptions::default())
            .unwrap_err();
        assert!(matches!(err, ToolchainError::Failed { ref output, .. } if output == "Syntax Error: broken"));
    }
}
