/*
 * review.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Page-by-page layout review scaffold
 */

//! Page-by-page layout review scaffold.
//!
//! No image analysis happens here beyond reading PNG headers. Each page gets
//! metadata, a few automatic flags and an empty review template for a human
//! or agent to fill in, in ascending page order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ToolchainError};
use crate::image::read_png_dimensions;
use crate::rasterize::relative_to;

pub const DEFAULT_GLOB: &str = "page-*.png";

pub const DEFAULT_CHECKS: [&str; 5] = [
    "overflow_or_clipping",
    "figure_table_placement",
    "caption_overlap",
    "spacing_and_alignment",
    "font_or_resolution_consistency",
];

pub const MIN_WIDTH: u32 = 900;
pub const MIN_HEIGHT: u32 = 1200;
pub const SPARSE_PAGE_BYTES: u64 = 25_000;

const PENDING: &str = "pending";

pub const REVIEW_INSTRUCTION: &str = "Inspect images page by page in ascending order. Fill each page's \
     review_template, then complete aggregate_template for final layout decision.";

static FIRST_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("Invalid regex pattern for page number"));

/// Comma-separated checklist, or the defaults when empty.
pub fn parse_checks(raw: &str) -> Vec<String> {
    let checks: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if checks.is_empty() {
        DEFAULT_CHECKS.iter().map(|c| c.to_string()).collect()
    } else {
        checks
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub page: u32,
    pub image: PathBuf,
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn first_number(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|stem| FIRST_NUMBER_RE.captures(&stem.to_string_lossy()).map(|c| c[1].to_string()))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// Page images in `dir` matching `pattern`, ordered by the first number in
/// each file name. A missing directory yields no pages.
pub fn pages_from_dir(dir: &Path, pattern: &str) -> Result<Vec<PageRef>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let full = dir.join(pattern).to_string_lossy().into_owned();
    let paths = glob::glob(&full).map_err(|e| ToolchainError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut pages: Vec<PageRef> = paths
        .filter_map(|p| p.ok())
        .filter(|p| p.is_file())
        .map(|p| PageRef {
            page: first_number(&p),
            image: absolute(&p),
        })
        .collect();
    pages.sort_by_key(|p| p.page);
    Ok(pages)
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    pages: Vec<serde_json::Value>,
}

/// Pages listed in a rasterize manifest.
///
/// Entries that are not objects, or carry neither `image` nor
/// `image_relative_to_project`, are skipped.
pub fn pages_from_manifest(manifest: &Path, project_root: &Path) -> Result<Vec<PageRef>> {
    let content = std::fs::read_to_string(manifest)?;
    let file: ManifestFile = serde_json::from_str(&content).map_err(|e| ToolchainError::Manifest {
        path: manifest.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut pages: Vec<PageRef> = file
        .pages
        .iter()
        .filter_map(|item| {
            let item = item.as_object()?;
            let page = item
                .get("page")
                .and_then(serde_json::Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            let image = match item.get("image").and_then(|v| v.as_str()).filter(|s| !s.is_empty()) {
                Some(image) => PathBuf::from(image),
                None => project_root.join(item.get("image_relative_to_project")?.as_str()?),
            };
            Some(PageRef {
                page,
                image: absolute(&image),
            })
        })
        .collect();
    pages.sort_by_key(|p| p.page);
    Ok(pages)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoFlag {
    LowResolutionRisk,
    SizeInconsistency,
    PossibleSparseOrBlankPage,
}

impl AutoFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowResolutionRisk => "low_resolution_risk",
            Self::SizeInconsistency => "size_inconsistency",
            Self::PossibleSparseOrBlankPage => "possible_sparse_or_blank_page",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: u64,
}

impl PageMetadata {
    pub fn read(path: &Path) -> Self {
        let dims = read_png_dimensions(path);
        Self {
            width: dims.map(|d| d.0),
            height: dims.map(|d| d.1),
            bytes: path.metadata().map_or(0, |m| m.len()),
        }
    }

    fn size(&self) -> Option<ImageSize> {
        Some(ImageSize {
            width: self.width?,
            height: self.height?,
        })
    }
}

pub fn auto_flags(metadata: &PageMetadata, dominant: Option<ImageSize>) -> Vec<AutoFlag> {
    let mut flags = Vec::new();
    if let Some(size) = metadata.size() {
        if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
            flags.push(AutoFlag::LowResolutionRisk);
        }
        if dominant.is_some_and(|d| d != size) {
            flags.push(AutoFlag::SizeInconsistency);
        }
    }
    if metadata.bytes < SPARSE_PAGE_BYTES {
        flags.push(AutoFlag::PossibleSparseOrBlankPage);
    }
    flags
}

/// Most frequent size; ties go to the size seen first.
pub fn dominant_size(sizes: impl IntoIterator<Item = ImageSize>) -> Option<ImageSize> {
    let mut counts: Vec<(ImageSize, usize)> = Vec::new();
    for size in sizes {
        match counts.iter_mut().find(|(s, _)| *s == size) {
            Some((_, n)) => *n += 1,
            None => counts.push((size, 1)),
        }
    }
    let mut best: Option<(ImageSize, usize)> = None;
    for (size, n) in counts {
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((size, n));
        }
    }
    best.map(|(size, _)| size)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckItem {
    pub name: String,
    pub result: &'static str,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageTemplate {
    pub page_score: Option<f64>,
    pub status: &'static str,
    pub checks: Vec<CheckItem>,
    pub issues: Vec<String>,
    pub notes: String,
}

impl PageTemplate {
    fn pending(checks: &[String]) -> Self {
        Self {
            page_score: None,
            status: PENDING,
            checks: checks
                .iter()
                .map(|name| CheckItem {
                    name: name.clone(),
                    result: PENDING,
                    note: String::new(),
                })
                .collect(),
            issues: Vec::new(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageEntry {
    pub page: u32,
    pub image: String,
    pub image_relative_to_project: Option<String>,
    pub metadata: PageMetadata,
    pub auto_flags: Vec<AutoFlag>,
    pub review_template: PageTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub project_root: String,
    pub total_pages: usize,
    pub dominant_image_size: Option<ImageSize>,
    pub auto_flag_counts: BTreeMap<AutoFlag, usize>,
    pub overall_status: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateTemplate {
    pub overall_score: Option<f64>,
    pub blocking_issues: Vec<String>,
    pub high_priority_fixes: Vec<String>,
    pub page_order_reviewed: Vec<u32>,
    pub final_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReview {
    pub summary: ReviewSummary,
    pub pages: Vec<PageEntry>,
    pub aggregate_template: AggregateTemplate,
    pub review_instruction: &'static str,
}

/// Build the review scaffold for `pages`, already in page order.
pub fn build_review(pages: &[PageRef], project_root: &Path, checks: &[String]) -> PageReview {
    let metadata: Vec<PageMetadata> = pages.iter().map(|p| PageMetadata::read(&p.image)).collect();
    let dominant = dominant_size(metadata.iter().filter_map(PageMetadata::size));
    debug!("reviewing {} pages, dominant size {:?}", pages.len(), dominant);

    let mut flag_counts = BTreeMap::new();
    let entries: Vec<PageEntry> = pages
        .iter()
        .zip(metadata)
        .map(|(page, metadata)| {
            let flags = auto_flags(&metadata, dominant);
            for flag in &flags {
                *flag_counts.entry(*flag).or_insert(0) += 1;
            }
            PageEntry {
                page: page.page,
                image: page.image.display().to_string(),
                image_relative_to_project: relative_to(&page.image, project_root),
                metadata,
                auto_flags: flags,
                review_template: PageTemplate::pending(checks),
            }
        })
        .collect();

    PageReview {
        summary: ReviewSummary {
            project_root: project_root.display().to_string(),
            total_pages: entries.len(),
            dominant_image_size: dominant,
            auto_flag_counts: flag_counts,
            overall_status: "pending_manual_review",
        },
        pages: entries,
        aggregate_template: AggregateTemplate::default(),
        review_instruction: REVIEW_INSTRUCTION,
    }
}
