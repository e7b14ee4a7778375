/*
 * include.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Inclusion tree resolution
 */

//! Inclusion tree resolution.
//!
//! Starting from an entry file, `\input{..}` and `\include{..}` directives
//! are followed depth-first in textual order. A target is resolved against
//! the including file's directory first, then against the project root.
//! Every file is visited at most once, so include cycles terminate.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::discovery::{SourceFile, normalize_path, relative_path};
use crate::scan::strip_comment;

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:input|include)\{([^}]+)\}").expect("Invalid regex pattern for include")
});

/// Marker identifying the document entry file.
pub const DOCUMENT_START_MARKER: &str = r"\documentclass";

/// Default extension appended to include targets.
pub const TEX_EXTENSION: &str = ".tex";

/// One inclusion directive and where it led.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InclusionEdge {
    /// Including file, root-relative.
    pub from: String,
    pub line: usize,
    /// Target text as written in the directive.
    pub target: String,
    /// Resolved file, root-relative, or `None` when nothing matched.
    pub resolved: Option<String>,
}

impl InclusionEdge {
    pub fn is_broken(&self) -> bool {
        self.resolved.is_none()
    }
}

/// Files reachable from an entry file, in traversal order.
#[derive(Debug, Clone, Default)]
pub struct IncludeTree {
    pub entry: PathBuf,
    pub files: Vec<SourceFile>,
    pub edges: Vec<InclusionEdge>,
}

impl IncludeTree {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn broken_edges(&self) -> impl Iterator<Item = &InclusionEdge> {
        self.edges.iter().filter(|e| e.is_broken())
    }
}

/// Pick the entry file: the first, in sorted order, containing the
/// document-start marker, else the first file.
pub fn detect_entry(files: &[SourceFile]) -> Option<&SourceFile> {
    files
        .iter()
        .find(|f| f.content.contains(DOCUMENT_START_MARKER))
        .or_else(|| files.first())
}

/// Resolve one include target relative to `including`, then to `root`.
pub fn resolve_target(root: &Path, including: &Path, target: &str) -> Option<PathBuf> {
    let mut target = target.trim().to_string();
    if !target.ends_with(TEX_EXTENSION) {
        target.push_str(TEX_EXTENSION);
    }

    let local = including.parent().map(|dir| dir.join(&target));
    local
        .into_iter()
        .chain(std::iter::once(root.join(&target)))
        .map(|candidate| normalize_path(&candidate))
        .find(|candidate| candidate.is_file())
}

/// Walk the inclusion tree of `entry`.
///
/// Files already present in `known` are reused instead of being read
/// again; anything else is loaded from disk on first visit.
pub fn resolve_includes(root: &Path, entry: &Path, known: &[SourceFile]) -> IncludeTree {
    let entry = normalize_path(entry);
    let mut tree = IncludeTree {
        entry: entry.clone(),
        ..Default::default()
    };
    let mut visited: BTreeSet<PathBuf> = BTreeSet::new();
    let mut stack = vec![entry];

    while let Some(path) = stack.pop() {
        if !visited.insert(path.clone()) {
            continue;
        }

        let file = known
            .iter()
            .find(|f| f.path == path)
            .cloned()
            .unwrap_or_else(|| SourceFile::load(root, &path));

        let mut children = Vec::new();
        for (line_no, line) in file.lines() {
            for caps in INCLUDE_RE.captures_iter(strip_comment(line)) {
                let target = caps[1].trim().to_string();
                let resolved = resolve_target(root, &path, &target);
                match &resolved {
                    Some(p) => {
                        debug!("{}:{} includes {}", file.relative, line_no, p.display());
                        children.push(p.clone());
                    }
                    None => debug!("{}:{} include target {} not found", file.relative, line_no, target),
                }
                tree.edges.push(InclusionEdge {
                    from: file.relative.clone(),
                    line: line_no,
                    target,
                    resolved: resolved.as_deref().map(|p| relative_path(root, p)),
                });
            }
        }

        tree.files.push(file);
        stack.extend(children.into_iter().rev());
    }

    tree
}
