/*
 * floats.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Figure and table environment extraction
 */

//! Figure and table environment extraction.
//!
//! Each `\begin{figure}` (or `figure*`) opens a region closed by the
//! matching `\end{..}` of the same name. The region's raw text, markers
//! included, becomes the entity body; the first `\label` and first
//! `\caption` inside it are surfaced.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::discovery::SourceFile;
use crate::extract::Reference;
use crate::scan::{LineIndex, collapse_whitespace, scan_balanced, scan_braces};

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\label\{([^}]+)\}").expect("Invalid regex pattern for label"));

static BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{(figure|table)(\*?)\}").expect("Invalid regex pattern for environment start")
});

static CAPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\caption\s*(?:\[[^\]]*\])?\s*\{").expect("Invalid regex pattern for caption")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatKind {
    Figure,
    Table,
}

impl FloatKind {
    pub fn environment(self) -> &'static str {
        match self {
            Self::Figure => "figure",
            Self::Table => "table",
        }
    }

    /// Label prefix expected by convention.
    pub fn label_prefix(self) -> &'static str {
        match self {
            Self::Figure => "fig:",
            Self::Table => "tab:",
        }
    }
}

impl fmt::Display for FloatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.environment())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloatEntity {
    pub kind: FloatKind,
    pub file: String,
    pub line: usize,
    pub label: String,
    pub caption: String,
    pub ref_count: usize,
    #[serde(skip)]
    pub body: String,
}

impl FloatEntity {
    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }

    pub fn has_caption(&self) -> bool {
        !self.caption.is_empty()
    }

    pub fn has_expected_prefix(&self) -> bool {
        self.label.starts_with(self.kind.label_prefix())
    }
}

pub fn extract_floats<'a>(files: impl IntoIterator<Item = &'a SourceFile>, kind: FloatKind) -> Vec<FloatEntity> {
    let env = kind.environment();

    let mut entities = Vec::new();
    for file in files {
        let content = file.content.as_str();
        let lines = LineIndex::new(content);
        let mut pos = 0;

        while let Some(caps) = BEGIN_RE.captures_at(content, pos) {
            let Some(open) = caps.get(0) else { break };
            if &caps[1] != env {
                pos = open.end();
                continue;
            }
            let star = &caps[2];
            let open_marker = format!("\\begin{{{env}{star}}}");
            let close_marker = format!("\\end{{{env}{star}}}");
            let region = scan_balanced(content, open.end(), &open_marker, &close_marker);
            let body = &content[open.start()..region.end];

            entities.push(FloatEntity {
                kind,
                file: file.relative.clone(),
                line: lines.line(open.start()),
                label: first_label(body),
                caption: first_caption(body),
                ref_count: 0,
                body: body.to_string(),
            });
            pos = region.end;
        }
    }
    entities
}

/// Set each entity's `ref_count` from the references pointing at its label.
pub fn count_references(entities: &mut [FloatEntity], references: &[Reference]) {
    for entity in entities.iter_mut() {
        entity.ref_count = if entity.has_label() {
            references.iter().filter(|r| r.key == entity.label).count()
        } else {
            0
        };
    }
}

fn first_label(body: &str) -> String {
    LABEL_RE
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}

fn first_caption(body: &str) -> String {
    CAPTION_RE
        .find(body)
        .map(|m| collapse_whitespace(scan_braces(body, m.end()).body))
        .unwrap_or_default()
}
