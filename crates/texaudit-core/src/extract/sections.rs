/*
 * sections.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Sectioning command extraction
 */

//! Sectioning command extraction.
//!
//! Five heading levels are recognized, from `\section` (level 1) down to
//! `\subparagraph` (level 5). A section's body is any text following the
//! heading's title on the same line, then every comment-stripped line after
//! it, up to the next heading or the end of the file.
//! Lines that held only a comment are left out of the body so they do not
//! split paragraphs.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::discovery::SourceFile;
use crate::scan::{collapse_whitespace, scan_braces, strip_comment, word_count};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(section|subsection|subsubsection|paragraph|subparagraph)(\*?)\s*(?:\[[^\]]*\])?\s*\{")
        .expect("Invalid regex pattern for sectioning commands")
});

/// Heading commands by depth.
pub const HEADING_COMMANDS: [&str; 5] = [
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Heading level for a command name, or 0 when it is not a heading.
pub fn heading_level(command: &str) -> u8 {
    HEADING_COMMANDS
        .iter()
        .position(|c| *c == command)
        .map_or(0, |i| (i + 1) as u8)
}

/// A body line with its 1-based line number in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLine {
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub level: u8,
    pub command: String,
    pub starred: bool,
    pub file: String,
    pub line: usize,
    pub word_count: usize,
    #[serde(skip)]
    pub body: Vec<SectionLine>,
}

impl Section {
    /// Blank-line separated paragraphs as (first line, text).
    pub fn paragraphs(&self) -> Vec<(usize, String)> {
        let mut paragraphs = Vec::new();
        let mut current: Option<(usize, Vec<&str>)> = None;

        for line in &self.body {
            if line.text.trim().is_empty() {
                if let Some((start, lines)) = current.take() {
                    paragraphs.push((start, lines.join("\n")));
                }
                continue;
            }
            current
                .get_or_insert_with(|| (line.line, Vec::new()))
                .1
                .push(&line.text);
        }
        if let Some((start, lines)) = current {
            paragraphs.push((start, lines.join("\n")));
        }
        paragraphs
    }

    fn finish(mut self) -> Self {
        self.word_count = self.body.iter().map(|l| word_count(&l.text)).sum();
        self
    }
}

pub fn extract_sections<'a>(files: impl IntoIterator<Item = &'a SourceFile>) -> Vec<Section> {
    let mut sections = Vec::new();
    for file in files {
        let mut current: Option<Section> = None;

        for (line_no, raw) in file.lines() {
            let line = strip_comment(raw);
            let headings = headings_in(line, file, line_no);

            if headings.is_empty() {
                let comment_only = line.trim().is_empty() && !raw.trim().is_empty();
                if let Some(section) = current.as_mut()
                    && !comment_only
                {
                    section.body.push(SectionLine {
                        line: line_no,
                        text: line.trim_end().to_string(),
                    });
                }
                continue;
            }

            sections.extend(current.take().map(Section::finish));
            let mut headings = headings.into_iter();
            current = headings.next_back();
            sections.extend(headings.map(Section::finish));
        }

        sections.extend(current.map(Section::finish));
    }
    sections
}

fn headings_in(line: &str, file: &SourceFile, line_no: usize) -> Vec<Section> {
    let matches: Vec<_> = HEADING_RE.captures_iter(line).collect();
    let mut sections = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let command = caps[1].to_string();
        let title = scan_braces(line, whole.end());
        let next_start = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(line.len(), |m| m.start());

        let mut body = Vec::new();
        let rest = line.get(title.end..next_start).unwrap_or_default().trim();
        if !rest.is_empty() {
            body.push(SectionLine {
                line: line_no,
                text: rest.to_string(),
            });
        }

        sections.push(Section {
            name: collapse_whitespace(title.body),
            level: heading_level(&command),
            command,
            starred: &caps[2] == "*",
            file: file.relative.clone(),
            line: line_no,
            word_count: 0,
            body,
        });
    }
    sections
}
