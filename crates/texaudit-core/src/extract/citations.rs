/*
 * citations.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Citation command extraction
 */

//! Citation command extraction.
//!
//! Any command whose name contains `cite` counts (`\cite`, `\citep`,
//! `\citeauthor`, `\parencite`, `\nocite`, ...). Up to two optional
//! arguments may precede the key group, and the group may hold several
//! comma-separated keys. Every occurrence is kept.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::discovery::SourceFile;
use crate::scan::{split_keys, strip_comment};

pub(crate) static CITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\([A-Za-z]*cite[A-Za-z*]*)\s*(?:\[[^\]]*\]\s*){0,2}\{([^}]+)\}")
        .expect("Invalid regex pattern for citation commands")
});

/// Commands that match the pattern but do not cite anything.
const NON_CITING_COMMANDS: [&str; 1] = ["citestyle"];

/// Key used by `\nocite{*}` to cite the whole bibliography.
pub const CITE_ALL_KEY: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub key: String,
    pub command: String,
    pub file: String,
    pub line: usize,
}

impl Citation {
    /// True for the plain `\cite` command, which carries no textual/parenthetical intent.
    pub fn is_generic(&self) -> bool {
        self.command.eq_ignore_ascii_case("cite")
    }

    pub fn cites_all(&self) -> bool {
        self.key == CITE_ALL_KEY
    }
}

pub fn extract_citations<'a>(files: impl IntoIterator<Item = &'a SourceFile>) -> Vec<Citation> {
    let mut citations = Vec::new();
    for file in files {
        for (line_no, line) in file.lines() {
            for caps in CITE_RE.captures_iter(strip_comment(line)) {
                let command = &caps[1];
                if NON_CITING_COMMANDS.contains(&command) {
                    continue;
                }
                citations.extend(split_keys(&caps[2]).map(|key| Citation {
                    key: key.to_string(),
                    command: command.to_string(),
                    file: file.relative.clone(),
                    line: line_no,
                }));
            }
        }
    }
    citations
}
