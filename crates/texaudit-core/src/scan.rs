/*
 * scan.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Low-level text scanning primitives
 */

//! Low-level text scanning.
//!
//! Two primitives carry the whole narrow-grammar approach: [`strip_comment`]
//! removes a trailing `%` comment from a line, and [`scan_balanced`] finds
//! the close matching an already-consumed open delimiter. Brace groups,
//! bibliography records, field values, section titles and environment
//! bodies are all read with the same scanner.

/// Remove the trailing line comment from `line`.
///
/// A backslash escapes the character after it, so `\%` stays in the text
/// while `\\%` still starts a comment.
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'%' => return &line[..i],
            _ => i += 1,
        }
    }
    line
}

/// Result of a balanced-delimiter scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balanced<'a> {
    /// Text between the open delimiter and its matching close.
    pub body: &'a str,
    /// Byte offset just past the close delimiter, or the end of input.
    pub end: usize,
    /// False when input ended before the depth returned to zero.
    pub closed: bool,
}

/// Scan forward from `start`, which must sit just after an `open` delimiter,
/// and return the text up to the matching `close`.
///
/// Depth starts at 1 and moves with every `open` and `close` seen. When the
/// input runs out first, everything from `start` is returned with
/// `closed == false`. For delimiters that are not themselves commands, a
/// backslash escapes the following character so `\{` and `\}` do not count.
pub fn scan_balanced<'a>(content: &'a str, start: usize, open: &str, close: &str) -> Balanced<'a> {
    let start = start.min(content.len());
    let honor_escapes = !open.starts_with('\\') && !close.starts_with('\\');
    let mut depth = 1usize;
    let mut i = start;

    while i < content.len() {
        let rest = &content[i..];
        if rest.starts_with(close) {
            depth -= 1;
            if depth == 0 {
                return Balanced {
                    body: &content[start..i],
                    end: i + close.len(),
                    closed: true,
                };
            }
            i += close.len();
        } else if rest.starts_with(open) {
            depth += 1;
            i += open.len();
        } else {
            let mut chars = rest.chars();
            let ch = chars.next().map_or(1, char::len_utf8);
            i += ch;
            if honor_escapes && rest.starts_with('\\') {
                i += chars.next().map_or(0, char::len_utf8);
            }
        }
    }

    Balanced {
        body: &content[start..],
        end: content.len(),
        closed: false,
    }
}

/// Brace-group shorthand for [`scan_balanced`].
pub fn scan_braces(content: &str, start: usize) -> Balanced<'_> {
    scan_balanced(content, start, "{", "}")
}

/// Newline positions of one file, for offset-to-line lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_breaks: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let line_breaks = content
            .bytes()
            .enumerate()
            .filter_map(|(i, b)| (b == b'\n').then_some(i))
            .collect();
        Self { line_breaks }
    }

    /// 1-based line number of a byte offset. Offsets past the end map to
    /// the last line.
    pub fn line(&self, offset: usize) -> usize {
        self.line_breaks.partition_point(|&brk| brk < offset) + 1
    }
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split a comma-separated key list, dropping empty keys.
pub fn split_keys(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|k| !k.is_empty())
}
