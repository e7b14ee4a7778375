/*
 * bibliography.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * BibTeX record parsing
 */

//! BibTeX record parsing.
//!
//! Records are located by their `@type{` header and delimited with the
//! balanced-brace scanner, so a `}` closing a nested group inside a field
//! does not end the record. The text before the first comma is the key; the
//! rest is tokenized into `name = value` pairs where a value is a braced
//! group, a double-quoted string, or a bare token ending at a comma or line
//! break. Every field is retained under its lower-cased name; a fixed subset
//! is surfaced as typed fields that default to the empty string.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::discovery::SourceFile;
use crate::scan::{LineIndex, collapse_whitespace, scan_braces};

static RECORD_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@(\w+)\s*\{").expect("Invalid regex pattern for bibliography record")
});

static FIELD_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)\s*=").expect("Invalid regex pattern for field name")
});

/// Record types that do not describe a citable work.
const NON_ENTRY_TYPES: [&str; 3] = ["comment", "string", "preamble"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibEntry {
    pub key: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub file: String,
    pub line: usize,
    pub title: String,
    pub author: String,
    pub year: String,
    pub doi: String,
    /// arXiv identifier, from `eprint` or `arxiv`.
    pub arxiv: String,
    #[serde(skip)]
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    fn from_fields(key: String, entry_type: String, file: &str, line: usize, fields: BTreeMap<String, String>) -> Self {
        let get = |name: &str| fields.get(name).cloned().unwrap_or_default();
        let arxiv = match fields.get("eprint") {
            Some(eprint) if !eprint.is_empty() => eprint.clone(),
            _ => get("arxiv"),
        };
        Self {
            key,
            entry_type,
            file: file.to_string(),
            line,
            title: get("title"),
            author: get("author"),
            year: get("year"),
            doi: get("doi"),
            arxiv,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Parse every record in a bibliography file.
pub fn parse_bibliography(file: &SourceFile) -> Vec<BibEntry> {
    let content = file.content.as_str();
    let lines = LineIndex::new(content);
    let mut entries = Vec::new();
    let mut pos = 0;

    while let Some(found) = content[pos..].find('@') {
        let start = pos + found;
        let Some(header) = RECORD_START_RE.captures(&content[start..]) else {
            pos = start + 1;
            continue;
        };
        let entry_type = header[1].to_lowercase();
        let header_end = start + header.get(0).map_or(1, |m| m.end());
        let record = scan_braces(content, header_end);

        if !NON_ENTRY_TYPES.contains(&entry_type.as_str())
            && let Some((key, field_text)) = record.body.split_once(',')
        {
            let key = key.trim();
            if !key.is_empty() {
                entries.push(BibEntry::from_fields(
                    key.to_string(),
                    entry_type,
                    &file.relative,
                    lines.line(start),
                    parse_fields(field_text),
                ));
            }
        }

        if !record.closed {
            break;
        }
        pos = record.end;
    }

    entries
}

/// Tokenize `name = value` pairs. Later duplicates overwrite earlier ones.
pub fn parse_fields(text: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    let mut i = 0;

    while i < text.len() {
        i += leading_len(&text[i..], |c| c.is_whitespace() || c == ',');
        if i >= text.len() {
            break;
        }

        let Some(caps) = FIELD_NAME_RE.captures(&text[i..]) else {
            i += text[i..].chars().next().map_or(1, char::len_utf8);
            continue;
        };
        let name = caps[1].to_lowercase();
        i += caps.get(0).map_or(0, |m| m.end());
        i += leading_len(&text[i..], char::is_whitespace);
        if i >= text.len() {
            break;
        }

        let (value, next) = read_value(text, i);
        fields.insert(name, collapse_whitespace(value));
        i = next;
    }

    fields
}

/// Read one field value starting at `i`; returns the value and the offset after it.
fn read_value(text: &str, i: usize) -> (&str, usize) {
    let rest = &text[i..];
    if rest.starts_with('{') {
        let group = scan_braces(text, i + 1);
        return (group.body, group.end);
    }
    if rest.starts_with('"') {
        let start = i + 1;
        let mut prev = '"';
        for (offset, ch) in text[start..].char_indices() {
            if ch == '"' && prev != '\\' {
                return (&text[start..start + offset], start + offset + 1);
            }
            prev = ch;
        }
        return (&text[start..], text.len());
    }
    let len = leading_len(rest, |c| !matches!(c, ',' | '\n' | '\r'));
    (&rest[..len], i + len)
}

fn leading_len(text: &str, pred: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|(_, c)| !pred(*c))
        .map_or(text.len(), |(idx, _)| idx)
}
