/*
 * log.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compile log analysis
 */

//! Compile log analysis.
//!
//! TeX hard-wraps its log at 79 columns. Wrapped lines are re-joined before
//! matching, then errors, warnings and fatal markers are extracted.
//!
//! ## Errors
//! ```text
//! ! Undefined control sequence.
//! l.42 \foo
//! LaTeX Error: File `missing.sty' not found.
//! Package amsmath Error: \begin{split} won't work here.
//! ```
//!
//! A `! ` line is annotated with the `[l.N]` location from an `l.N` line
//! within the next five lines.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Column at which TeX wraps log lines.
pub const LOG_LINE_WIDTH: usize = 79;

pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// Lines scanned after a `! ` error for its source location.
const LOCATION_LOOKAHEAD: usize = 5;

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^l\.(\d+)\s+(.*)$").expect("Invalid regex pattern for location line"));

static PACKAGE_ERROR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Package\s+\S+\s+Error:").expect("Invalid regex pattern for package error"));

static WARNING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:LaTeX Warning: .+|Package \S+ Warning: .+|(?:Overfull|Underfull) \\[hv]box.+)$")
        .expect("Invalid regex pattern for warnings")
});

static FATAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"Emergency stop|Fatal error occurred|No pages of output|error in previous invocation")
        .case_insensitive(true)
        .build()
        .expect("Invalid regex pattern for fatal markers")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLimits {
    pub max_errors: usize,
    pub max_warnings: usize,
}

impl Default for LogLimits {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ENTRIES,
            max_warnings: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogAnalysis {
    pub fatal: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub summary: LogSummary,
}

impl LogAnalysis {
    pub fn has_errors(&self) -> bool {
        self.fatal || !self.errors.is_empty()
    }
}

/// Re-join lines that TeX wrapped at [`LOG_LINE_WIDTH`].
///
/// A physical line of at least the wrap width continues on the next one.
pub fn unwrap_lines(text: &str) -> Vec<String> {
    let mut merged = Vec::new();
    let mut lines = text.split('\n').peekable();
    while let Some(first) = lines.next() {
        let mut current = first.to_string();
        let mut last_width = first.chars().count();
        while last_width >= LOG_LINE_WIDTH {
            let Some(next) = lines.next() else { break };
            current.push_str(next);
            last_width = next.chars().count();
        }
        merged.push(current);
    }
    merged
}

pub fn extract_errors(lines: &[String], limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut errors = Vec::new();
    let mut i = 0;
    while i < lines.len() && errors.len() < limit {
        let line = lines[i].trim();
        if line.starts_with("! ") {
            let mut entry = line.to_string();
            let end = (i + 1 + LOCATION_LOOKAHEAD).min(lines.len());
            for j in i + 1..end {
                if let Some(caps) = LOCATION_RE.captures(lines[j].trim()) {
                    entry.push_str(&format!("  [l.{}]", &caps[1]));
                    i = j;
                    break;
                }
            }
            errors.push(entry);
        } else if line.starts_with("LaTeX Error:") || PACKAGE_ERROR_RE.is_match(line) {
            errors.push(line.to_string());
        }
        i += 1;
    }
    errors
}

pub fn extract_warnings(lines: &[String], limit: usize) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| WARNING_RE.is_match(l))
        .take(limit.max(1))
        .map(str::to_string)
        .collect()
}

pub fn detect_fatal(text: &str) -> bool {
    FATAL_RE.is_match(text)
}

pub fn analyze_log(text: &str, limits: LogLimits) -> LogAnalysis {
    let lines = unwrap_lines(text);
    let errors = extract_errors(&lines, limits.max_errors);
    let warnings = extract_warnings(&lines, limits.max_warnings);
    LogAnalysis {
        fatal: detect_fatal(text),
        summary: LogSummary {
            error_count: errors.len(),
            warning_count: warnings.len(),
        },
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
This is pdfTeX, Version 3.141592653
(./main.tex
LaTeX Warning: Reference `fig:x' on page 1 undefined on input line 12.
Overfull \\hbox (12.3pt too wide) in paragraph at lines 20--21
! Undefined control sequence.
<recently read> \\foo
l.42 \\foo
       bar
Package natbib Warning: Citation `smith' on page 2 undefined.
! LaTeX Error: File `missing.sty' not found.
Package amsmath Error: \\begin{split} won't work here.
! Emergency stop.
No pages of output.
";

    #[test]
    fn test_errors_with_location() {
        let a = analyze_log(LOG, LogLimits::default());
        assert_eq!(
            a.errors,
            vec![
                "! Undefined control sequence.  [l.42]",
                "! LaTeX Error: File `missing.sty' not found.",
                "Package amsmath Error: \\begin{split} won't work here.",
                "! Emergency stop.",
            ]
        );
        assert!(a.fatal);
        assert!(a.has_errors());
        assert_eq!(a.summary.error_count, 4);
    }

    #[test]
    fn test_warnings() {
        let a = analyze_log(LOG, LogLimits::default());
        assert_eq!(a.warnings.len(), 3);
        assert!(a.warnings[0].starts_with("LaTeX Warning: Reference"));
        assert!(a.warnings[1].starts_with("Overfull \\hbox"));
        assert!(a.warnings[2].starts_with("Package natbib Warning"));
    }

    #[test]
    fn test_limits_floor_at_one() {
        let a = analyze_log(
            LOG,
            LogLimits {
                max_errors: 0,
                max_warnings: 2,
            },
        );
        assert_eq!(a.errors.len(), 1);
        assert_eq!(a.warnings.len(), 2);
    }

    #[test]
    fn test_unwrap_wrapped_warning() {
        let head = format!("LaTeX Warning: {}", "x".repeat(LOG_LINE_WIDTH - 15));
        assert_eq!(head.chars().count(), LOG_LINE_WIDTH);
        let text = format!("{head}\nend of warning.\nnext line");
        let lines = unwrap_lines(&text);
        assert_eq!(lines, vec![format!("{head}end of warning."), "next line".to_string()]);
    }

    #[test]
    fn test_location_lookahead_is_bounded() {
        let text = "! Missing $ inserted.\na\nb\nc\nd\ne\nl.7 x";
        let a = analyze_log(text, LogLimits::default());
        assert_eq!(a.errors, vec!["! Missing $ inserted."]);
    }

    #[test]
    fn test_clean_log() {
        let a = analyze_log("Output written on main.pdf (3 pages).", LogLimits::default());
        assert!(!a.has_errors());
        assert!(a.warnings.is_empty());
    }

    #[test]
    fn test_fatal_case_insensitive() {
        assert!(detect_fatal("latexmk: ERROR IN PREVIOUS INVOCATION of pdflatex"));
        assert!(!detect_fatal("all good"));
    }
}
