/*
 * issue.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Typed, severity-tagged findings
 */

//! Findings produced by the checks.
//!
//! The taxonomy is closed: every finding is one [`IssueKind`] variant, and
//! each variant has a fixed [`Severity`]. An [`Issue`] serializes as one
//! flat JSON object with `type`, the variant's own fields, `severity`, the
//! optional location and a human-readable `message`.

use std::fmt;

use serde::Serialize;

use crate::extract::FloatKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    UndefinedCitation {
        key: String,
    },
    UncitedBibliographyEntry {
        key: String,
    },
    CitationStyleGenericCite {
        key: String,
    },
    DuplicateBibliographyKey {
        key: String,
        first_line: usize,
    },
    MissingLabel {
        entity: FloatKind,
    },
    LabelPrefix {
        entity: FloatKind,
        label: String,
        expected: String,
    },
    Unreferenced {
        entity: FloatKind,
        label: String,
    },
    MissingCaption {
        entity: FloatKind,
        #[serde(skip_serializing_if = "String::is_empty")]
        label: String,
    },
    CaptionTooShort {
        entity: FloatKind,
        #[serde(skip_serializing_if = "String::is_empty")]
        label: String,
        length: usize,
        minimum: usize,
    },
    OverflowWidth {
        entity: FloatKind,
        #[serde(skip_serializing_if = "String::is_empty")]
        label: String,
        value: f64,
    },
    NegativeHspace {
        entity: FloatKind,
        #[serde(skip_serializing_if = "String::is_empty")]
        label: String,
    },
    NoBooktabs {
        entity: FloatKind,
        #[serde(skip_serializing_if = "String::is_empty")]
        label: String,
    },
    BrokenInclude {
        target: String,
    },
    SectionNotFound {
        section: String,
    },
    SectionTooShort {
        section: String,
        word_count: usize,
        minimum: usize,
    },
    PlaceholderText {
        section: String,
        content: String,
    },
    PotentialUnsupportedClaim {
        section: String,
        content: String,
    },
    ParagraphTooLong {
        section: String,
        word_count: usize,
        maximum: usize,
    },
    NoTexFilesFound,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::UndefinedCitation { .. }
            | Self::MissingLabel { .. }
            | Self::SectionNotFound { .. }
            | Self::NoTexFilesFound => Severity::Error,
            Self::UncitedBibliographyEntry { .. }
            | Self::DuplicateBibliographyKey { .. }
            | Self::LabelPrefix { .. }
            | Self::Unreferenced { .. }
            | Self::MissingCaption { .. }
            | Self::OverflowWidth { .. }
            | Self::NegativeHspace { .. }
            | Self::BrokenInclude { .. }
            | Self::SectionTooShort { .. }
            | Self::PlaceholderText { .. } => Severity::Warning,
            Self::CitationStyleGenericCite { .. }
            | Self::CaptionTooShort { .. }
            | Self::NoBooktabs { .. }
            | Self::PotentialUnsupportedClaim { .. }
            | Self::ParagraphTooLong { .. } => Severity::Info,
        }
    }

    /// The serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UndefinedCitation { .. } => "undefined_citation",
            Self::UncitedBibliographyEntry { .. } => "uncited_bibliography_entry",
            Self::CitationStyleGenericCite { .. } => "citation_style_generic_cite",
            Self::DuplicateBibliographyKey { .. } => "duplicate_bibliography_key",
            Self::MissingLabel { .. } => "missing_label",
            Self::LabelPrefix { .. } => "label_prefix",
            Self::Unreferenced { .. } => "unreferenced",
            Self::MissingCaption { .. } => "missing_caption",
            Self::CaptionTooShort { .. } => "caption_too_short",
            Self::OverflowWidth { .. } => "overflow_width",
            Self::NegativeHspace { .. } => "negative_hspace",
            Self::NoBooktabs { .. } => "no_booktabs",
            Self::BrokenInclude { .. } => "broken_include",
            Self::SectionNotFound { .. } => "section_not_found",
            Self::SectionTooShort { .. } => "section_too_short",
            Self::PlaceholderText { .. } => "placeholder_text",
            Self::PotentialUnsupportedClaim { .. } => "potential_unsupported_claim",
            Self::ParagraphTooLong { .. } => "paragraph_too_long",
            Self::NoTexFilesFound => "no_tex_files_found",
        }
    }

    /// The citation or bibliography key this issue is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::UndefinedCitation { key }
            | Self::UncitedBibliographyEntry { key }
            | Self::CitationStyleGenericCite { key }
            | Self::DuplicateBibliographyKey { key, .. } => Some(key),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::UndefinedCitation { key } => {
                format!("Citation key '{key}' is not defined in any bibliography file.")
            }
            Self::UncitedBibliographyEntry { key } => {
                format!("Bibliography entry '{key}' is never cited.")
            }
            Self::CitationStyleGenericCite { .. } => {
                "Consider replacing \\cite with \\citep or \\citet based on sentence usage.".to_string()
            }
            Self::DuplicateBibliographyKey { key, first_line } => {
                format!("Bibliography key '{key}' is already defined at line {first_line}.")
            }
            Self::MissingLabel { entity } => format!("{} has no \\label.", capitalized(*entity)),
            Self::LabelPrefix { entity, label, expected } => {
                format!("{} label '{label}' should start with '{expected}'.", capitalized(*entity))
            }
            Self::Unreferenced { entity, label } => {
                format!("{} '{label}' is never referenced.", capitalized(*entity))
            }
            Self::MissingCaption { entity, .. } => format!("{} has no \\caption.", capitalized(*entity)),
            Self::CaptionTooShort { entity, length, minimum, .. } => format!(
                "{} caption is {length} characters; at least {minimum} recommended.",
                capitalized(*entity)
            ),
            Self::OverflowWidth { value, .. } => {
                format!("Width of {value} times the column/text width may overflow the page.")
            }
            Self::NegativeHspace { .. } => {
                "Negative \\hspace can cause overlapping content.".to_string()
            }
            Self::NoBooktabs { .. } => {
                "Table uses \\hline without booktabs rules (\\toprule/\\midrule/\\bottomrule).".to_string()
            }
            Self::BrokenInclude { target } => format!("Included file '{target}' could not be resolved."),
            Self::SectionNotFound { section } => format!("No section matching '{section}' was found."),
            Self::SectionTooShort { section, word_count, minimum } => {
                format!("Section '{section}' has {word_count} words; at least {minimum} expected.")
            }
            Self::PlaceholderText { section, .. } => {
                format!("Placeholder text in section '{section}'.")
            }
            Self::PotentialUnsupportedClaim { .. } => {
                "Strong claim without a citation or cross-reference on the same line.".to_string()
            }
            Self::ParagraphTooLong { word_count, maximum, .. } => {
                format!("Paragraph has {word_count} words; consider splitting above {maximum}.")
            }
            Self::NoTexFilesFound => "No .tex files found under the project root.".to_string(),
        }
    }
}

fn capitalized(kind: FloatKind) -> &'static str {
    match kind {
        FloatKind::Figure => "Figure",
        FloatKind::Table => "Table",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    #[serde(flatten)]
    pub kind: IssueKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind) -> Self {
        Self {
            severity: kind.severity(),
            message: kind.message(),
            kind,
            file: None,
            line: None,
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: usize) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Issue counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl SeverityCounts {
    pub fn tally<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        issues.into_iter().fold(Self::default(), |mut counts, issue| {
            match issue.severity {
                Severity::Error => counts.error_count += 1,
                Severity::Warning => counts.warning_count += 1,
                Severity::Info => counts.info_count += 1,
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_serializes_flat() {
        let issue = Issue::new(IssueKind::UndefinedCitation { key: "c".into() }).at("main.tex", 4);
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "undefined_citation");
        assert_eq!(value["key"], "c");
        assert_eq!(value["severity"], "error");
        assert_eq!(value["file"], "main.tex");
        assert_eq!(value["line"], 4);
    }

    #[test]
    fn test_location_is_optional() {
        let issue = Issue::new(IssueKind::SectionNotFound { section: "Intro".into() });
        let value = serde_json::to_value(&issue).unwrap();
        assert!(value.get("file").is_none());
        assert!(value.get("line").is_none());
    }

    #[test]
    fn test_empty_label_omitted() {
        let issue = Issue::new(IssueKind::MissingCaption {
            entity: FloatKind::Figure,
            label: String::new(),
        });
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["entity"], "figure");
        assert!(value.get("label").is_none());
        assert_eq!(issue.severity, Severity::Warning);
    }

    #[test]
    fn test_name_matches_serialized_tag() {
        let kinds = vec![
            IssueKind::NoTexFilesFound,
            IssueKind::BrokenInclude { target: "x".into() },
            IssueKind::PotentialUnsupportedClaim { section: "s".into(), content: "c".into() },
        ];
        for kind in kinds {
            let value = serde_json::to_value(Issue::new(kind.clone())).unwrap();
            assert_eq!(value["type"], kind.name());
        }
    }

    #[test]
    fn test_severity_counts() {
        let issues = vec![
            Issue::new(IssueKind::UndefinedCitation { key: "a".into() }),
            Issue::new(IssueKind::UncitedBibliographyEntry { key: "b".into() }),
            Issue::new(IssueKind::CitationStyleGenericCite { key: "c".into() }),
            Issue::new(IssueKind::CitationStyleGenericCite { key: "d".into() }),
        ];
        let counts = SeverityCounts::tally(&issues);
        assert_eq!(counts, SeverityCounts { error_count: 1, warning_count: 1, info_count: 2 });
    }
}
