/*
 * sections.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Section quality checks
 */

//! Section quality checks for a section picked by name.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{DEFAULT_MAX_PARAGRAPH_WORDS, DEFAULT_MIN_SECTION_WORDS};
use crate::extract::Section;
use crate::extract::citations::CITE_RE;
use crate::extract::references::REF_RE;
use crate::issue::{Issue, IssueKind};
use crate::scan::word_count;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(TODO|TBD|FIXME|XXX)\b").expect("Invalid regex pattern for placeholders")
});

static CLAIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(we show|we propose|our method|results show|outperforms?|state of the art)\b")
        .expect("Invalid regex pattern for claim phrases")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPolicy {
    pub min_words: usize,
    pub max_paragraph_words: usize,
}

impl Default for SectionPolicy {
    fn default() -> Self {
        Self {
            min_words: DEFAULT_MIN_SECTION_WORDS,
            max_paragraph_words: DEFAULT_MAX_PARAGRAPH_WORDS,
        }
    }
}

/// First section whose name contains `name`, ignoring case.
pub fn find_section<'a>(sections: &'a [Section], name: &str) -> Option<&'a Section> {
    let needle = name.trim().to_lowercase();
    sections
        .iter()
        .find(|s| s.name.to_lowercase().contains(&needle))
}

pub fn check_section(section: &Section, policy: &SectionPolicy) -> Vec<Issue> {
    let name = section.name.clone();
    let file = section.file.clone();
    let mut issues = Vec::new();

    let minimum = policy.min_words.max(1);
    if section.word_count < minimum {
        issues.push(
            Issue::new(IssueKind::SectionTooShort {
                section: name.clone(),
                word_count: section.word_count,
                minimum,
            })
            .at(file.clone(), section.line),
        );
    }

    for body_line in &section.body {
        let text = body_line.text.trim();
        if PLACEHOLDER_RE.is_match(text) {
            issues.push(
                Issue::new(IssueKind::PlaceholderText {
                    section: name.clone(),
                    content: text.to_string(),
                })
                .at(file.clone(), body_line.line),
            );
        }
        if CLAIM_RE.is_match(text) && !CITE_RE.is_match(text) && !REF_RE.is_match(text) {
            issues.push(
                Issue::new(IssueKind::PotentialUnsupportedClaim {
                    section: name.clone(),
                    content: text.to_string(),
                })
                .at(file.clone(), body_line.line),
            );
        }
    }

    for (line, paragraph) in section.paragraphs() {
        let words = word_count(&paragraph);
        if words > policy.max_paragraph_words {
            issues.push(
                Issue::new(IssueKind::ParagraphTooLong {
                    section: name.clone(),
                    word_count: words,
                    maximum: policy.max_paragraph_words,
                })
                .at(file.clone(), line),
            );
        }
    }

    issues
}
