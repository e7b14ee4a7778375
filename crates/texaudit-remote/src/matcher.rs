/*
 * matcher.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Bibliography entry validation strategies
 */

//! Bibliography entry validation.
//!
//! An [`EntryResolver`] turns one bibliography entry into a
//! [`ValidationResult`]. Two strategies exist, by DOI and by title, and
//! [`Matcher`] composes them:
//!
//! - with a DOI, look it up directly; if the lookup fails, or the canonical
//!   title scores below [`IDENTIFIER_THRESHOLD`], fall back to a title search
//! - without a DOI, search by title
//! - with neither, report `not_found` without any network call
//!
//! After a failed lookup the title result is used unless it is itself
//! `not_found`. After a title mismatch it is used only when the search found
//! a candidate. There is no other retry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use texaudit_core::BibEntry;
use texaudit_core::title::{round_score, title_similarity};
use tracing::{debug, warn};

use crate::source::{MetadataSource, RemoteWork};

/// Minimum title score for a DOI lookup to count as verified.
pub const IDENTIFIER_THRESHOLD: f64 = 0.6;

/// Minimum title score for a title-search candidate to count as a match.
pub const TITLE_THRESHOLD: f64 = 0.75;

static DOI_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://(?:dx\.)?doi\.org/|doi:\s*)").expect("Invalid regex pattern for DOI prefix")
});

/// Strip resolver URL or `doi:` prefixes from a DOI.
pub fn normalize_doi(doi: &str) -> String {
    DOI_PREFIX_RE.replace(doi.trim(), "").trim().to_string()
}

fn same_doi(a: &str, b: &str) -> bool {
    normalize_doi(a).eq_ignore_ascii_case(&normalize_doi(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Valid,
    NeedsCorrection,
    LikelyHallucinated,
    NotFound,
}

impl ValidationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::NeedsCorrection => "needs_correction",
            Self::LikelyHallucinated => "likely_hallucinated",
            Self::NotFound => "not_found",
        }
    }

    /// Whether a title search produced a usable candidate.
    fn is_candidate(self) -> bool {
        matches!(self, Self::Valid | Self::NeedsCorrection)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub key: String,
    pub status: ValidationStatus,
    pub confidence: f64,
    pub message: String,
    pub remote: Option<RemoteWork>,
}

impl ValidationResult {
    fn new(entry: &BibEntry, status: ValidationStatus, confidence: f64, message: impl Into<String>) -> Self {
        Self {
            key: entry.key.clone(),
            status,
            confidence: round_score(confidence),
            message: message.into(),
            remote: None,
        }
    }

    fn with_remote(mut self, remote: RemoteWork) -> Self {
        self.remote = Some(remote);
        self
    }
}

/// Resolve one bibliography entry to a validation status.
pub trait EntryResolver {
    fn resolve(&self, entry: &BibEntry) -> ValidationResult;
}

/// Direct lookup of the entry's DOI.
pub struct IdentifierStrategy<S> {
    source: S,
}

impl<S: MetadataSource> IdentifierStrategy<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: MetadataSource> EntryResolver for IdentifierStrategy<S> {
    fn resolve(&self, entry: &BibEntry) -> ValidationResult {
        let doi = normalize_doi(&entry.doi);
        if doi.is_empty() {
            return ValidationResult::new(entry, ValidationStatus::NotFound, 0.0, "No DOI recorded");
        }

        match self.source.lookup_doi(&doi) {
            Ok(work) => {
                let score = title_similarity(&entry.title, work.title_or_empty());
                let (status, message) = if score >= IDENTIFIER_THRESHOLD {
                    (ValidationStatus::Valid, "DOI verified in Crossref")
                } else {
                    (ValidationStatus::NeedsCorrection, "DOI exists but title mismatch")
                };
                ValidationResult::new(entry, status, score, message).with_remote(work)
            }
            Err(e) => ValidationResult::new(
                entry,
                ValidationStatus::NotFound,
                0.0,
                format!("DOI lookup failed: {e}"),
            ),
        }
    }
}

/// Title search keeping the best-scoring candidate.
pub struct TitleStrategy<S> {
    source: S,
    rows: usize,
}

impl<S: MetadataSource> TitleStrategy<S> {
    pub fn new(source: S, rows: usize) -> Self {
        Self {
            source,
            rows: rows.max(1),
        }
    }
}

impl<S: MetadataSource> EntryResolver for TitleStrategy<S> {
    fn resolve(&self, entry: &BibEntry) -> ValidationResult {
        let title = entry.title.trim();
        if title.is_empty() {
            return ValidationResult::new(entry, ValidationStatus::NotFound, 0.0, "No title recorded");
        }

        let candidates = match self.source.search_title(title, self.rows) {
            Ok(candidates) => candidates,
            Err(e) => {
                return ValidationResult::new(
                    entry,
                    ValidationStatus::NotFound,
                    0.0,
                    format!("Title search failed: {e}"),
                );
            }
        };
        if candidates.is_empty() {
            return ValidationResult::new(
                entry,
                ValidationStatus::LikelyHallucinated,
                0.0,
                "No Crossref result for title",
            );
        }

        let mut best: Option<(f64, RemoteWork)> = None;
        for candidate in candidates {
            let score = title_similarity(title, candidate.title_or_empty());
            if score > best.as_ref().map_or(0.0, |(s, _)| *s) {
                best = Some((score, candidate));
            }
        }
        let Some((score, work)) = best else {
            return ValidationResult::new(
                entry,
                ValidationStatus::LikelyHallucinated,
                0.0,
                "No usable Crossref title match",
            );
        };

        let local_doi = normalize_doi(&entry.doi);
        let remote_doi = work.doi.as_deref().unwrap_or("");
        let (status, message) = if score < TITLE_THRESHOLD {
            (ValidationStatus::NeedsCorrection, "Only weak title match found")
        } else if !local_doi.is_empty() && !remote_doi.is_empty() && !same_doi(&local_doi, remote_doi) {
            (ValidationStatus::NeedsCorrection, "Best title match suggests DOI correction")
        } else if local_doi.is_empty() && !remote_doi.is_empty() {
            (ValidationStatus::NeedsCorrection, "Matching paper found; DOI can be added")
        } else {
            (ValidationStatus::Valid, "Title matched in Crossref")
        };
        ValidationResult::new(entry, status, score, message).with_remote(work)
    }
}

/// DOI-first resolution with a single title-search fallback.
pub struct Matcher<S> {
    identifier: IdentifierStrategy<S>,
    title: TitleStrategy<S>,
}

impl<S: MetadataSource + Clone> Matcher<S> {
    pub fn new(source: S, rows: usize) -> Self {
        Self {
            identifier: IdentifierStrategy::new(source.clone()),
            title: TitleStrategy::new(source, rows),
        }
    }
}

impl<S: MetadataSource> Matcher<S> {
    /// Validate entries one at a time, in order.
    pub fn validate_all(&self, entries: &[BibEntry]) -> Vec<ValidationResult> {
        entries
            .iter()
            .map(|entry| {
                let result = self.resolve(entry);
                if result.status == ValidationStatus::NotFound {
                    warn!("{}: {}", entry.key, result.message);
                } else {
                    debug!("{}: {} ({})", entry.key, result.status, result.confidence);
                }
                result
            })
            .collect()
    }
}

impl<S: MetadataSource> EntryResolver for Matcher<S> {
    fn resolve(&self, entry: &BibEntry) -> ValidationResult {
        let has_doi = !normalize_doi(&entry.doi).is_empty();
        let has_title = !entry.title.trim().is_empty();

        if !has_doi && !has_title {
            return ValidationResult::new(entry, ValidationStatus::NotFound, 0.0, "Missing DOI and title");
        }
        if !has_doi {
            return self.title.resolve(entry);
        }

        let by_doi = self.identifier.resolve(entry);
        if !has_title {
            return by_doi;
        }
        match by_doi.status {
            ValidationStatus::NotFound => {
                let by_title = self.title.resolve(entry);
                if by_title.status != ValidationStatus::NotFound {
                    by_title
                } else {
                    by_doi
                }
            }
            ValidationStatus::NeedsCorrection => {
                let by_title = self.title.resolve(entry);
                if by_title.status.is_candidate() {
                    by_title
                } else {
                    by_doi
                }
            }
            _ => by_doi,
        }
    }
}

/// Histogram of statuses keyed by their serialized name.
pub fn status_counts(results: &[ValidationResult]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for result in results {
        *counts.entry(result.status.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_doi_prefixes() {
        assert_eq!(normalize_doi("https://doi.org/10.1/x"), "10.1/x");
        assert_eq!(normalize_doi("HTTP://dx.doi.org/10.1/x"), "10.1/x");
        assert_eq!(normalize_doi(" doi: 10.1/x "), "10.1/x");
        assert_eq!(normalize_doi("10.1/x"), "10.1/x");
    }

    #[test]
    fn same_doi_ignores_case_and_prefix() {
        assert!(same_doi("10.1/ABC", "https://doi.org/10.1/abc"));
        assert!(!same_doi("10.1/a", "10.1/b"));
    }

    #[test]
    fn status_names() {
        let json = serde_json::to_string(&ValidationStatus::LikelyHallucinated).unwrap();
        assert_eq!(json, "\"likely_hallucinated\"");
        assert_eq!(ValidationStatus::NeedsCorrection.to_string(), "needs_correction");
    }
}
