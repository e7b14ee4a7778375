/*
 * citations.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Citation and bibliography consistency
 */

//! Citation and bibliography consistency.
//!
//! Undefined and uncited keys are set differences between the cited keys
//! and the bibliography keys, reported in key order. When a key is defined
//! more than once, its first definition is the one that counts.

use std::collections::{BTreeMap, BTreeSet};

use crate::extract::{BibEntry, Citation};
use crate::issue::{Issue, IssueKind};

/// First bibliography entry for each key.
fn entries_by_key(entries: &[BibEntry]) -> BTreeMap<&str, &BibEntry> {
    let mut by_key = BTreeMap::new();
    for entry in entries {
        by_key.entry(entry.key.as_str()).or_insert(entry);
    }
    by_key
}

/// Cited keys missing from the bibliography, anchored at their first use.
pub fn undefined_citations(citations: &[Citation], entries: &[BibEntry]) -> Vec<Issue> {
    let defined: BTreeSet<&str> = entries.iter().map(|e| e.key.as_str()).collect();

    let mut first_use: BTreeMap<&str, &Citation> = BTreeMap::new();
    for citation in citations.iter().filter(|c| !c.cites_all()) {
        first_use.entry(citation.key.as_str()).or_insert(citation);
    }

    first_use
        .into_iter()
        .filter(|(key, _)| !defined.contains(key))
        .map(|(key, citation)| {
            Issue::new(IssueKind::UndefinedCitation { key: key.to_string() })
                .at(citation.file.clone(), citation.line)
        })
        .collect()
}

/// Bibliography keys never cited. `\nocite{*}` cites everything.
pub fn uncited_entries(citations: &[Citation], entries: &[BibEntry]) -> Vec<Issue> {
    if citations.iter().any(Citation::cites_all) {
        return Vec::new();
    }
    let cited: BTreeSet<&str> = citations.iter().map(|c| c.key.as_str()).collect();

    entries_by_key(entries)
        .into_iter()
        .filter(|(key, _)| !cited.contains(key))
        .map(|(key, entry)| {
            Issue::new(IssueKind::UncitedBibliographyEntry { key: key.to_string() })
                .at(entry.file.clone(), entry.line)
        })
        .collect()
}

/// One info issue per plain `\cite` occurrence.
pub fn generic_citation_style(citations: &[Citation]) -> Vec<Issue> {
    citations
        .iter()
        .filter(|c| c.is_generic())
        .map(|c| {
            Issue::new(IssueKind::CitationStyleGenericCite { key: c.key.clone() })
                .at(c.file.clone(), c.line)
        })
        .collect()
}

/// Later definitions of an already-defined key, in entry order.
pub fn duplicate_bibliography_keys(entries: &[BibEntry]) -> Vec<Issue> {
    let first = entries_by_key(entries);
    entries
        .iter()
        .filter_map(|entry| {
            let original = first.get(entry.key.as_str())?;
            if std::ptr::eq(*original, entry) {
                return None;
            }
            Some(
                Issue::new(IssueKind::DuplicateBibliographyKey {
                    key: entry.key.clone(),
                    first_line: original.line,
                })
                .at(entry.file.clone(), entry.line),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn cite(key: &str, command: &str, line: usize) -> Citation {
        Citation {
            key: key.into(),
            command: command.into(),
            file: "main.tex".into(),
            line,
        }
    }

    fn entry(key: &str, line: usize) -> BibEntry {
        BibEntry {
            key: key.into(),
            entry_type: "article".into(),
            file: "refs.bib".into(),
            line,
            title: String::new(),
            author: String::new(),
            year: String::new(),
            doi: String::new(),
            arxiv: String::new(),
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn test_undefined_anchored_at_first_use_sorted() {
        let citations = vec![cite("zeta", "citep", 3), cite("alpha", "cite", 5), cite("zeta", "citet", 1), cite("ok", "citep", 2)];
        let entries = vec![entry("ok", 1)];
        let issues = undefined_citations(&citations, &entries);
        let found: Vec<_> = issues
            .iter()
            .map(|i| (i.kind.clone(), i.line))
            .collect();
        assert_eq!(
            found,
            vec![
                (IssueKind::UndefinedCitation { key: "alpha".into() }, Some(5)),
                (IssueKind::UndefinedCitation { key: "zeta".into() }, Some(3)),
            ]
        );
    }

    #[test]
    fn test_uncited_sorted_by_key() {
        let citations = vec![cite("b", "citep", 1)];
        let entries = vec![entry("c", 1), entry("a", 5), entry("b", 9)];
        let keys: Vec<_> = uncited_entries(&citations, &entries)
            .into_iter()
            .map(|i| (i.kind, i.line))
            .collect();
        assert_eq!(
            keys,
            vec![
                (IssueKind::UncitedBibliographyEntry { key: "a".into() }, Some(5)),
                (IssueKind::UncitedBibliographyEntry { key: "c".into() }, Some(1)),
            ]
        );
    }

    #[test]
    fn test_duplicate_key_first_wins() {
        let citations = vec![];
        let entries = vec![entry("dup", 2), entry("dup", 10)];
        let uncited = uncited_entries(&citations, &entries);
        assert_eq!(uncited.len(), 1);
        assert_eq!(uncited[0].line, Some(2));

        let duplicates = duplicate_bibliography_keys(&entries);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].line, Some(10));
        assert_eq!(
            duplicates[0].kind,
            IssueKind::DuplicateBibliographyKey { key: "dup".into(), first_line: 2 }
        );
    }

    #[test]
    fn test_nocite_all_suppresses_uncited() {
        let citations = vec![cite("*", "nocite", 1)];
        let entries = vec![entry("a", 1)];
        assert!(uncited_entries(&citations, &entries).is_empty());
        assert!(undefined_citations(&citations, &entries).is_empty());
    }

    #[test]
    fn test_generic_style_per_occurrence() {
        let citations = vec![cite("a", "cite", 1), cite("a", "cite", 2), cite("b", "citep", 3)];
        let issues = generic_citation_style(&citations);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.name() == "citation_style_generic_cite"));
    }

    #[test]
    fn test_undefined_and_uncited_are_disjoint() {
        let citations = vec![cite("a", "citep", 1), cite("x", "citep", 2)];
        let entries = vec![entry("a", 1), entry("y", 2)];
        let undefined: BTreeSet<String> = undefined_citations(&citations, &entries)
            .iter()
            .filter_map(|i| i.kind.key().map(str::to_string))
            .collect();
        let uncited: BTreeSet<String> = uncited_entries(&citations, &entries)
            .iter()
            .filter_map(|i| i.kind.key().map(str::to_string))
            .collect();
        assert!(undefined.is_disjoint(&uncited));
        assert_eq!(undefined.len(), 1);
        assert_eq!(uncited.len(), 1);
    }
}
