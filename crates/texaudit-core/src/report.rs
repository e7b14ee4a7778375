/*
 * report.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Report assembly
 */

//! Report assembly.
//!
//! Each report runs discovery, extraction and the relevant checks over a
//! [`Project`] and merges summary counts, entity lists and issues into one
//! serializable payload. Output depends only on the file tree and options,
//! so two runs over an unchanged tree serialize identically.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::check::{
    FloatPolicy, SectionPolicy, broken_includes, check_floats, check_section,
    duplicate_bibliography_keys, find_section, generic_citation_style, uncited_entries,
    undefined_citations,
};
use crate::discovery::{SourceFile, relative_path};
use crate::error::{AuditError, Result};
use crate::extract::{
    BibEntry, Citation, FloatEntity, FloatKind, Reference, Section, count_references,
    extract_citations, extract_floats, extract_references, extract_sections, parse_bibliography,
};
use crate::include::{IncludeTree, InclusionEdge};
use crate::issue::{Issue, IssueKind, SeverityCounts};
use crate::project::Project;

fn unique_keys(citations: &[Citation]) -> usize {
    citations
        .iter()
        .map(|c| c.key.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

fn relative_names(files: &[SourceFile]) -> Vec<String> {
    files.iter().map(|f| f.relative.clone()).collect()
}

/// Files reachable from the entry, or every source when the tree is empty.
fn scoped<'a>(project: &'a Project, tree: &'a IncludeTree) -> &'a [SourceFile] {
    if tree.is_empty() {
        project.tex_files()
    } else {
        &tree.files
    }
}

fn floats_with_refs(files: &[SourceFile], kind: FloatKind, references: &[Reference]) -> Vec<FloatEntity> {
    let mut entities = extract_floats(files, kind);
    count_references(&mut entities, references);
    entities
}

fn float_policy(project: &Project) -> FloatPolicy {
    FloatPolicy {
        min_caption_chars: project.config().checks.min_caption_chars,
    }
}

// === Structure ===

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureOptions {
    pub entry: Option<PathBuf>,
    pub bibliography: Option<PathBuf>,
    pub max_issues: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureSummary {
    pub tex_files: usize,
    pub files_in_scope: usize,
    pub bib_files: usize,
    pub bib_entries: usize,
    pub sections: usize,
    pub citations: usize,
    pub unique_citation_keys: usize,
    pub references: usize,
    pub figures: usize,
    pub tables: usize,
    pub includes: usize,
    pub broken_includes: usize,
    pub issues: usize,
    pub issues_truncated: bool,
    #[serde(flatten)]
    pub severity: SeverityCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureReport {
    pub project_root: String,
    pub main_tex: Option<String>,
    pub summary: StructureSummary,
    pub files: Vec<String>,
    pub includes: Vec<InclusionEdge>,
    pub sections: Vec<Section>,
    pub citations: Vec<Citation>,
    pub bib_entries: Vec<BibEntry>,
    pub references: Vec<Reference>,
    pub figures: Vec<FloatEntity>,
    pub tables: Vec<FloatEntity>,
    pub issues: Vec<Issue>,
}

impl StructureReport {
    fn empty(project: &Project) -> Self {
        let issues = vec![Issue::new(IssueKind::NoTexFilesFound)];
        Self {
            project_root: project.root().display().to_string(),
            main_tex: None,
            summary: StructureSummary {
                bib_files: project.bib_paths().len(),
                issues: issues.len(),
                severity: SeverityCounts::tally(&issues),
                ..Default::default()
            },
            files: Vec::new(),
            includes: Vec::new(),
            sections: Vec::new(),
            citations: Vec::new(),
            bib_entries: Vec::new(),
            references: Vec::new(),
            figures: Vec::new(),
            tables: Vec::new(),
            issues,
        }
    }

    /// False when the project held no `.tex` source at all.
    pub fn has_sources(&self) -> bool {
        self.summary.tex_files > 0
    }
}

/// Full structural model of the project with its consistency issues.
pub fn structure_report(project: &Project, options: &StructureOptions) -> Result<StructureReport> {
    let Some(entry) = project.entry(options.entry.as_deref())? else {
        return Ok(StructureReport::empty(project));
    };
    let tree = project.include_tree(&entry);
    let files = scoped(project, &tree);
    debug!("structure scope: {} files from {}", files.len(), entry.display());

    let bib_files = project.bibliography_files(options.bibliography.as_deref())?;
    let bib_entries: Vec<BibEntry> = bib_files.iter().flat_map(parse_bibliography).collect();
    let sections = extract_sections(files);
    let citations = extract_citations(files);
    let references = extract_references(files);
    let figures = floats_with_refs(files, FloatKind::Figure, &references);
    let tables = floats_with_refs(files, FloatKind::Table, &references);

    let policy = float_policy(project);
    let mut issues = undefined_citations(&citations, &bib_entries);
    issues.extend(uncited_entries(&citations, &bib_entries));
    issues.extend(check_floats(&figures, &policy));
    issues.extend(check_floats(&tables, &policy));
    issues.extend(broken_includes(&tree));

    let total = issues.len();
    let limit = options
        .max_issues
        .unwrap_or(project.config().checks.max_issues)
        .max(1);
    issues.truncate(limit);

    let summary = StructureSummary {
        tex_files: project.tex_files().len(),
        files_in_scope: files.len(),
        bib_files: bib_files.len(),
        bib_entries: bib_entries.len(),
        sections: sections.len(),
        citations: citations.len(),
        unique_citation_keys: unique_keys(&citations),
        references: references.len(),
        figures: figures.len(),
        tables: tables.len(),
        includes: tree.edges.len(),
        broken_includes: tree.broken_edges().count(),
        issues: total,
        issues_truncated: total > issues.len(),
        severity: SeverityCounts::tally(&issues),
    };

    Ok(StructureReport {
        project_root: project.root().display().to_string(),
        main_tex: Some(relative_path(project.root(), &entry)),
        summary,
        files: relative_names(files),
        includes: tree.edges.clone(),
        sections,
        citations,
        bib_entries,
        references,
        figures,
        tables,
        issues,
    })
}

// === Citations ===

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationOptions {
    pub entry: Option<PathBuf>,
    pub bibliography: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CitationSummary {
    pub tex_files: usize,
    pub bib_files: usize,
    pub citations: usize,
    pub unique_citation_keys: usize,
    pub bib_entries: usize,
    pub issues: usize,
    #[serde(flatten)]
    pub severity: SeverityCounts,
    /// Validation status histogram, present only after a remote pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_status_counts: Option<BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationReport {
    pub project_root: String,
    pub main_tex: Option<String>,
    pub files: Vec<String>,
    pub bib_files: Vec<String>,
    pub summary: CitationSummary,
    pub citations: Vec<Citation>,
    pub bib_entries: Vec<BibEntry>,
    pub issues: Vec<Issue>,
}

/// Local citation/bibliography consistency.
///
/// With an explicit entry only its inclusion tree is scanned; otherwise
/// every `.tex` file under the root.
pub fn citation_report(project: &Project, options: &CitationOptions) -> Result<CitationReport> {
    if !project.has_sources() {
        return Err(AuditError::NoTexFiles(project.root().to_path_buf()));
    }

    let (main_tex, files) = match options.entry.as_deref() {
        Some(explicit) => {
            let entry = project
                .entry(Some(explicit))?
                .ok_or_else(|| AuditError::EntryNotFound(explicit.to_path_buf()))?;
            let tree = project.include_tree(&entry);
            (Some(relative_path(project.root(), &entry)), tree.files)
        }
        None => (None, project.tex_files().to_vec()),
    };

    let bib_files = project.bibliography_files(options.bibliography.as_deref())?;
    let bib_entries: Vec<BibEntry> = bib_files.iter().flat_map(parse_bibliography).collect();
    let citations = extract_citations(&files);

    let mut issues = undefined_citations(&citations, &bib_entries);
    issues.extend(uncited_entries(&citations, &bib_entries));
    issues.extend(duplicate_bibliography_keys(&bib_entries));
    issues.extend(generic_citation_style(&citations));

    let summary = CitationSummary {
        tex_files: files.len(),
        bib_files: bib_files.len(),
        citations: citations.len(),
        unique_citation_keys: unique_keys(&citations),
        bib_entries: bib_entries.len(),
        issues: issues.len(),
        severity: SeverityCounts::tally(&issues),
        remote_status_counts: None,
    };

    Ok(CitationReport {
        project_root: project.root().display().to_string(),
        main_tex,
        files: relative_names(&files),
        bib_files: relative_names(&bib_files),
        summary,
        citations,
        bib_entries,
        issues,
    })
}

// === Verify ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyTarget {
    Figures,
    Tables,
    Section,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOptions {
    pub target: VerifyTarget,
    pub entry: Option<PathBuf>,
    pub section_name: Option<String>,
    pub min_section_words: Option<usize>,
}

impl VerifyOptions {
    pub fn new(target: VerifyTarget) -> Self {
        Self {
            target,
            entry: None,
            section_name: None,
            min_section_words: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifySummary {
    pub target: VerifyTarget,
    pub files: usize,
    pub entities: usize,
    pub issues: usize,
    #[serde(flatten)]
    pub severity: SeverityCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyReport {
    pub project_root: String,
    pub target: VerifyTarget,
    pub main_tex: String,
    pub files: Vec<String>,
    pub summary: VerifySummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<FloatEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_sections: Option<Vec<String>>,
    pub issues: Vec<Issue>,
}

/// Targeted checks on the figures, the tables, or one named section.
pub fn verify_report(project: &Project, options: &VerifyOptions) -> Result<VerifyReport> {
    let section_name = match options.target {
        VerifyTarget::Section => Some(
            options
                .section_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or(AuditError::SectionNameRequired)?,
        ),
        _ => None,
    };
    let Some(entry) = project.entry(options.entry.as_deref())? else {
        return Err(AuditError::NoTexFiles(project.root().to_path_buf()));
    };
    let tree = project.include_tree(&entry);
    let files = scoped(project, &tree);

    let mut entities = Vec::new();
    let mut section = None;
    let mut available_sections = None;
    let issues = match (options.target, section_name) {
        (VerifyTarget::Figures | VerifyTarget::Tables, _) => {
            let kind = if options.target == VerifyTarget::Figures {
                FloatKind::Figure
            } else {
                FloatKind::Table
            };
            let references = extract_references(files);
            entities = floats_with_refs(files, kind, &references);
            check_floats(&entities, &float_policy(project))
        }
        (VerifyTarget::Section, Some(name)) => {
            let sections = extract_sections(files);
            let policy = SectionPolicy {
                min_words: options
                    .min_section_words
                    .unwrap_or(project.config().checks.min_section_words),
                max_paragraph_words: project.config().checks.max_paragraph_words,
            };
            match find_section(&sections, name) {
                Some(found) => {
                    let issues = check_section(found, &policy);
                    section = Some(found.clone());
                    issues
                }
                None => {
                    available_sections = Some(sections.iter().map(|s| s.name.clone()).collect());
                    vec![Issue::new(IssueKind::SectionNotFound {
                        section: name.to_string(),
                    })]
                }
            }
        }
        (VerifyTarget::Section, None) => return Err(AuditError::SectionNameRequired),
    };

    let entity_count = match options.target {
        VerifyTarget::Section => usize::from(section.is_some()),
        _ => entities.len(),
    };
    let summary = VerifySummary {
        target: options.target,
        files: files.len(),
        entities: entity_count,
        issues: issues.len(),
        severity: SeverityCounts::tally(&issues),
    };

    Ok(VerifyReport {
        project_root: project.root().display().to_string(),
        target: options.target,
        main_tex: relative_path(project.root(), &entry),
        files: relative_names(files),
        summary,
        entities,
        section,
        available_sections,
        issues,
    })
}

/// Serialize any report as JSON, optionally indented.
pub fn to_json<T: Serialize>(report: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}
