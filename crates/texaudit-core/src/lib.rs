//! Structure extraction and consistency checks for LaTeX projects
//!
//! This crate builds a structural model of a LaTeX project without a full
//! TeX grammar: a comment-aware line scanner and one balanced-delimiter
//! scanner are enough to recover sections, citations, bibliography records,
//! cross-references and figure/table environments. The model is then
//! checked for internal consistency.
//!
//! # Architecture
//!
//! - [`Project`] - validated root, configuration and discovered sources
//! - [`include`] - inclusion tree reachable from the entry file
//! - [`extract`] - entity extractors
//! - [`check`] - issue-producing checks
//! - [`report`] - deterministic, serializable report payloads
//!
//! # Example
//!
//! ```ignore
//! use texaudit_core::{Project, StructureOptions, structure_report};
//!
//! let project = Project::open("paper/")?;
//! let report = structure_report(&project, &StructureOptions::default())?;
//! println!("{}", texaudit_core::to_json(&report, true)?);
//! ```

pub mod check;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod include;
pub mod issue;
pub mod project;
pub mod report;
pub mod scan;
pub mod title;

pub use config::{ExclusionSet, ProjectConfig, RemoteConfig};
pub use discovery::SourceFile;
pub use error::{AuditError, Result};
pub use extract::{BibEntry, Citation, FloatEntity, FloatKind, Reference, Section};
pub use include::{IncludeTree, InclusionEdge};
pub use issue::{Issue, IssueKind, Severity, SeverityCounts};
pub use project::Project;
pub use report::{
    CitationOptions, CitationReport, StructureOptions, StructureReport, VerifyOptions,
    VerifyReport, VerifyTarget, citation_report, structure_report, to_json, verify_report,
};
pub use title::{normalize_title, title_similarity};
