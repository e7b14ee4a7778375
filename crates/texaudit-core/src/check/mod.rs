//! Consistency checks.
//!
//! Every check is a pure function from extracted entities to issues, with
//! output order fixed by key, label or source position.

pub mod citations;
pub mod floats;
pub mod sections;

pub use citations::{duplicate_bibliography_keys, generic_citation_style, uncited_entries, undefined_citations};
pub use floats::{FloatPolicy, check_floats};
pub use sections::{SectionPolicy, check_section, find_section};

use crate::include::IncludeTree;
use crate::issue::{Issue, IssueKind};

/// One `broken_include` warning per unresolved inclusion directive.
pub fn broken_includes(tree: &IncludeTree) -> Vec<Issue> {
    tree.broken_edges()
        .map(|edge| {
            Issue::new(IssueKind::BrokenInclude {
                target: edge.target.clone(),
            })
            .at(edge.from.clone(), edge.line)
        })
        .collect()
}
