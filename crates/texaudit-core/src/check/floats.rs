/*
 * floats.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Figure and table policy checks
 */

//! Figure and table policy checks.
//!
//! Labels and captions are optional in LaTeX but required here. Figures
//! also get two layout heuristics (relative widths above 1.0, negative
//! horizontal space) and tables get a rule-style heuristic.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::DEFAULT_MIN_CAPTION_CHARS;
use crate::extract::{FloatEntity, FloatKind};
use crate::issue::{Issue, IssueKind};

static RELATIVE_WIDTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"width\s*=\s*(\d+(?:\.\d+)?)\s*\\(?:columnwidth|textwidth|linewidth)")
        .expect("Invalid regex pattern for relative width")
});

static NEGATIVE_HSPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\hspace\*?\s*\{\s*-").expect("Invalid regex pattern for negative hspace")
});

const BOOKTABS_RULES: [&str; 3] = [r"\toprule", r"\midrule", r"\bottomrule"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatPolicy {
    /// Figure captions shorter than this many characters get an info issue.
    pub min_caption_chars: usize,
}

impl Default for FloatPolicy {
    fn default() -> Self {
        Self {
            min_caption_chars: DEFAULT_MIN_CAPTION_CHARS,
        }
    }
}

/// Check every entity.
///
/// Issues come out in entity order, except `unreferenced` issues, which
/// follow the rest sorted by label. Reference counts must already be
/// filled in.
pub fn check_floats(entities: &[FloatEntity], policy: &FloatPolicy) -> Vec<Issue> {
    let (mut unreferenced, mut issues): (Vec<Issue>, Vec<Issue>) = entities
        .iter()
        .flat_map(|entity| check_entity(entity, policy))
        .partition(|issue| matches!(issue.kind, IssueKind::Unreferenced { .. }));
    unreferenced.sort_by(|a, b| unreferenced_label(a).cmp(unreferenced_label(b)));
    issues.extend(unreferenced);
    issues
}

fn unreferenced_label(issue: &Issue) -> &str {
    match &issue.kind {
        IssueKind::Unreferenced { label, .. } => label,
        _ => "",
    }
}

fn check_entity(entity: &FloatEntity, policy: &FloatPolicy) -> Vec<Issue> {
    let kind = entity.kind;
    let label = entity.label.clone();
    let mut issues = Vec::new();
    let mut push = |issue_kind: IssueKind| {
        issues.push(Issue::new(issue_kind).at(entity.file.clone(), entity.line));
    };

    if !entity.has_label() {
        push(IssueKind::MissingLabel { entity: kind });
    } else if !entity.has_expected_prefix() {
        push(IssueKind::LabelPrefix {
            entity: kind,
            label: label.clone(),
            expected: format!("{}*", kind.label_prefix()),
        });
    } else if entity.ref_count == 0 {
        push(IssueKind::Unreferenced {
            entity: kind,
            label: label.clone(),
        });
    }

    let caption_length = entity.caption.chars().count();
    if !entity.has_caption() {
        push(IssueKind::MissingCaption {
            entity: kind,
            label: label.clone(),
        });
    } else if kind == FloatKind::Figure && caption_length < policy.min_caption_chars {
        push(IssueKind::CaptionTooShort {
            entity: kind,
            label: label.clone(),
            length: caption_length,
            minimum: policy.min_caption_chars,
        });
    }

    match kind {
        FloatKind::Figure => {
            for caps in RELATIVE_WIDTH_RE.captures_iter(&entity.body) {
                let Ok(value) = caps[1].parse::<f64>() else {
                    continue;
                };
                if value > 1.0 {
                    push(IssueKind::OverflowWidth {
                        entity: kind,
                        label: label.clone(),
                        value,
                    });
                }
            }
            if NEGATIVE_HSPACE_RE.is_match(&entity.body) {
                push(IssueKind::NegativeHspace {
                    entity: kind,
                    label: label.clone(),
                });
            }
        }
        FloatKind::Table => {
            let has_booktabs = BOOKTABS_RULES.iter().any(|rule| entity.body.contains(rule));
            if entity.body.contains(r"\hline") && !has_booktabs {
                push(IssueKind::NoBooktabs {
                    entity: kind,
                    label: label.clone(),
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: FloatKind, label: &str, caption: &str, refs: usize, body: &str) -> FloatEntity {
        FloatEntity {
            kind,
            file: "main.tex".into(),
            line: 7,
            label: label.into(),
            caption: caption.into(),
            ref_count: refs,
            body: body.into(),
        }
    }

    fn names(issues: &[Issue]) -> Vec<&'static str> {
        issues.iter().map(Issue::name).collect()
    }

    const GOOD_CAPTION: &str = "A caption that is long enough";

    #[test]
    fn test_bare_figure_has_two_issues() {
        let fig = entity(FloatKind::Figure, "", "", 0, "\\begin{figure}\\end{figure}");
        let issues = check_floats(&[fig], &FloatPolicy::default());
        assert_eq!(names(&issues), vec!["missing_label", "missing_caption"]);
        assert!(issues.iter().all(|i| i.line == Some(7)));
    }

    #[test]
    fn test_referenced_figure_is_clean() {
        let fig = entity(FloatKind::Figure, "fig:results", GOOD_CAPTION, 1, "");
        assert!(check_floats(&[fig], &FloatPolicy::default()).is_empty());
    }

    #[test]
    fn test_unreferenced_figure() {
        let fig = entity(FloatKind::Figure, "fig:results", GOOD_CAPTION, 0, "");
        let issues = check_floats(&[fig], &FloatPolicy::default());
        assert_eq!(names(&issues), vec!["unreferenced"]);
    }

    #[test]
    fn test_unreferenced_sorted_by_label_after_entity_issues() {
        let late = entity(FloatKind::Figure, "fig:zeta", "", 0, "");
        let early = entity(FloatKind::Figure, "fig:alpha", GOOD_CAPTION, 0, "");
        let issues = check_floats(&[late, early], &FloatPolicy::default());
        assert_eq!(names(&issues), vec!["missing_caption", "unreferenced", "unreferenced"]);
        let labels: Vec<&str> = issues[1..].iter().map(unreferenced_label).collect();
        assert_eq!(labels, vec!["fig:alpha", "fig:zeta"]);
    }

    #[test]
    fn test_wrong_prefix_is_not_also_unreferenced() {
        let tab = entity(FloatKind::Table, "results", GOOD_CAPTION, 0, "");
        let issues = check_floats(&[tab], &FloatPolicy::default());
        assert_eq!(names(&issues), vec!["label_prefix"]);
        assert_eq!(
            issues[0].kind,
            IssueKind::LabelPrefix {
                entity: FloatKind::Table,
                label: "results".into(),
                expected: "tab:*".into(),
            }
        );
    }

    #[test]
    fn test_short_caption_figures_only() {
        let fig = entity(FloatKind::Figure, "fig:a", "Short", 1, "");
        let tab = entity(FloatKind::Table, "tab:a", "Short", 1, "");
        let issues = check_floats(&[fig, tab], &FloatPolicy::default());
        assert_eq!(names(&issues), vec!["caption_too_short"]);
    }

    #[test]
    fn test_caption_threshold_is_configurable() {
        let fig = entity(FloatKind::Figure, "fig:a", "Short", 1, "");
        let policy = FloatPolicy { min_caption_chars: 5 };
        assert!(check_floats(&[fig], &policy).is_empty());
    }

    #[test]
    fn test_layout_heuristics() {
        let body = "\\includegraphics[width=1.2\\textwidth]{a}\\includegraphics[width = 0.5\\columnwidth]{b}\\hspace{-2em}";
        let fig = entity(FloatKind::Figure, "fig:a", GOOD_CAPTION, 1, body);
        let issues = check_floats(&[fig], &FloatPolicy::default());
        assert_eq!(names(&issues), vec!["overflow_width", "negative_hspace"]);
        match &issues[0].kind {
            IssueKind::OverflowWidth { value, .. } => assert!((*value - 1.2).abs() < 1e-9),
            other => panic!("unexpected issue {other:?}"),
        }
    }

    #[test]
    fn test_booktabs_heuristic() {
        let legacy = entity(FloatKind::Table, "tab:a", GOOD_CAPTION, 1, "\\hline a & b \\\\ \\hline");
        let mixed = entity(FloatKind::Table, "tab:b", GOOD_CAPTION, 1, "\\toprule a \\\\ \\hline");
        let issues = check_floats(&[legacy, mixed], &FloatPolicy::default());
        assert_eq!(names(&issues), vec!["no_booktabs"]);
    }
}
