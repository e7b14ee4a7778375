//! Title normalization and similarity scoring.
//!
//! Titles are compared after stripping LaTeX markup and punctuation. The
//! score privileges containment over token overlap: a truncated title or
//! one with an appended subtitle scores 0.9, above any merely topical match.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static COMMAND_WRAPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\[a-zA-Z]+\*?(?:\[[^\]]*\])?\{([^{}]*)\}")
        .expect("Invalid regex pattern for command wrapper")
});

/// Score for titles where one contains the other.
pub const CONTAINMENT_SCORE: f64 = 0.9;

/// Normalize a title for comparison.
///
/// Command wrappers such as `\emph{x}` are replaced by their argument,
/// innermost first, until none remain. Braces are then dropped, every
/// non-alphanumeric character becomes a space, and the result is
/// whitespace-collapsed and lower-cased.
pub fn normalize_title(title: &str) -> String {
    let mut text = title.to_string();
    loop {
        let next = COMMAND_WRAPPER_RE.replace_all(&text, "$1").into_owned();
        if next == text {
            break;
        }
        text = next;
    }

    let cleaned: String = text
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Similarity of two raw titles in `0.0..=1.0`.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    normalized_similarity(&normalize_title(a), &normalize_title(b))
}

/// Similarity of two already-normalized titles.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.contains(b) || b.contains(a) {
        return CONTAINMENT_SCORE;
    }

    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

/// Round a score to three decimals for reporting.
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
