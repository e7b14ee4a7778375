//! Cross-reference extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::discovery::SourceFile;
use crate::scan::{split_keys, strip_comment};

pub(crate) static REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:ref|autoref|eqref|pageref|nameref|[cC]ref)\*?\{([^}]+)\}")
        .expect("Invalid regex pattern for reference commands")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub key: String,
    pub file: String,
    pub line: usize,
}

pub fn extract_references<'a>(files: impl IntoIterator<Item = &'a SourceFile>) -> Vec<Reference> {
    let mut references = Vec::new();
    for file in files {
        for (line_no, line) in file.lines() {
            for caps in REF_RE.captures_iter(strip_comment(line)) {
                references.extend(split_keys(&caps[1]).map(|key| Reference {
                    key: key.to_string(),
                    file: file.relative.clone(),
                    line: line_no,
                }));
            }
        }
    }
    references
}
