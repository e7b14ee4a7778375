/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Project configuration loaded from _texaudit.yml
 */

//! Project configuration.
//!
//! A project may carry a `_texaudit.yml` (or `_texaudit.yaml`) file at its
//! root. Every key is optional; missing keys fall back to the defaults
//! below, and command-line flags override whatever the file says.
//!
//! ```yaml
//! discovery:
//!   exclude: [figures-src, old]
//! checks:
//!   min-section-words: 150
//!   max-issues: 200
//! remote:
//!   timeout: 5
//!   mailto: someone@example.org
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{AuditError, Result};

/// Config file names, in lookup order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["_texaudit.yml", "_texaudit.yaml"];

/// Directory names skipped during discovery unless configured otherwise.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 10] = [
    ".git",
    ".hg",
    ".svn",
    ".texguardian",
    "_original",
    "backup",
    "build",
    "dist",
    "node_modules",
    "__pycache__",
];

pub const DEFAULT_MIN_SECTION_WORDS: usize = 120;
pub const DEFAULT_MIN_CAPTION_CHARS: usize = 20;
pub const DEFAULT_MAX_PARAGRAPH_WORDS: usize = 220;
pub const DEFAULT_MAX_ISSUES: usize = 500;
pub const DEFAULT_REMOTE_TIMEOUT_SECS: f64 = 8.0;
pub const DEFAULT_REMOTE_ROWS: usize = 3;
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://api.crossref.org";

/// Immutable set of directory names excluded from file discovery.
///
/// A path is excluded when any of its components, relative to the project
/// root, is a member of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<String>,
}

impl ExclusionSet {
    /// The default set extended with additional names.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        set.names.extend(extra.into_iter().map(Into::into));
        set
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// Extra directory names to skip, on top of the defaults.
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CheckConfig {
    pub min_section_words: usize,
    pub min_caption_chars: usize,
    pub max_paragraph_words: usize,
    pub max_issues: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            min_section_words: DEFAULT_MIN_SECTION_WORDS,
            min_caption_chars: DEFAULT_MIN_CAPTION_CHARS,
            max_paragraph_words: DEFAULT_MAX_PARAGRAPH_WORDS,
            max_issues: DEFAULT_MAX_ISSUES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RemoteConfig {
    /// Per-request timeout in seconds.
    pub timeout: f64,
    /// Candidates requested per title search.
    pub rows: usize,
    /// Contact address sent to the metadata service.
    pub mailto: Option<String>,
    pub base_url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REMOTE_TIMEOUT_SECS,
            rows: DEFAULT_REMOTE_ROWS,
            mailto: None,
            base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    pub discovery: DiscoveryConfig,
    pub checks: CheckConfig,
    pub remote: RemoteConfig,
}

impl ProjectConfig {
    /// Load the project config from `root`, or defaults if there is none.
    pub fn load(root: &Path) -> Result<Self> {
        match Self::find(root) {
            Some(path) => Self::parse_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Locate a config file directly under `root`.
    pub fn find(root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }

    pub fn parse_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!("loading project config from {}", path.display());
        Self::parse_str(&content).map_err(|message| AuditError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse_str(content: &str) -> std::result::Result<Self, String> {
        // An empty file deserializes to null; treat it as all defaults.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::with_extra(self.discovery.exclude.iter().cloned())
    }
}
