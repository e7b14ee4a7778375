/*
 * probe.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Toolchain presence probe
 */

//! Toolchain presence probe.
//!
//! Each tool is looked up on `PATH` first via `which`. If that fails, a
//! per-category list of well-known install locations is searched:
//!
//! - `latex`: `LATEX_PATH`, TinyTeX, MacTeX or TeX Live, then the system bins
//! - `poppler`: Homebrew on Apple silicon, then the system bins
//!
//! The probe never fails; a missing tool is reported with an install hint.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::ToolchainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Latex,
    Poppler,
}

impl ToolCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Latex => "latex",
            Self::Poppler => "poppler",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolCategory {
    type Err = ToolchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "latex" => Ok(Self::Latex),
            "poppler" => Ok(Self::Poppler),
            other => Err(ToolchainError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub category: ToolCategory,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, category: ToolCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

pub fn default_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new("latexmk", ToolCategory::Latex),
        ToolSpec::new("pdflatex", ToolCategory::Latex),
        ToolSpec::new("pdfinfo", ToolCategory::Poppler),
        ToolSpec::new("pdftoppm", ToolCategory::Poppler),
    ]
}

/// Parse a `name[:category],...` list. An empty list means the defaults.
pub fn parse_tools(raw: &str) -> Result<Vec<ToolSpec>, ToolchainError> {
    let mut tools = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let spec = match token.split_once(':') {
            Some((name, category)) => ToolSpec::new(name.trim(), category.parse()?),
            None => ToolSpec::new(token, ToolCategory::Latex),
        };
        tools.push(spec);
    }
    if tools.is_empty() {
        return Ok(default_tools());
    }
    Ok(tools)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub category: ToolCategory,
    pub found: bool,
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolchainReport {
    pub checked_at: DateTime<Utc>,
    pub all_found: bool,
    pub tools: Vec<ToolStatus>,
}

/// The environment a probe searches.
///
/// [`Probe::from_env`] captures the current process environment; tests
/// build one directly.
#[derive(Debug, Clone)]
pub struct Probe {
    pub path_var: Option<OsString>,
    pub latex_path: Option<String>,
    pub home: Option<PathBuf>,
    pub os: String,
    pub arch: String,
    /// Whether to search the well-known install locations after `PATH`.
    pub search_fallback: bool,
}

impl Probe {
    pub fn from_env() -> Self {
        Self {
            path_var: std::env::var_os("PATH"),
            latex_path: std::env::var("LATEX_PATH")
                .ok()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            home: dirs::home_dir(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            search_fallback: true,
        }
    }

    pub fn search_dirs(&self, category: ToolCategory) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        match category {
            ToolCategory::Latex => {
                if let Some(path) = &self.latex_path {
                    dirs.push(PathBuf::from(path));
                }
                match (self.os.as_str(), &self.home) {
                    ("macos", home) => {
                        if let Some(home) = home {
                            dirs.push(home.join("Library/TinyTeX/bin/universal-darwin"));
                        }
                        dirs.push(PathBuf::from("/Library/TeX/texbin"));
                        dirs.push(PathBuf::from("/usr/texbin"));
                    }
                    ("linux", home) => {
                        if let Some(home) = home {
                            dirs.push(home.join(".TinyTeX/bin/x86_64-linux"));
                        }
                        dirs.push(PathBuf::from(format!(
                            "/usr/local/texlive/current/bin/{}-linux",
                            self.arch
                        )));
                    }
                    _ => {}
                }
                dirs.push(PathBuf::from("/usr/bin"));
                dirs.push(PathBuf::from("/usr/local/bin"));
            }
            ToolCategory::Poppler => {
                if self.os == "macos" && self.arch == "aarch64" {
                    dirs.push(PathBuf::from("/opt/homebrew/bin"));
                    dirs.push(PathBuf::from("/usr/local/bin"));
                    dirs.push(PathBuf::from("/usr/bin"));
                } else {
                    dirs.push(PathBuf::from("/usr/bin"));
                    dirs.push(PathBuf::from("/usr/local/bin"));
                }
            }
        }
        dirs
    }

    pub fn find(&self, tool: &ToolSpec) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        if let Ok(found) = which::which_in(&tool.name, self.path_var.as_ref(), cwd) {
            return Some(found);
        }
        if !self.search_fallback {
            return None;
        }
        self.search_dirs(tool.category)
            .into_iter()
            .map(|dir| dir.join(&tool.name))
            .find(|candidate| is_executable(candidate))
    }

    pub fn install_hint(&self, tool: &str) -> String {
        let hint = match (tool, self.os.as_str()) {
            ("latexmk", "macos") => "Install TinyTeX or MacTeX (e.g. brew install --cask mactex-no-gui).",
            ("latexmk", "linux") => "Install TeX Live (e.g. sudo apt install texlive-full).",
            ("pdflatex", "macos") => "Install TinyTeX or MacTeX.",
            ("pdflatex", "linux") => "Install TeX Live base (e.g. sudo apt install texlive-latex-base).",
            ("pdfinfo" | "pdftoppm", "macos") => "Install Poppler (brew install poppler).",
            ("pdfinfo" | "pdftoppm", "linux") => "Install poppler-utils (sudo apt install poppler-utils).",
            _ => "Install and ensure this binary is on PATH.",
        };
        hint.to_string()
    }

    pub fn probe_tool(&self, tool: &ToolSpec) -> ToolStatus {
        let path = self.find(tool);
        debug!("probe {}: {:?}", tool.name, path);
        let found = path.is_some();
        ToolStatus {
            name: tool.name.clone(),
            category: tool.category,
            found,
            path: path.map(|p| p.display().to_string()),
            install_hint: (!found).then(|| self.install_hint(&tool.name)),
        }
    }

    pub fn check(&self, tools: &[ToolSpec]) -> ToolchainReport {
        let tools: Vec<ToolStatus> = tools.iter().map(|t| self.probe_tool(t)).collect();
        ToolchainReport {
            checked_at: Utc::now(),
            all_found: tools.iter().all(|t| t.found),
            tools,
        }
    }
}

/// Locate a single tool in the current environment.
pub fn locate(name: &str, category: ToolCategory) -> Option<PathBuf> {
    Probe::from_env().find(&ToolSpec::new(name, category))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
