/*
 * project.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Project discovery and source loading
 */

//! Project discovery.
//!
//! A [`Project`] is the validated root directory, its configuration, and the
//! `.tex` sources found under it, each read exactly once. Reports are built
//! from a project; nothing here is mutated after [`Project::open`].

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ProjectConfig;
use crate::discovery::{SourceFile, discover_files, normalize_path};
use crate::error::{AuditError, Result};
use crate::extract::{BibEntry, parse_bibliography};
use crate::include::{IncludeTree, detect_entry, resolve_includes};

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
    tex_files: Vec<SourceFile>,
    bib_paths: Vec<PathBuf>,
}

impl Project {
    /// Open a project, loading `_texaudit.yml` from its root if present.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = canonical_root(root.as_ref())?;
        let config = ProjectConfig::load(&root)?;
        Self::from_parts(root, config)
    }

    /// Open a project with an explicit configuration.
    pub fn with_config(root: impl AsRef<Path>, config: ProjectConfig) -> Result<Self> {
        let root = canonical_root(root.as_ref())?;
        Self::from_parts(root, config)
    }

    fn from_parts(root: PathBuf, config: ProjectConfig) -> Result<Self> {
        let exclusions = config.exclusions();
        let tex_files = discover_files(&root, "tex", &exclusions)
            .iter()
            .map(|path| SourceFile::load(&root, path))
            .collect();
        let bib_paths = discover_files(&root, "bib", &exclusions);
        debug!("opened project at {}", root.display());

        Ok(Self {
            root,
            config,
            tex_files,
            bib_paths,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Every discovered `.tex` file, sorted by path.
    pub fn tex_files(&self) -> &[SourceFile] {
        &self.tex_files
    }

    pub fn bib_paths(&self) -> &[PathBuf] {
        &self.bib_paths
    }

    pub fn has_sources(&self) -> bool {
        !self.tex_files.is_empty()
    }

    /// Locate a user-supplied path: absolute as given, otherwise relative
    /// to the project root, then to the working directory.
    pub fn locate(&self, path: &Path) -> Option<PathBuf> {
        let candidates = if path.is_absolute() {
            vec![path.to_path_buf()]
        } else {
            vec![self.root.join(path), path.to_path_buf()]
        };
        candidates
            .into_iter()
            .find(|p| p.is_file())
            .map(|p| p.canonicalize().unwrap_or_else(|_| normalize_path(&p)))
    }

    /// The entry file: the explicit one if given, else the detected one.
    ///
    /// Returns `Ok(None)` only when there is no source at all.
    pub fn entry(&self, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        match explicit {
            Some(path) => self
                .locate(path)
                .map(Some)
                .ok_or_else(|| AuditError::EntryNotFound(path.to_path_buf())),
            None => Ok(detect_entry(&self.tex_files).map(|f| f.path.clone())),
        }
    }

    pub fn include_tree(&self, entry: &Path) -> IncludeTree {
        resolve_includes(&self.root, entry, &self.tex_files)
    }

    /// Bibliography files in scope: the explicit one, or all discovered.
    pub fn bibliography_files(&self, explicit: Option<&Path>) -> Result<Vec<SourceFile>> {
        let paths = match explicit {
            Some(path) => vec![
                self.locate(path)
                    .ok_or_else(|| AuditError::BibliographyNotFound(path.to_path_buf()))?,
            ],
            None => self.bib_paths.clone(),
        };
        Ok(paths
            .iter()
            .map(|path| SourceFile::load(&self.root, path))
            .collect())
    }

    /// Parse every bibliography file in scope, in file order.
    pub fn bibliography(&self, explicit: Option<&Path>) -> Result<Vec<BibEntry>> {
        Ok(self
            .bibliography_files(explicit)?
            .iter()
            .flat_map(parse_bibliography)
            .collect())
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(AuditError::InvalidRoot(root.to_path_buf()));
    }
    Ok(root.canonicalize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_with(files: &[(&str, &str)]) -> (TempDir, Project) {
        let temp = TempDir::new().unwrap();
        for (path, content) in files {
            let full = temp.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }
        let project = Project::open(temp.path()).unwrap();
        (temp, project)
    }

    #[test]
    fn test_invalid_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(Project::open(&missing), Err(AuditError::InvalidRoot(_))));

        let file = temp.path().join("file.tex");
        fs::write(&file, "").unwrap();
        assert!(matches!(Project::open(&file), Err(AuditError::InvalidRoot(_))));
    }

    #[test]
    fn test_detected_entry() {
        let (_temp, project) = project_with(&[
            ("a.tex", "\\section{A}"),
            ("paper.tex", "\\documentclass{article}"),
        ]);
        let entry = project.entry(None).unwrap().unwrap();
        assert!(entry.ends_with("paper.tex"));
    }

    #[test]
    fn test_explicit_entry_relative_to_root() {
        let (_temp, project) = project_with(&[("src/main.tex", ""), ("other.tex", "\\documentclass{x}")]);
        let entry = project.entry(Some(Path::new("src/main.tex"))).unwrap().unwrap();
        assert!(entry.ends_with("src/main.tex"));
    }

    #[test]
    fn test_missing_explicit_entry_is_an_error() {
        let (_temp, project) = project_with(&[("main.tex", "")]);
        let err = project.entry(Some(Path::new("missing.tex"))).unwrap_err();
        assert!(matches!(err, AuditError::EntryNotFound(_)));
    }

    #[test]
    fn test_no_sources() {
        let (_temp, project) = project_with(&[("notes.txt", "")]);
        assert!(!project.has_sources());
        assert_eq!(project.entry(None).unwrap(), None);
    }

    #[test]
    fn test_config_exclusions_apply() {
        let (_temp, project) = project_with(&[
            ("_texaudit.yml", "discovery:\n  exclude: [drafts]\n"),
            ("main.tex", ""),
            ("drafts/old.tex", ""),
            ("build/out.tex", ""),
        ]);
        let rel: Vec<_> = project.tex_files().iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(rel, vec!["main.tex"]);
    }

    #[test]
    fn test_bibliography_scope() {
        let (_temp, project) = project_with(&[
            ("a.bib", "@misc{a, title={A}}"),
            ("refs/b.bib", "@misc{b, title={B}}"),
        ]);
        assert_eq!(project.bibliography(None).unwrap().len(), 2);
        let only_b = project.bibliography(Some(Path::new("refs/b.bib"))).unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].file, "refs/b.bib");
        assert!(matches!(
            project.bibliography(Some(Path::new("none.bib"))),
            Err(AuditError::BibliographyNotFound(_))
        ));
    }
}
