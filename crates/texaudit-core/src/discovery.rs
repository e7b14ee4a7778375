/*
 * discovery.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Source file discovery under a project root
 */

//! Source file discovery.
//!
//! Walks a project root for files with a given extension, pruning excluded
//! directories, and loads them as [`SourceFile`]s keyed by their
//! root-relative path.

use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::ExclusionSet;

/// A file read once per run, identified by its root-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub relative: String,
    pub content: String,
}

impl SourceFile {
    /// Read `path`. Unreadable files load as empty content.
    pub fn load(root: &Path, path: &Path) -> Self {
        let content = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                debug!("treating unreadable {} as empty: {}", path.display(), e);
                String::new()
            }
        };
        Self::from_content(root, path, content)
    }

    pub fn from_content(root: &Path, path: &Path, content: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            relative: relative_path(root, path),
            content: content.into(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.content.lines().enumerate().map(|(i, l)| (i + 1, l))
    }
}

/// Root-relative display path with `/` separators.
///
/// Paths outside the root are returned as given.
pub fn relative_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

/// Lexically normalize a path, folding `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Find every file under `root` with extension `ext`, sorted.
pub fn discover_files(root: &Path, ext: &str, exclusions: &ExclusionSet) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, exclusions))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|x| x == ext))
        .map(DirEntry::into_path)
        .collect();

    files.sort();
    debug!("discovered {} .{} files under {}", files.len(), ext, root.display());
    files
}

fn is_excluded_dir(entry: &DirEntry, exclusions: &ExclusionSet) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclusions.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_skips_excluded_dirs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("chapters")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join("main.tex"), "").unwrap();
        fs::write(root.join("chapters/intro.tex"), "").unwrap();
        fs::write(root.join("build/main.tex"), "").unwrap();
        fs::write(root.join(".git/objects/x.tex"), "").unwrap();
        fs::write(root.join("refs.bib"), "").unwrap();

        let files = discover_files(root, "tex", &ExclusionSet::default());
        let rel: Vec<_> = files.iter().map(|p| relative_path(root, p)).collect();
        assert_eq!(rel, vec!["chapters/intro.tex", "main.tex"]);
    }

    #[test]
    fn test_discover_by_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.bib"), "").unwrap();
        fs::write(temp.path().join("b.tex"), "").unwrap();
        let bibs = discover_files(temp.path(), "bib", &ExclusionSet::default());
        assert_eq!(bibs.len(), 1);
        assert!(bibs[0].ends_with("a.bib"));
    }

    #[test]
    fn test_root_named_like_excluded_dir_is_walked() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("build");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("main.tex"), "").unwrap();
        assert_eq!(discover_files(&root, "tex", &ExclusionSet::default()).len(), 1);
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/proj");
        assert_eq!(relative_path(root, Path::new("/proj/a/b.tex")), "a/b.tex");
        assert_eq!(relative_path(root, Path::new("/other/c.bib")), "/other/c.bib");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/proj/chapters/../sections/./a.tex")),
            PathBuf::from("/proj/sections/a.tex")
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let file = SourceFile::load(temp.path(), &temp.path().join("missing.tex"));
        assert_eq!(file.content, "");
        assert_eq!(file.relative, "missing.tex");
    }
}
