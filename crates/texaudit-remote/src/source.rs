//! The metadata-source seam.

use serde::Serialize;

use crate::error::Result;

/// Canonical metadata for one work, as returned by a remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteWork {
    pub doi: Option<String>,
    pub title: Option<String>,
}

impl RemoteWork {
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// A bibliographic metadata service.
///
/// Calls are blocking and made one at a time; each implementation applies
/// its own per-request timeout.
pub trait MetadataSource {
    /// Fetch the work registered under `doi`.
    fn lookup_doi(&self, doi: &str) -> Result<RemoteWork>;

    /// Search by title, returning at most `rows` candidates.
    fn search_title(&self, title: &str, rows: usize) -> Result<Vec<RemoteWork>>;
}

impl<T: MetadataSource + ?Sized> MetadataSource for &T {
    fn lookup_doi(&self, doi: &str) -> Result<RemoteWork> {
        (**self).lookup_doi(doi)
    }

    fn search_title(&self, title: &str, rows: usize) -> Result<Vec<RemoteWork>> {
        (**self).search_title(title, rows)
    }
}
