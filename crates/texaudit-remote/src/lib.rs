//! Bibliography validation against remote metadata services
//!
//! This crate is the optional, network-dependent pass over parsed
//! bibliography entries. It classifies each entry as `valid`,
//! `needs_correction`, `likely_hallucinated` or `not_found` by looking it
//! up on a [`MetadataSource`], by DOI first and by title as a fallback.
//!
//! Lookups are blocking and strictly sequential. A failed lookup only
//! affects the status of the entry it was made for.

pub mod crossref;
pub mod error;
mod http;
pub mod matcher;
pub mod source;

pub use crossref::CrossrefClient;
pub use error::{RemoteError, Result};
pub use matcher::{
    EntryResolver, IdentifierStrategy, Matcher, TitleStrategy, ValidationResult, ValidationStatus,
    normalize_doi, status_counts,
};
pub use source::{MetadataSource, RemoteWork};
