//! Entity extractors.
//!
//! Citations, references and sections are read line by line from
//! comment-stripped text. Bibliography records and float environments are
//! read from whole-file content with the balanced-delimiter scanner.

pub mod bibliography;
pub mod citations;
pub mod floats;
pub mod references;
pub mod sections;

pub use bibliography::{BibEntry, parse_bibliography};
pub use citations::{Citation, extract_citations};
pub use floats::{FloatEntity, FloatKind, count_references, extract_floats};
pub use references::{Reference, extract_references};
pub use sections::{Section, SectionLine, extract_sections};
