//! Markdown import pipeline.
//!
//! Tokenizes a markdown file with pulldown-cmark, segments the resulting
//! block tree into per-issue sections, and extracts one [`crate::issue::Issue`]
//! per section.

mod extract;
pub use extract::{ParseError, extract_issues};

mod tree;
