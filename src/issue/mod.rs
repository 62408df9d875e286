//! Issue domain types.
//!
//! This module contains the pure issue representation produced by the
//! markdown extraction pipeline, including the canonical rich-text
//! document model used for issue descriptions.

mod document;
pub use document::{Document, DocumentNode, HeadingLevel, ListData, TextContainer, TextElement, TextMode};

mod types;
pub use types::{Epic, Issue, IssueType};
