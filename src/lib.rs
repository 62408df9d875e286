//! Import issues into Jira from a markdown file.
//!
//! One file holds many issues, separated by thematic breaks (`---`). Each
//! section starts with a `[Type] Title` header line, optionally ends with an
//! `Epic:` / `Labels:` metadata line, and everything in between becomes the
//! issue description, converted to Atlassian Document Format on submission.

pub mod config;
pub mod issue;
pub mod jira;
pub mod markdown;
pub mod tracker;

pub use config::JiraSettings;
pub use issue::{Document, DocumentNode, Epic, HeadingLevel, Issue, IssueType, ListData, TextContainer, TextElement, TextMode};
pub use markdown::{ParseError, extract_issues};
pub use tracker::{JiraTracker, Tracker, map_document};
