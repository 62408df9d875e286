//! Jira-specific wire formats and the REST client.

pub mod adf;
pub use adf::{AdfDoc, AdfMark, AdfNode, CodeBlockAttrs, HeadingAttrs, LinkAttrs};

mod client;
pub use client::{ImportError, ImportOutcome, JiraClient, JiraIssue, JiraIssueType};
