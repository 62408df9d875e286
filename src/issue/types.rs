//! Core issue data structures.

use std::fmt;

use crate::issue::Document;

/// Kind of a tracker issue, recovered from the `[Type]` tag of a section
/// header. Absence of a tag means [`IssueType::Story`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IssueType {
	Chore,
	Story,
	Bug,
}

impl fmt::Display for IssueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			IssueType::Chore => "Chore",
			IssueType::Story => "User Story",
			IssueType::Bug => "Bug",
		};
		write!(f, "{s}")
	}
}

/// Reference to a parent epic, carried as an opaque tracker-side ID.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Epic {
	pub id: String,
}

/// One issue extracted from a markdown section.
///
/// `id` starts out empty and is written back once after the issue has been
/// created remotely; nothing else is mutated after extraction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Issue {
	pub id: Option<String>,
	pub issue_type: IssueType,
	pub title: String,
	pub description: Option<Document>,
	pub epic: Option<Epic>,
	/// Insertion order is preserved; duplicates are allowed.
	pub labels: Vec<String>,
}
