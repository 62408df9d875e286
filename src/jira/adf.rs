//! Atlassian Document Format node tree.
//!
//! This is the rich-text schema Jira expects in issue description fields: a
//! `doc` root holding typed nodes, where leaf `text` nodes carry an ordered
//! array of mark objects. Purely a serialization target; built fresh from
//! the canonical document model by `tracker::mapper` and never read back.

use serde::Serialize;

/// Root `doc` node. Always version 1.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdfDoc {
	version: u32,
	#[serde(rename = "type")]
	node_type: &'static str,
	pub content: Vec<AdfNode>,
}

impl AdfDoc {
	pub fn new() -> Self {
		Self {
			version: 1,
			node_type: "doc",
			content: Vec::new(),
		}
	}
}

impl Default for AdfDoc {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AdfNode {
	Heading {
		attrs: HeadingAttrs,
		content: Vec<AdfNode>,
	},
	Paragraph {
		content: Vec<AdfNode>,
	},
	OrderedList {
		content: Vec<AdfNode>,
	},
	BulletList {
		content: Vec<AdfNode>,
	},
	ListItem {
		content: Vec<AdfNode>,
	},
	CodeBlock {
		attrs: CodeBlockAttrs,
		content: Vec<AdfNode>,
	},
	Text {
		text: String,
		#[serde(skip_serializing_if = "Vec::is_empty")]
		marks: Vec<AdfMark>,
	},
}

impl AdfNode {
	/// A text leaf with no marks, as used inside headings and code blocks.
	pub fn plain_text(text: impl Into<String>) -> Self {
		AdfNode::Text {
			text: text.into(),
			marks: Vec::new(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AdfMark {
	Strong,
	Em,
	Code,
	Strike,
	Link { attrs: LinkAttrs },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeadingAttrs {
	pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CodeBlockAttrs {
	pub language: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinkAttrs {
	pub href: String,
}
