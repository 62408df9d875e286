//! Canonical rich-text document model.
//!
//! An [`Document`] is an ordered sequence of block nodes built once by the
//! description builder and immutable afterwards. It carries no parsing
//! logic and no reference to any particular wire format; projecting it into
//! the tracker's schema lives in `tracker::mapper`.

/// An issue description: an append-only sequence of block nodes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Document {
	pub nodes: Vec<DocumentNode>,
}

impl Document {
	pub fn push_heading(&mut self, level: HeadingLevel, text: impl Into<String>) {
		self.nodes.push(DocumentNode::Heading { level, text: text.into() });
	}

	pub fn push_paragraph(&mut self, content: TextContainer) {
		self.nodes.push(DocumentNode::Paragraph(content));
	}

	pub fn push_list(&mut self, list: ListData) {
		self.nodes.push(DocumentNode::List(list));
	}

	pub fn push_code_block(&mut self, language: impl Into<String>, code: impl Into<String>) {
		self.nodes.push(DocumentNode::CodeBlock {
			language: language.into(),
			code: code.into(),
		});
	}
}

/// One block of a description. Consumers must match exhaustively so new
/// variants cannot be silently ignored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DocumentNode {
	Heading { level: HeadingLevel, text: String },
	Paragraph(TextContainer),
	List(ListData),
	CodeBlock { language: String, code: String },
}

/// Heading depth. The model tops out at level 5; deeper source headings
/// degrade to [`HeadingLevel::H5`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HeadingLevel {
	H1,
	H2,
	H3,
	H4,
	H5,
}

impl HeadingLevel {
	/// Map a markdown heading level (1-based) onto the model, clamping
	/// anything out of range to H5.
	pub fn from_md(level: u8) -> Self {
		match level {
			1 => HeadingLevel::H1,
			2 => HeadingLevel::H2,
			3 => HeadingLevel::H3,
			4 => HeadingLevel::H4,
			5 => HeadingLevel::H5,
			_ => HeadingLevel::H5,
		}
	}

	pub fn as_u8(self) -> u8 {
		match self {
			HeadingLevel::H1 => 1,
			HeadingLevel::H2 => 2,
			HeadingLevel::H3 => 3,
			HeadingLevel::H4 => 4,
			HeadingLevel::H5 => 5,
		}
	}
}

/// An ordered or bullet list; each item is a flat run container.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ListData {
	pub ordered: bool,
	pub items: Vec<TextContainer>,
}

impl ListData {
	pub fn new(ordered: bool) -> Self {
		Self { ordered, items: Vec::new() }
	}

	pub fn push_item(&mut self, item: TextContainer) {
		self.items.push(item);
	}
}

/// Independent boolean styles carried by one text run. A run may combine
/// any subset of them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TextMode {
	pub bold: bool,
	pub italics: bool,
	pub strikethrough: bool,
	pub code: bool,
}

/// One styled run. `text` is never empty; runs are never split or merged
/// after being appended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextElement {
	pub text: String,
	pub mode: TextMode,
	pub link_url: Option<String>,
}

/// Ordered sequence of styled runs backing a paragraph or a list item.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TextContainer {
	pub elements: Vec<TextElement>,
}

impl TextContainer {
	pub fn push_text(&mut self, text: impl Into<String>, mode: TextMode) {
		self.elements.push(TextElement {
			text: text.into(),
			mode,
			link_url: None,
		});
	}

	pub fn push_link(&mut self, text: impl Into<String>, link_url: impl Into<String>, mode: TextMode) {
		self.elements.push(TextElement {
			text: text.into(),
			mode,
			link_url: Some(link_url.into()),
		});
	}
}
