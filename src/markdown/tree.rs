//! Block/inline tree over the pulldown-cmark event stream.
//!
//! The extraction pipeline works on a block-level sibling list, not on raw
//! events, so this module folds the event stream into owned [`Block`] and
//! [`Inline`] trees. Adjacent literal text and soft breaks are merged into a
//! single newline-joined [`Inline::Text`] run, which keeps a `[Bug] Title`
//! header and a two-line `Epic:`/`Labels:` footer each a single run.

use std::iter::Peekable;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

/// One top-level (or list-item-level) block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Block {
	Paragraph(Vec<Inline>),
	Heading { level: u8, content: Vec<Inline> },
	List { ordered: bool, items: Vec<Vec<Block>> },
	CodeBlock { language: String, code: String },
	ThematicBreak,
	/// A block kind outside the input contract (block quote, table, raw
	/// HTML). Kept so the description builder can reject it by name.
	Other(&'static str),
}

/// One inline markup node within a paragraph, heading, or list item.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Inline {
	Text(String),
	Code(String),
	Strong(Vec<Inline>),
	Emph(Vec<Inline>),
	Strikethrough(Vec<Inline>),
	Link { url: String, children: Vec<Inline> },
}

impl Block {
	/// A block is empty if it carries no literal text and has no non-empty
	/// children, recursively.
	pub(crate) fn is_empty(&self) -> bool {
		match self {
			Block::Paragraph(inlines) => inlines.iter().all(Inline::is_empty),
			Block::Heading { content, .. } => content.iter().all(Inline::is_empty),
			Block::List { items, .. } => items.iter().all(|item| item.iter().all(Block::is_empty)),
			Block::CodeBlock { code, .. } => code.is_empty(),
			Block::ThematicBreak => true,
			Block::Other(_) => false,
		}
	}

	pub(crate) fn kind(&self) -> &'static str {
		match self {
			Block::Paragraph(_) => "paragraph",
			Block::Heading { .. } => "heading",
			Block::List { .. } => "list",
			Block::CodeBlock { .. } => "code block",
			Block::ThematicBreak => "thematic break",
			Block::Other(name) => name,
		}
	}
}

impl Inline {
	fn is_empty(&self) -> bool {
		match self {
			Inline::Text(t) | Inline::Code(t) => t.is_empty(),
			Inline::Strong(children) | Inline::Emph(children) | Inline::Strikethrough(children) => children.iter().all(Inline::is_empty),
			Inline::Link { children, .. } => children.iter().all(Inline::is_empty),
		}
	}
}

/// Tokenize a markdown document into the top-level block list.
pub(crate) fn parse_blocks(input: &str) -> Vec<Block> {
	let parser = Parser::new_ext(input, Options::ENABLE_STRIKETHROUGH);
	let mut events = parser.peekable();
	collect_blocks(&mut events, false)
}

fn collect_blocks<'a, I>(events: &mut Peekable<I>, stop_on_end: bool) -> Vec<Block>
where
	I: Iterator<Item = Event<'a>>,
{
	let mut blocks = Vec::new();
	while let Some(event) = events.next() {
		match event {
			Event::End(_) =>
				if stop_on_end {
					return blocks;
				},
			Event::Start(Tag::Paragraph) => blocks.push(Block::Paragraph(collect_inlines(events))),
			Event::Start(Tag::Heading { level, .. }) => blocks.push(Block::Heading {
				level: level as u8,
				content: collect_inlines(events),
			}),
			Event::Start(Tag::List(start)) => {
				let ordered = start.is_some();
				let mut items = Vec::new();
				loop {
					match events.next() {
						Some(Event::Start(Tag::Item)) => items.push(collect_blocks(events, true)),
						Some(Event::End(_)) | None => break,
						Some(_) => {}
					}
				}
				blocks.push(Block::List { ordered, items });
			}
			Event::Start(Tag::CodeBlock(kind)) => {
				let language = match kind {
					CodeBlockKind::Fenced(info) => info.into_string(),
					CodeBlockKind::Indented => String::new(),
				};
				let mut code = String::new();
				loop {
					match events.next() {
						Some(Event::Text(text)) => code.push_str(&text),
						Some(Event::End(_)) | None => break,
						Some(_) => {}
					}
				}
				blocks.push(Block::CodeBlock { language, code });
			}
			Event::Rule => blocks.push(Block::ThematicBreak),
			Event::Html(_) => blocks.push(Block::Other("html block")),
			Event::Start(tag) if is_block_tag(&tag) => {
				let name = foreign_block_name(&tag);
				skip_container(events);
				blocks.push(Block::Other(name));
			}
			// Bare inline content: a tight list item without an explicit
			// paragraph wrapper.
			other => {
				let (inlines, consumed_end) = collect_bare_inlines(other, events);
				blocks.push(Block::Paragraph(inlines));
				if consumed_end && stop_on_end {
					return blocks;
				}
			}
		}
	}
	blocks
}

/// Inline content of a container; consumes the container's End event.
fn collect_inlines<'a, I>(events: &mut I) -> Vec<Inline>
where
	I: Iterator<Item = Event<'a>>,
{
	let mut out = Vec::new();
	let mut buf = String::new();
	while let Some(event) = events.next() {
		if matches!(event, Event::End(_)) {
			break;
		}
		push_inline_event(event, events, &mut out, &mut buf);
	}
	flush_text(&mut buf, &mut out);
	out
}

/// Inline content that is not wrapped in its own container: stops before the
/// next block-level event, or consumes the enclosing End (reported in the
/// returned flag).
fn collect_bare_inlines<'a, I>(first: Event<'a>, events: &mut Peekable<I>) -> (Vec<Inline>, bool)
where
	I: Iterator<Item = Event<'a>>,
{
	let mut out = Vec::new();
	let mut buf = String::new();
	push_inline_event(first, events, &mut out, &mut buf);

	let mut consumed_end = false;
	loop {
		match events.peek() {
			None => break,
			Some(Event::End(_)) => {
				events.next();
				consumed_end = true;
				break;
			}
			Some(Event::Rule) => break,
			Some(Event::Html(_)) => break,
			Some(Event::Start(tag)) if is_block_tag(tag) => break,
			Some(_) => {
				if let Some(event) = events.next() {
					push_inline_event(event, events, &mut out, &mut buf);
				}
			}
		}
	}
	flush_text(&mut buf, &mut out);
	(out, consumed_end)
}

/// Process one inline-level event; Start tags recurse until their matching
/// End, so nesting is preserved structurally.
fn push_inline_event<'a, I>(event: Event<'a>, events: &mut I, out: &mut Vec<Inline>, buf: &mut String)
where
	I: Iterator<Item = Event<'a>>,
{
	match event {
		Event::Text(text) => buf.push_str(&text),
		Event::SoftBreak => buf.push('\n'),
		// Hard breaks separate runs without contributing text.
		Event::HardBreak => flush_text(buf, out),
		Event::Code(code) => {
			flush_text(buf, out);
			out.push(Inline::Code(code.into_string()));
		}
		Event::Start(Tag::Strong) => {
			flush_text(buf, out);
			out.push(Inline::Strong(collect_inlines(events)));
		}
		Event::Start(Tag::Emphasis) => {
			flush_text(buf, out);
			out.push(Inline::Emph(collect_inlines(events)));
		}
		Event::Start(Tag::Strikethrough) => {
			flush_text(buf, out);
			out.push(Inline::Strikethrough(collect_inlines(events)));
		}
		Event::Start(Tag::Link { dest_url, .. }) => {
			flush_text(buf, out);
			out.push(Inline::Link {
				url: dest_url.into_string(),
				children: collect_inlines(events),
			});
		}
		// Images contribute their alt text as plain runs.
		Event::Start(Tag::Image { .. }) => {
			flush_text(buf, out);
			out.extend(collect_inlines(events));
		}
		Event::Start(_) => skip_container(events),
		_ => {}
	}
}

fn flush_text(buf: &mut String, out: &mut Vec<Inline>) {
	if !buf.is_empty() {
		out.push(Inline::Text(std::mem::take(buf)));
	}
}

fn is_block_tag(tag: &Tag<'_>) -> bool {
	matches!(
		tag,
		Tag::Paragraph
			| Tag::Heading { .. }
			| Tag::List(_)
			| Tag::Item
			| Tag::CodeBlock(_)
			| Tag::BlockQuote(_)
			| Tag::HtmlBlock
			| Tag::FootnoteDefinition(_)
			| Tag::DefinitionList
			| Tag::Table(_)
			| Tag::MetadataBlock(_)
	)
}

fn foreign_block_name(tag: &Tag<'_>) -> &'static str {
	match tag {
		Tag::BlockQuote(_) => "block quote",
		Tag::HtmlBlock => "html block",
		Tag::FootnoteDefinition(_) => "footnote definition",
		Tag::DefinitionList => "definition list",
		Tag::Table(_) => "table",
		Tag::MetadataBlock(_) => "metadata block",
		_ => "unsupported block",
	}
}

/// Consume events until the Start that was just read is balanced out.
fn skip_container<'a, I>(events: &mut I)
where
	I: Iterator<Item = Event<'a>>,
{
	let mut depth = 1usize;
	for event in events {
		match event {
			Event::Start(_) => depth += 1,
			Event::End(_) => {
				depth -= 1;
				if depth == 0 {
					break;
				}
			}
			_ => {}
		}
	}
}
