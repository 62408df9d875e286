//! Issue extraction from a markdown block tree.
//!
//! A markdown file holds one issue per section, sections being runs of
//! top-level blocks delimited by thematic breaks. Within a section the first
//! block is the `[Type] Title` header and the last block optionally carries
//! `Epic:` / `Labels:` metadata; everything in between (plus the last block
//! when it is not metadata) becomes the issue description.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
	issue::{Document, Epic, HeadingLevel, Issue, IssueType, ListData, TextContainer, TextMode},
	markdown::tree::{Block, Inline, parse_blocks},
};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(?:\[([^\[\]]+)\])?\s*(.+)\s*$").expect("static regex"));
static EPIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:E|Epic):\s*(.+)").expect("static regex"));
static LABELS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:L|Labels):\s*(.+)").expect("static regex"));

/// Structural extraction failure. Any of these aborts the whole file; there
/// are no partial results.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
	#[error("first line in issue section must be of the form '[ISSUE TYPE] ISSUE TITLE'")]
	MalformedHeader,
	#[error("unknown issue type '{0}'")]
	UnknownIssueType(String),
	#[error("unsupported {0} in issue description")]
	UnsupportedBlock(&'static str),
	#[error("failed to parse issue {ordinal} in markdown file")]
	InSection {
		ordinal: usize,
		#[source]
		source: Box<ParseError>,
	},
}

/// Extract the ordered issue list from one markdown document.
///
/// A document with no non-empty, non-break content yields an empty list.
pub fn extract_issues(input: &str) -> Result<Vec<Issue>, ParseError> {
	let blocks = parse_blocks(input);
	let (blocks, sections) = segment(blocks);

	let mut issues = Vec::with_capacity(sections.len());
	for (idx, section) in sections.iter().enumerate() {
		let issue = make_issue(&blocks[section.first..=section.last]).map_err(|source| ParseError::InSection {
			ordinal: idx + 1,
			source: Box::new(source),
		})?;
		issues.push(issue);
	}
	Ok(issues)
}

/// A section: an inclusive index range over the cleaned block list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Section {
	first: usize,
	last: usize,
}

/// Drop empty blocks and thematic breaks, recording section boundaries.
///
/// A break is a boundary only when non-empty content exists on both sides of
/// it; breaks at the document edges are no-ops, and consecutive breaks
/// collapse to a single boundary. With N boundaries the cleaned sequence
/// slices into N+1 sections.
fn segment(blocks: Vec<Block>) -> (Vec<Block>, Vec<Section>) {
	let mut cleaned: Vec<Block> = Vec::with_capacity(blocks.len());
	let mut boundaries: Vec<usize> = Vec::new();
	// Candidate boundary awaiting content after the break to confirm it.
	let mut pending: Option<usize> = None;

	for block in blocks {
		if let Block::ThematicBreak = block {
			if !cleaned.is_empty() {
				pending = Some(cleaned.len() - 1);
			}
			continue;
		}
		if block.is_empty() {
			continue;
		}
		if let Some(boundary) = pending.take() {
			boundaries.push(boundary);
		}
		cleaned.push(block);
	}

	if cleaned.is_empty() {
		return (cleaned, Vec::new());
	}

	let mut sections = Vec::with_capacity(boundaries.len() + 1);
	let mut first = 0;
	for &boundary in &boundaries {
		sections.push(Section { first, last: boundary });
		first = boundary + 1;
	}
	sections.push(Section { first, last: cleaned.len() - 1 });
	(cleaned, sections)
}

fn make_issue(section: &[Block]) -> Result<Issue, ParseError> {
	let (issue_type, title) = parse_header(section)?;
	let (epic_id, labels) = parse_footer(section);

	// The last block is metadata only when one of the footer patterns
	// matched; otherwise it is genuine description content.
	let include_last = epic_id.is_none() && labels.is_none();
	let description = parse_description(section, include_last)?;

	Ok(Issue {
		id: None,
		issue_type,
		title,
		description,
		epic: epic_id.map(|id| Epic { id }),
		labels: labels.unwrap_or_default(),
	})
}

/// Text of a block, provided it is a paragraph holding exactly one unstyled
/// run. Headers and footers must have this shape.
fn single_plain_run(block: &Block) -> Option<&str> {
	match block {
		Block::Paragraph(inlines) => match inlines.as_slice() {
			[Inline::Text(text)] => Some(text),
			_ => None,
		},
		_ => None,
	}
}

fn parse_header(section: &[Block]) -> Result<(IssueType, String), ParseError> {
	let first_line = section.first().and_then(single_plain_run).ok_or(ParseError::MalformedHeader)?;
	let captures = HEADER_RE.captures(first_line).ok_or(ParseError::MalformedHeader)?;

	let issue_type = match captures.get(1).map(|m| m.as_str().trim()) {
		None | Some("Story") | Some("Issue") => IssueType::Story,
		Some("Bug") => IssueType::Bug,
		Some("Chore") | Some("Task") => IssueType::Chore,
		Some(other) => return Err(ParseError::UnknownIssueType(other.to_owned())),
	};
	let title = captures.get(2).map(|m| m.as_str().trim().to_owned()).ok_or(ParseError::MalformedHeader)?;
	Ok((issue_type, title))
}

/// Best-effort footer metadata; never fails. Both patterns are searched
/// independently and may match the same block.
fn parse_footer(section: &[Block]) -> (Option<String>, Option<Vec<String>>) {
	let Some(last_paragraph) = section.last().and_then(single_plain_run) else {
		return (None, None);
	};

	let epic_id = EPIC_RE
		.captures(last_paragraph)
		.and_then(|c| c.get(1))
		.map(|m| m.as_str().trim().to_owned())
		.filter(|id| !id.is_empty());

	let labels = LABELS_RE
		.captures(last_paragraph)
		.and_then(|c| c.get(1))
		.map(|m| m.as_str().split(',').map(|label| label.trim().to_owned()).collect::<Vec<_>>());

	(epic_id, labels)
}

fn parse_description(section: &[Block], include_last: bool) -> Result<Option<Document>, ParseError> {
	// Header and footer are the same block: no description at all.
	if section.len() == 1 {
		return Ok(None);
	}

	let end = if include_last { section.len() } else { section.len() - 1 };
	let mut doc = Document::default();
	for block in &section[1..end] {
		match block {
			Block::Paragraph(inlines) => {
				let mut tc = TextContainer::default();
				collect_runs(inlines, TextMode::default(), None, &mut tc);
				doc.push_paragraph(tc);
			}
			Block::List { ordered, items } => {
				let mut list = ListData::new(*ordered);
				for item in items {
					let mut tc = TextContainer::default();
					collect_runs_from_blocks(item, TextMode::default(), None, &mut tc);
					list.push_item(tc);
				}
				doc.push_list(list);
			}
			Block::CodeBlock { language, code } => doc.push_code_block(language.clone(), code.clone()),
			Block::Heading { level, content } => {
				// Headings carry text only; inline styling is flattened away.
				doc.push_heading(HeadingLevel::from_md(*level), flatten_text(content));
			}
			Block::ThematicBreak | Block::Other(_) => return Err(ParseError::UnsupportedBlock(block.kind())),
		}
	}
	Ok(Some(doc))
}

/// Depth-first inline walk emitting one run per leaf.
///
/// Style flags are set for the duration of a subtree and restored on exit by
/// the recursion itself, so nested marks of the same kind stay in effect
/// instead of cancelling out. An inline-code leaf forces the code flag for
/// that single run only. Empty leaves emit nothing.
fn collect_runs(inlines: &[Inline], mode: TextMode, link: Option<&str>, out: &mut TextContainer) {
	for inline in inlines {
		match inline {
			Inline::Text(text) =>
				if !text.is_empty() {
					match link {
						Some(url) => out.push_link(text.clone(), url, mode),
						None => out.push_text(text.clone(), mode),
					}
				},
			Inline::Code(code) =>
				if !code.is_empty() {
					let mode = TextMode { code: true, ..mode };
					match link {
						Some(url) => out.push_link(code.clone(), url, mode),
						None => out.push_text(code.clone(), mode),
					}
				},
			Inline::Strong(children) => collect_runs(children, TextMode { bold: true, ..mode }, link, out),
			Inline::Emph(children) => collect_runs(children, TextMode { italics: true, ..mode }, link, out),
			Inline::Strikethrough(children) => collect_runs(children, TextMode { strikethrough: true, ..mode }, link, out),
			Inline::Link { url, children } => collect_runs(children, mode, Some(url), out),
		}
	}
}

/// Flatten a list item's child blocks into one run container. Paragraphs and
/// nested lists contribute their runs in order; code blocks do not.
fn collect_runs_from_blocks(blocks: &[Block], mode: TextMode, link: Option<&str>, out: &mut TextContainer) {
	for block in blocks {
		match block {
			Block::Paragraph(inlines) | Block::Heading { content: inlines, .. } => collect_runs(inlines, mode, link, out),
			Block::List { items, .. } =>
				for item in items {
					collect_runs_from_blocks(item, mode, link, out);
				},
			Block::CodeBlock { .. } | Block::ThematicBreak | Block::Other(_) => {}
		}
	}
}

/// Plain-text projection of inline content, for heading flattening.
fn flatten_text(inlines: &[Inline]) -> String {
	let mut text = String::new();
	flatten_into(inlines, &mut text);
	text
}

fn flatten_into(inlines: &[Inline], out: &mut String) {
	for inline in inlines {
		match inline {
			Inline::Text(t) | Inline::Code(t) => out.push_str(t),
			Inline::Strong(children) | Inline::Emph(children) | Inline::Strikethrough(children) => flatten_into(children, out),
			Inline::Link { children, .. } => flatten_into(children, out),
		}
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::issue::{DocumentNode, TextElement};

	fn text_el(text: &str) -> TextElement {
		TextElement {
			text: text.into(),
			mode: TextMode::default(),
			link_url: None,
		}
	}

	fn styled_el(text: &str, mode: TextMode) -> TextElement {
		TextElement {
			text: text.into(),
			mode,
			link_url: None,
		}
	}

	#[test]
	fn empty_input_yields_no_issues() {
		assert_eq!(extract_issues("").unwrap(), vec![]);
		assert_eq!(extract_issues("\n\n\n").unwrap(), vec![]);
		// Breaks with no content around them are not sections either.
		assert_eq!(extract_issues("---\n\n---\n").unwrap(), vec![]);
	}

	#[test]
	fn single_bug_with_footer() {
		let markdown = "[Bug] Bug title\n\nTest para.\n\nTest list:\n\n- A\n- B\n\nEpic: 123\nLabels: label-1, label-2\n";
		let issues = extract_issues(markdown).unwrap();

		assert_eq!(issues.len(), 1);
		let issue = &issues[0];
		assert_eq!(issue.issue_type, IssueType::Bug);
		assert_eq!(issue.title, "Bug title");
		assert_eq!(issue.epic, Some(Epic { id: "123".into() }));
		assert_eq!(issue.labels, vec!["label-1".to_owned(), "label-2".to_owned()]);
		assert!(issue.id.is_none());
	}

	#[test]
	fn multiple_issues_split_on_breaks() {
		let markdown = "[Bug] Bug title\n\nTest para.\n\nEpic: 123\nLabels: label-1, label-2\n\n---\n\nA story\n\nHello world.\n\nEpic: 99\nLabels: label-3\n";
		let issues = extract_issues(markdown).unwrap();

		assert_eq!(issues.len(), 2);
		assert_eq!(issues[0].issue_type, IssueType::Bug);
		assert_eq!(issues[0].title, "Bug title");
		assert_eq!(issues[1].issue_type, IssueType::Story);
		assert_eq!(issues[1].title, "A story");
		assert_eq!(issues[1].epic, Some(Epic { id: "99".into() }));
		assert_eq!(issues[1].labels, vec!["label-3".to_owned()]);
	}

	#[rstest]
	#[case("[Bug] Bug title", IssueType::Bug, "Bug title")]
	#[case("[Chore] Chore title", IssueType::Chore, "Chore title")]
	#[case("[Task] Task title", IssueType::Chore, "Task title")]
	#[case("[Story] Story title", IssueType::Story, "Story title")]
	#[case("[Issue] Issue title", IssueType::Story, "Issue title")]
	#[case("[ Bug ] Padded title", IssueType::Bug, "Padded title")]
	#[case("Title", IssueType::Story, "Title")]
	fn issue_type_tokens(#[case] markdown: &str, #[case] expected_type: IssueType, #[case] expected_title: &str) {
		let issues = extract_issues(markdown).unwrap();
		assert_eq!(issues.len(), 1);
		assert_eq!(issues[0].issue_type, expected_type);
		assert_eq!(issues[0].title, expected_title);
	}

	#[test]
	fn unknown_issue_type_is_fatal() {
		let err = extract_issues("[Epic] Some title").unwrap_err();
		let ParseError::InSection { ordinal: 1, source } = err else {
			panic!("expected section error, got {err:?}");
		};
		assert!(matches!(*source, ParseError::UnknownIssueType(ref t) if t == "Epic"));
	}

	#[test]
	fn styled_header_is_fatal() {
		// More than one inline run in the header paragraph.
		let err = extract_issues("**[Bug]** Title").unwrap_err();
		let ParseError::InSection { source, .. } = err else {
			panic!("expected section error, got {err:?}");
		};
		assert!(matches!(*source, ParseError::MalformedHeader));
	}

	#[test]
	fn heading_as_header_is_fatal() {
		let err = extract_issues("# Not a paragraph").unwrap_err();
		let ParseError::InSection { source, .. } = err else {
			panic!("expected section error, got {err:?}");
		};
		assert!(matches!(*source, ParseError::MalformedHeader));
	}

	#[rstest]
	#[case("Title\n\nE: hello-world", "hello-world")]
	#[case("Title\n\nEpic: hello-world", "hello-world")]
	#[case("Title\n\nEpic: 1234", "1234")]
	#[case("Title\n\nEpic:   hello-world      ", "hello-world")]
	fn epic_footer(#[case] markdown: &str, #[case] expected: &str) {
		let issues = extract_issues(markdown).unwrap();
		assert_eq!(issues.len(), 1);
		assert_eq!(issues[0].epic, Some(Epic { id: expected.into() }));
	}

	#[rstest]
	#[case("Title\n\nL: label-1, label-2")]
	#[case("Title\n\nLabels: label-1, label-2")]
	#[case("Title\n\nLabels: label-1,label-2")]
	#[case("Title\n\nLabels:      label-1,     label-2    ")]
	fn labels_footer(#[case] markdown: &str) {
		let issues = extract_issues(markdown).unwrap();
		assert_eq!(issues.len(), 1);
		assert_eq!(issues[0].labels, vec!["label-1".to_owned(), "label-2".to_owned()]);
	}

	#[test]
	fn absent_metadata_is_not_an_error() {
		let issues = extract_issues("Title").unwrap();
		assert_eq!(issues[0].epic, None);
		assert!(issues[0].labels.is_empty());
		assert_eq!(issues[0].description, None);
	}

	#[test]
	fn unmatched_last_block_is_description_content() {
		let issues = extract_issues("[Bug] Bug title\n\nHello world.\n").unwrap();
		assert_eq!(issues[0].epic, None);
		assert!(issues[0].labels.is_empty());
		let doc = issues[0].description.as_ref().unwrap();
		assert_eq!(doc.nodes, vec![DocumentNode::Paragraph(TextContainer {
			elements: vec![text_el("Hello world.")],
		})]);
	}

	#[test]
	fn footer_only_section_has_empty_description() {
		// Header plus a consumed footer leaves an empty (not absent) document.
		let issues = extract_issues("Title\n\nEpic: 9").unwrap();
		assert_eq!(issues[0].description, Some(Document::default()));
	}

	#[test]
	fn leading_and_trailing_breaks_are_noops() {
		let body = "[Bug] Bug title\n\nTest para.\n\nEpic: 123\n";
		assert_eq!(extract_issues(&format!("---\n\n{body}")).unwrap().len(), 1);
		assert_eq!(extract_issues(&format!("{body}\n---\n")).unwrap().len(), 1);
		assert_eq!(extract_issues(&format!("---\n\n{body}\n---\n")).unwrap().len(), 1);
	}

	#[test]
	fn consecutive_breaks_collapse_to_one_boundary() {
		let markdown = "[Bug] Bug title\n\nTest para.\n\nEpic: 123\n\n---\n\n---\n---\n\nA story\n\nHello world.\n\nEpic: 99\n";
		assert_eq!(extract_issues(markdown).unwrap().len(), 2);
	}

	#[test]
	fn description_blocks_in_order() {
		let markdown = "[Bug] Bug title\n\nTest para.\n\nTest list:\n\n- A\n- B\n\nEpic: 123\n";
		let issues = extract_issues(markdown).unwrap();
		let doc = issues[0].description.as_ref().unwrap();

		assert_eq!(doc.nodes, vec![
			DocumentNode::Paragraph(TextContainer {
				elements: vec![text_el("Test para.")]
			}),
			DocumentNode::Paragraph(TextContainer {
				elements: vec![text_el("Test list:")]
			}),
			DocumentNode::List(ListData {
				ordered: false,
				items: vec![TextContainer { elements: vec![text_el("A")] }, TextContainer { elements: vec![text_el("B")] },],
			}),
		]);
	}

	#[test]
	fn styled_runs_keep_independent_marks() {
		let markdown = "[Bug] Bug title\n\nTest para **bold** and _italics_ and ~~strikethrough~~.\nSometimes, ~~**combinations**~~ of both. And some [links](https://google.com).\nAnd **[links with marks](https://google.com)**.\n\nEpic: 123\n";
		let issues = extract_issues(markdown).unwrap();
		let doc = issues[0].description.as_ref().unwrap();

		let DocumentNode::Paragraph(tc) = &doc.nodes[0] else {
			panic!("expected paragraph");
		};
		assert_eq!(tc.elements, vec![
			text_el("Test para "),
			styled_el("bold", TextMode { bold: true, ..Default::default() }),
			text_el(" and "),
			styled_el("italics", TextMode { italics: true, ..Default::default() }),
			text_el(" and "),
			styled_el("strikethrough", TextMode {
				strikethrough: true,
				..Default::default()
			}),
			text_el(".\nSometimes, "),
			styled_el("combinations", TextMode {
				bold: true,
				strikethrough: true,
				..Default::default()
			}),
			text_el(" of both. And some "),
			TextElement {
				text: "links".into(),
				mode: TextMode::default(),
				link_url: Some("https://google.com".into()),
			},
			text_el(".\nAnd "),
			TextElement {
				text: "links with marks".into(),
				mode: TextMode { bold: true, ..Default::default() },
				link_url: Some("https://google.com".into()),
			},
			text_el("."),
		]);
	}

	#[test]
	fn inline_code_forces_code_mode_for_one_run() {
		let markdown = "[Bug] Bug title\n\nTest para `with code`.\n\nEpic: 123";
		let issues = extract_issues(markdown).unwrap();
		let doc = issues[0].description.as_ref().unwrap();

		let DocumentNode::Paragraph(tc) = &doc.nodes[0] else {
			panic!("expected paragraph");
		};
		assert_eq!(tc.elements, vec![
			text_el("Test para "),
			styled_el("with code", TextMode { code: true, ..Default::default() }),
			text_el("."),
		]);
	}

	#[test]
	fn inline_code_inside_link_carries_both() {
		let markdown = "Title\n\nSee [`config`](https://example.com/docs) here.\n\nEpic: 1";
		let issues = extract_issues(markdown).unwrap();
		let doc = issues[0].description.as_ref().unwrap();

		let DocumentNode::Paragraph(tc) = &doc.nodes[0] else {
			panic!("expected paragraph");
		};
		assert_eq!(tc.elements[1], TextElement {
			text: "config".into(),
			mode: TextMode { code: true, ..Default::default() },
			link_url: Some("https://example.com/docs".into()),
		});
		// The code flag did not leak into the following run.
		assert_eq!(tc.elements[2], text_el(" here."));
	}

	#[test]
	fn code_blocks_pass_through() {
		let markdown = "[Bug] Bug title\n\nTest para with code block:\n\n```python\nx = 12\n```\n\nEpic: 123";
		let issues = extract_issues(markdown).unwrap();
		let doc = issues[0].description.as_ref().unwrap();

		assert_eq!(doc.nodes[1], DocumentNode::CodeBlock {
			language: "python".into(),
			code: "x = 12\n".into()
		});
	}

	#[test]
	fn headings_flatten_styling_to_plain_text() {
		let markdown = "[Bug] Bug title\n\n# Title\n\nHello world.\n\n## **Bold** Heading\n\nEpic: 123\n";
		let issues = extract_issues(markdown).unwrap();
		let doc = issues[0].description.as_ref().unwrap();

		assert_eq!(doc.nodes[0], DocumentNode::Heading {
			level: HeadingLevel::H1,
			text: "Title".into()
		});
		assert_eq!(doc.nodes[2], DocumentNode::Heading {
			level: HeadingLevel::H2,
			text: "Bold Heading".into()
		});
	}

	#[test]
	fn deep_headings_clamp_to_level_five() {
		let markdown = "[Bug] Bug title\n\n###### Very deep\n\nEpic: 123\n";
		let issues = extract_issues(markdown).unwrap();
		let doc = issues[0].description.as_ref().unwrap();

		assert_eq!(doc.nodes[0], DocumentNode::Heading {
			level: HeadingLevel::H5,
			text: "Very deep".into()
		});
	}

	#[test]
	fn ordered_list_items_in_order() {
		let markdown = "[Bug] Bug title\n\nAn ordered list:\n\n1. List item 1 \n1. List item 2 \n1. List item 3\n\nEpic: 123\n";
		let issues = extract_issues(markdown).unwrap();
		let doc = issues[0].description.as_ref().unwrap();

		assert_eq!(doc.nodes[1], DocumentNode::List(ListData {
			ordered: true,
			items: vec![
				TextContainer {
					elements: vec![text_el("List item 1")]
				},
				TextContainer {
					elements: vec![text_el("List item 2")]
				},
				TextContainer {
					elements: vec![text_el("List item 3")]
				},
			],
		}));
	}

	#[test]
	fn unsupported_block_in_description_is_fatal() {
		let err = extract_issues("[Bug] Bug title\n\n> a quote\n\nEpic: 123\n").unwrap_err();
		let ParseError::InSection { source, .. } = err else {
			panic!("expected section error, got {err:?}");
		};
		assert!(matches!(*source, ParseError::UnsupportedBlock("block quote")));
	}

	#[test]
	fn issue_count_matches_boundaries_plus_one() {
		let markdown = "One\n\n---\n\nTwo\n\n---\n\nThree\n";
		let issues = extract_issues(markdown).unwrap();
		assert_eq!(issues.len(), 3);
		let titles: Vec<_> = issues.iter().map(|i| i.title.as_str()).collect();
		assert_eq!(titles, vec!["One", "Two", "Three"]);
	}
}
