//! One-way projection of the canonical document model into ADF.
//!
//! The projection is deterministic and order-preserving. Matching over
//! [`DocumentNode`] is exhaustive, so adding a model variant without a
//! mapping fails to compile instead of being silently dropped.

use crate::{
	issue::{Document, DocumentNode, TextContainer, TextElement},
	jira::{AdfDoc, AdfMark, AdfNode, CodeBlockAttrs, HeadingAttrs, LinkAttrs},
};

pub fn map_document(doc: &Document) -> AdfDoc {
	let mut adf = AdfDoc::new();
	for node in &doc.nodes {
		let mapped = match node {
			DocumentNode::Paragraph(tc) => AdfNode::Paragraph { content: map_runs(tc) },
			DocumentNode::Heading { level, text } => AdfNode::Heading {
				attrs: HeadingAttrs { level: level.as_u8() },
				content: vec![AdfNode::plain_text(text.clone())],
			},
			DocumentNode::List(list) => {
				let items = list
					.items
					.iter()
					.map(|item| AdfNode::ListItem {
						content: vec![AdfNode::Paragraph { content: map_runs(item) }],
					})
					.collect();
				if list.ordered { AdfNode::OrderedList { content: items } } else { AdfNode::BulletList { content: items } }
			}
			DocumentNode::CodeBlock { language, code } => AdfNode::CodeBlock {
				attrs: CodeBlockAttrs { language: language.clone() },
				content: vec![AdfNode::plain_text(code.clone())],
			},
		};
		adf.content.push(mapped);
	}
	adf
}

fn map_runs(tc: &TextContainer) -> Vec<AdfNode> {
	tc.elements.iter().map(map_run).collect()
}

/// Marks are emitted in a fixed canonical order (strong, em, code, strike)
/// with the link mark, when present, always last.
fn map_run(element: &TextElement) -> AdfNode {
	let mut marks = Vec::new();
	if element.mode.bold {
		marks.push(AdfMark::Strong);
	}
	if element.mode.italics {
		marks.push(AdfMark::Em);
	}
	if element.mode.code {
		marks.push(AdfMark::Code);
	}
	if element.mode.strikethrough {
		marks.push(AdfMark::Strike);
	}
	if let Some(href) = &element.link_url {
		marks.push(AdfMark::Link {
			attrs: LinkAttrs { href: href.clone() },
		});
	}
	AdfNode::Text {
		text: element.text.clone(),
		marks,
	}
}
