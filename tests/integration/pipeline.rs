//! End-to-end: markdown text in, Jira-ready ADF out, through the public API.

use mdjira::{IssueType, extract_issues, map_document};
use serde_json::json;

const MARKDOWN: &str = r#"[Bug] Payment form rejects valid cards

## Steps

1. Open the **checkout** page
2. Enter a `4111` test card

See [the docs](https://example.com/docs) for ~~more~~ details.

```sh
curl -fsS https://api.example.com/health
```

Epic: PAY-12
Labels: payments, checkout

---

[Chore] Update CI image
"#;

#[test]
fn markdown_file_to_adf() {
	let issues = extract_issues(MARKDOWN).unwrap();
	assert_eq!(issues.len(), 2);

	let bug = &issues[0];
	assert_eq!(bug.issue_type, IssueType::Bug);
	assert_eq!(bug.title, "Payment form rejects valid cards");
	assert_eq!(bug.epic.as_ref().unwrap().id, "PAY-12");
	assert_eq!(bug.labels, vec!["payments".to_owned(), "checkout".to_owned()]);

	let adf = map_document(bug.description.as_ref().unwrap());
	assert_eq!(
		serde_json::to_value(&adf).unwrap(),
		json!({
			"version": 1,
			"type": "doc",
			"content": [
				{
					"type": "heading",
					"attrs": { "level": 2 },
					"content": [{ "type": "text", "text": "Steps" }]
				},
				{
					"type": "orderedList",
					"content": [
						{
							"type": "listItem",
							"content": [{
								"type": "paragraph",
								"content": [
									{ "type": "text", "text": "Open the " },
									{ "type": "text", "text": "checkout", "marks": [{ "type": "strong" }] },
									{ "type": "text", "text": " page" }
								]
							}]
						},
						{
							"type": "listItem",
							"content": [{
								"type": "paragraph",
								"content": [
									{ "type": "text", "text": "Enter a " },
									{ "type": "text", "text": "4111", "marks": [{ "type": "code" }] },
									{ "type": "text", "text": " test card" }
								]
							}]
						}
					]
				},
				{
					"type": "paragraph",
					"content": [
						{ "type": "text", "text": "See " },
						{
							"type": "text",
							"text": "the docs",
							"marks": [{ "type": "link", "attrs": { "href": "https://example.com/docs" } }]
						},
						{ "type": "text", "text": " for " },
						{ "type": "text", "text": "more", "marks": [{ "type": "strike" }] },
						{ "type": "text", "text": " details." }
					]
				},
				{
					"type": "codeBlock",
					"attrs": { "language": "sh" },
					"content": [{ "type": "text", "text": "curl -fsS https://api.example.com/health\n" }]
				}
			]
		})
	);

	let chore = &issues[1];
	assert_eq!(chore.issue_type, IssueType::Chore);
	assert_eq!(chore.title, "Update CI image");
	assert!(chore.description.is_none());
	assert!(chore.epic.is_none());
	assert!(chore.labels.is_empty());
}

#[test]
fn bad_section_reports_its_ordinal() {
	let markdown = "First issue\n\n---\n\n[Nonsense] Second issue\n";
	let err = extract_issues(markdown).unwrap_err();
	assert_eq!(err.to_string(), "failed to parse issue 2 in markdown file");
}
