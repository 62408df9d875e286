//! Jira REST API client.
//!
//! Speaks to the v3 REST API over HTTP basic auth (username + API token).
//! Only two endpoints are needed: bulk issue creation and the project list
//! used as a connection probe.

use color_eyre::eyre::{Result, bail};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{config::JiraSettings, jira::adf::AdfDoc};

/// Issue type names as the Jira project schema knows them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JiraIssueType {
	Task,
	Story,
	Bug,
}

impl JiraIssueType {
	pub fn name(self) -> &'static str {
		match self {
			JiraIssueType::Task => "Task",
			JiraIssueType::Story => "Story",
			JiraIssueType::Bug => "Bug",
		}
	}
}

/// One issue in wire form, ready for submission.
#[derive(Clone, Debug, PartialEq)]
pub struct JiraIssue {
	pub issue_type: JiraIssueType,
	pub summary: String,
	pub description: Option<AdfDoc>,
	pub epic_key: Option<String>,
	pub labels: Vec<String>,
}

/// Why one issue of a bulk request was not created. The request as a whole
/// can still succeed for its siblings.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ImportError {
	#[error("jira rejected the issue: {0}")]
	Rejected(String),
	#[error("jira returned no result for the issue")]
	MissingResult,
}

/// Per-issue outcome of a bulk import, index-aligned with the submitted
/// issue sequence.
pub type ImportOutcome = Result<String, ImportError>;

pub struct JiraClient {
	http: Client,
	host: String,
	username: String,
	token: String,
}

impl JiraClient {
	pub fn new(settings: &JiraSettings) -> Self {
		Self {
			http: Client::new(),
			host: settings.host.trim_end_matches('/').to_owned(),
			username: settings.username.clone(),
			token: settings.token.clone(),
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}/{}", self.host, path.trim_start_matches('/'))
	}

	/// Create a batch of issues through the bulk endpoint. Jira answers 201
	/// when everything was created and 400 when some issues were rejected;
	/// both carry a response body that maps back onto the request order.
	pub async fn import_issues(&self, project_key: &str, issues: Vec<JiraIssue>) -> Result<Vec<ImportOutcome>> {
		if issues.is_empty() {
			return Ok(Vec::new());
		}

		let count = issues.len();
		let body = BulkRequest {
			issue_updates: issues.into_iter().map(|issue| IssueUpdate::new(project_key, issue)).collect(),
		};

		let res = self
			.http
			.post(self.url("/rest/api/3/issue/bulk"))
			.basic_auth(&self.username, Some(&self.token))
			.header("Accept", "application/json")
			.json(&body)
			.send()
			.await?;

		let status = res.status().as_u16();
		if status != 201 && status != 400 {
			let status = res.status();
			let body = res.text().await.unwrap_or_default();
			tracing::error!(%status, body, "jira bulk create failed");
			bail!("failed to create issues: {status}");
		}

		let response = res.json::<BulkResponse>().await?;
		for error in &response.errors {
			tracing::warn!(index = error.index, detail = %error.element_errors, "jira failed to process issue");
		}
		Ok(merge_bulk_response(count, response))
	}

	/// Probe the API by listing projects.
	pub async fn test(&self) -> Result<()> {
		let res = self
			.http
			.get(self.url("/rest/api/3/project"))
			.basic_auth(&self.username, Some(&self.token))
			.header("Accept", "application/json")
			.send()
			.await?;

		if !res.status().is_success() {
			let status = res.status();
			let body = res.text().await.unwrap_or_default();
			tracing::error!(%status, body, "jira connection test failed");
			bail!("failed to test the jira api connection: {status}");
		}
		Ok(())
	}
}

#[derive(Serialize)]
struct BulkRequest {
	#[serde(rename = "issueUpdates")]
	issue_updates: Vec<IssueUpdate>,
}

#[derive(Serialize)]
struct IssueUpdate {
	fields: IssueFields,
}

impl IssueUpdate {
	fn new(project_key: &str, issue: JiraIssue) -> Self {
		Self {
			fields: IssueFields {
				project: KeyRef { key: project_key.to_owned() },
				issuetype: NameRef {
					name: issue.issue_type.name(),
				},
				summary: issue.summary,
				description: issue.description,
				parent: issue.epic_key.map(|key| KeyRef { key }),
				labels: issue.labels,
			},
		}
	}
}

#[derive(Serialize)]
struct IssueFields {
	project: KeyRef,
	issuetype: NameRef,
	summary: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	description: Option<AdfDoc>,
	#[serde(skip_serializing_if = "Option::is_none")]
	parent: Option<KeyRef>,
	labels: Vec<String>,
}

#[derive(Serialize)]
struct KeyRef {
	key: String,
}

#[derive(Serialize)]
struct NameRef {
	name: &'static str,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
	#[serde(default)]
	issues: Vec<CreatedIssue>,
	#[serde(default)]
	errors: Vec<BulkError>,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
	key: String,
}

#[derive(Debug, Deserialize)]
struct BulkError {
	#[serde(rename = "failedElementNumber")]
	index: usize,
	#[serde(rename = "elementErrors", default)]
	element_errors: serde_json::Value,
}

/// Fold Jira's parallel `issues`/`errors` arrays into one outcome per
/// submitted issue, in submission order. Created keys are handed out in
/// order to the slots that did not fail.
fn merge_bulk_response(count: usize, response: BulkResponse) -> Vec<ImportOutcome> {
	let mut outcomes: Vec<Option<ImportOutcome>> = vec![None; count];
	for error in response.errors {
		if let Some(slot) = outcomes.get_mut(error.index) {
			*slot = Some(Err(ImportError::Rejected(error.element_errors.to_string())));
		}
	}

	let mut keys = response.issues.into_iter();
	for slot in outcomes.iter_mut() {
		if slot.is_none() {
			*slot = keys.next().map(|created| Ok(created.key));
		}
	}

	outcomes.into_iter().map(|slot| slot.unwrap_or(Err(ImportError::MissingResult))).collect()
}
