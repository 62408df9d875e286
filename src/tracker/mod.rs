//! Tracker submission service.
//!
//! Maps extracted issues onto Jira's wire format and submits them through
//! the bulk API, writing assigned keys back onto the issue list. The trait
//! exists so command code can be exercised against a mock tracker.

mod mapper;
pub use mapper::map_document;

use async_trait::async_trait;
use color_eyre::eyre::Result;

use crate::{
	config::JiraSettings,
	issue::{Issue, IssueType},
	jira::{JiraClient, JiraIssue, JiraIssueType},
};

#[async_trait]
pub trait Tracker: Send + Sync {
	/// Create the issues remotely, in order. Successfully created issues get
	/// their tracker key written back; per-issue rejections are logged and
	/// leave the key absent without failing the batch.
	async fn import_issues(&self, issues: &mut [Issue]) -> Result<()>;

	/// Verify that the tracker is reachable with the configured credentials.
	async fn test_connection(&self) -> Result<()>;
}

pub struct JiraTracker {
	client: JiraClient,
	project_key: String,
}

impl JiraTracker {
	pub fn new(settings: &JiraSettings, project_key: impl Into<String>) -> Self {
		Self {
			client: JiraClient::new(settings),
			project_key: project_key.into(),
		}
	}
}

#[async_trait]
impl Tracker for JiraTracker {
	async fn import_issues(&self, issues: &mut [Issue]) -> Result<()> {
		let jira_issues: Vec<JiraIssue> = issues.iter().map(to_jira_issue).collect();
		let outcomes = self.client.import_issues(&self.project_key, jira_issues).await?;

		for (issue, outcome) in issues.iter_mut().zip(outcomes) {
			match outcome {
				Ok(key) => issue.id = Some(key),
				Err(e) => tracing::error!(title = %issue.title, "failed to import issue: {e}"),
			}
		}
		Ok(())
	}

	async fn test_connection(&self) -> Result<()> {
		self.client.test().await
	}
}

fn to_jira_issue(issue: &Issue) -> JiraIssue {
	JiraIssue {
		issue_type: match issue.issue_type {
			IssueType::Bug => JiraIssueType::Bug,
			IssueType::Chore => JiraIssueType::Task,
			IssueType::Story => JiraIssueType::Story,
		},
		summary: issue.title.clone(),
		description: issue.description.as_ref().map(map_document),
		epic_key: issue.epic.as_ref().map(|epic| epic.id.clone()),
		labels: issue.labels.clone(),
	}
}
