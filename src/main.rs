use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use mdjira::{JiraSettings, JiraTracker, Tracker, extract_issues};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[command(flatten)]
	jira: JiraArgs,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Args)]
struct JiraArgs {
	/// Jira host to use, e.g. https://yourcompany.atlassian.net
	#[arg(long, short = 'a')]
	api: String,
	/// Username to use to connect to Jira
	#[arg(long, short = 'u')]
	username: String,
	/// API token to use to connect to Jira
	#[arg(long, short = 't')]
	token: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Imports a markdown file as Jira issues
	Import {
		/// Jira project key
		#[arg(long, short = 'p')]
		project_key: String,
		/// Path to the markdown file
		path: PathBuf,
	},
	/// Tests the Jira connection
	TestConnection,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let cli = Cli::parse();
	let settings = JiraSettings::new(cli.jira.api, cli.jira.username, cli.jira.token)?;

	match cli.command {
		Commands::Import { project_key, path } => {
			let content = std::fs::read_to_string(&path).wrap_err_with(|| format!("failed to read markdown file '{}'", path.display()))?;
			let mut issues = extract_issues(&content).wrap_err("failed to parse markdown file")?;
			if issues.is_empty() {
				println!("No issues were found");
				return Ok(());
			}
			println!("Found {} issues in the markdown file", issues.len());

			let tracker = JiraTracker::new(&settings, project_key);
			tracker.import_issues(&mut issues).await.wrap_err("failed to import issues")?;

			println!("Imported issues:");
			for issue in &issues {
				// - Task (TEST-124): Subject
				match &issue.id {
					Some(id) => println!("- {} ({id}): {}", issue.issue_type, issue.title),
					None => println!("- {} (FAILED): {}", issue.issue_type, issue.title),
				}
			}
		}
		Commands::TestConnection => {
			let tracker = JiraTracker::new(&settings, "");
			tracker.test_connection().await.wrap_err("failed to connect to jira")?;
			println!("OK");
		}
	}
	Ok(())
}
