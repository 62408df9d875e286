//! Connection settings, threaded explicitly into the client constructor.

use color_eyre::eyre::{Result, WrapErr};
use url::Url;

/// Jira API endpoint and credentials.
#[derive(Clone, Debug)]
pub struct JiraSettings {
	pub host: String,
	pub username: String,
	pub token: String,
}

impl JiraSettings {
	/// Validate the host is an absolute URL before any request is built.
	pub fn new(host: impl Into<String>, username: impl Into<String>, token: impl Into<String>) -> Result<Self> {
		let host = host.into();
		Url::parse(&host).wrap_err_with(|| format!("invalid jira api host '{host}'"))?;
		Ok(Self {
			host,
			username: username.into(),
			token: token.into(),
		})
	}
}
