//! Implements the IssueTracker trait for Jira
use async_trait::async_trait;
use log::*;
use reqwest::{
    Client, Url,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    error::{ChangelogError, Result},
    tracker::{
        traits::IssueTracker,
        types::{IssueDetails, JiraIssue},
    },
};

/// Basic-auth credentials for Jira (username + API token).
#[derive(Debug, Clone)]
pub struct JiraCredentials {
    pub username: String,
    pub token: SecretString,
}

/// Jira REST client resolving issue keys to their summaries.
pub struct JiraTracker {
    base_url: String,
    client: Client,
    credentials: Option<JiraCredentials>,
}

impl JiraTracker {
    /// Create a client for the Jira instance at `base_url`.
    pub fn new(
        base_url: &str,
        credentials: Option<JiraCredentials>,
    ) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        // validate early so a typo fails the run instead of every lookup
        Url::parse(&base_url).map_err(|err| {
            ChangelogError::invalid_config(format!(
                "invalid jira base url '{base_url}': {err}"
            ))
        })?;

        let mut headers = HeaderMap::new();
        headers.append(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("gitchangelog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            client,
            credentials,
        })
    }

    fn issue_url(&self, key: &str) -> Result<Url> {
        let mut url =
            Url::parse(&format!("{}/rest/api/2/issue/{key}", self.base_url))?;
        url.query_pairs_mut().append_pair("fields", "summary");
        Ok(url)
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.base_url)
    }
}

#[async_trait]
impl IssueTracker for JiraTracker {
    async fn lookup(&self, key: &str) -> Result<IssueDetails> {
        let url = self.issue_url(key)?;
        debug!("looking up issue {key}: {url}");

        let mut builder = self.client.get(url);
        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(
                &credentials.username,
                Some(credentials.token.expose_secret()),
            );
        }

        let request = builder
            .build()
            .map_err(|err| ChangelogError::issue_lookup(key, err.to_string()))?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|err| ChangelogError::issue_lookup(key, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChangelogError::issue_lookup(
                key,
                format!("unexpected status {status}"),
            ));
        }

        let issue: JiraIssue = response.json().await.map_err(|err| {
            ChangelogError::issue_lookup(key, format!("malformed response: {err}"))
        })?;

        let title = issue.fields.summary.ok_or_else(|| {
            ChangelogError::issue_lookup(key, "response has no summary field")
        })?;

        // moved issues answer with their new key
        let url = self.browse_url(&issue.key);

        Ok(IssueDetails {
            key: issue.key,
            title,
            url,
        })
    }
}
