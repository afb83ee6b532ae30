use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Issue metadata resolved from a tracker.
pub struct IssueDetails {
    pub key: String,
    pub title: String,
    /// Canonical browse URL of the issue.
    pub url: String,
}

#[derive(Debug, Deserialize)]
/// Subset of the Jira `GET /rest/api/2/issue/{key}` response.
pub struct JiraIssue {
    pub key: String,
    pub fields: JiraIssueFields,
}

#[derive(Debug, Deserialize)]
pub struct JiraIssueFields {
    pub summary: Option<String>,
}
