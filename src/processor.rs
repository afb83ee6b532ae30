//! Changelog processors.
pub mod jira;

pub use jira::{IssueKeyMatcher, JiraFilterProcessor};
