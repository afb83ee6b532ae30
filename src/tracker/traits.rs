//! Traits related to issue trackers
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{error::Result, tracker::types::IssueDetails};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch metadata for a single issue key.
    ///
    /// Any failure, including "not found", is reported as
    /// [`crate::error::ChangelogError::IssueLookup`].
    async fn lookup(&self, key: &str) -> Result<IssueDetails>;
}
