//! Issue tracker collaborators used to resolve issue keys.
pub mod jira;
pub mod traits;
pub mod types;

pub use jira::{JiraCredentials, JiraTracker};
pub use traits::IssueTracker;
pub use types::IssueDetails;
