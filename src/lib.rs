//! Generate a changelog from git history and annotate it with the Jira
//! issues referenced in commit messages.
pub mod changelog;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod processor;
pub mod repo;
pub mod tracker;

pub use error::{ChangelogError, Result};

#[cfg(test)]
pub mod test_helpers;
