//! CLI argument parsing.
use clap::Parser;
use secrecy::SecretString;
use std::env;

use crate::config::Config;

/// Environment variable consulted when `--jira-token` is not given.
pub const JIRA_TOKEN_ENV: &str = "JIRA_TOKEN";

/// Generate a changelog from git history, annotated with referenced Jira
/// issues.
///
/// Flags override values from the configuration file.
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long)]
    /// Path to the git repository. Defaults to the current directory.
    pub repo: Option<String>,

    #[arg(long)]
    /// Exclusive start revision (sha, branch, tag or expression).
    pub from_rev: Option<String>,

    #[arg(long)]
    /// Inclusive end revision. Defaults to HEAD.
    pub to_rev: Option<String>,

    #[arg(long)]
    /// Jira base URL, e.g. https://issues.example.com.
    pub jira_base_url: Option<String>,

    #[arg(long)]
    /// Jira project prefixes, comma or space separated (e.g. "ABC,XYZ").
    pub jira_prefix: Option<String>,

    #[arg(long)]
    /// Write the changelog to this file instead of stdout.
    pub output_file: Option<String>,

    #[arg(long)]
    /// Tera template used instead of the plain text format.
    pub template: Option<String>,

    #[arg(long)]
    /// Jira user for basic authentication.
    pub jira_username: Option<String>,

    #[arg(long, default_value = "")]
    /// Jira API token. Falls back to JIRA_TOKEN env var.
    pub jira_token: String,

    #[arg(long)]
    /// Maximum number of concurrent issue lookups.
    pub max_concurrent_lookups: Option<usize>,

    #[arg(long)]
    /// Timeout of a single issue lookup in seconds.
    pub lookup_timeout_secs: Option<u64>,

    #[arg(long)]
    /// Configuration file. Defaults to ./gitchangelog.toml when present.
    pub config: Option<String>,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

impl Args {
    /// Overlay the flags that were given onto `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(repo) = &self.repo {
            config.repo = repo.clone();
        }
        if self.from_rev.is_some() {
            config.from_rev = self.from_rev.clone();
        }
        if self.to_rev.is_some() {
            config.to_rev = self.to_rev.clone();
        }
        if self.output_file.is_some() {
            config.output_file = self.output_file.clone();
        }
        if self.template.is_some() {
            config.template = self.template.clone();
        }
        if let Some(base_url) = &self.jira_base_url {
            config.jira.base_url = base_url.clone();
        }
        if let Some(prefixes) = &self.jira_prefix {
            config.jira.prefixes = prefixes.clone();
        }
        if self.jira_username.is_some() {
            config.jira.username = self.jira_username.clone();
        }
        if let Some(max) = self.max_concurrent_lookups {
            config.jira.max_concurrent_lookups = max;
        }
        if let Some(secs) = self.lookup_timeout_secs {
            config.jira.lookup_timeout_secs = secs;
        }
    }

    /// Jira API token from the flag or the environment.
    pub fn jira_token(&self) -> Option<SecretString> {
        self.jira_token_with(|name| env::var(name).ok())
    }

    fn jira_token_with<F>(&self, lookup: F) -> Option<SecretString>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut token = self.jira_token.clone();

        if token.is_empty()
            && let Some(env_token) = lookup(JIRA_TOKEN_ENV)
        {
            token = env_token;
        }

        if token.is_empty() {
            return None;
        }

        Some(SecretString::from(token))
    }
}
