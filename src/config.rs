//! Configuration loading and parsing for `gitchangelog.toml` files.
//!
//! File values are overridden by CLI flags; see [`crate::cli::Args`].
use serde::Deserialize;
use std::{path::Path, time::Duration};

use crate::error::{ChangelogError, Result};

pub mod env;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "gitchangelog.toml";
/// Default upper bound on in-flight issue lookups.
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 4;
/// Default per-lookup timeout in seconds.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Jira connection settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)] // Use default for missing fields
pub struct JiraConfig {
    /// Jira base URL (e.g. "https://issues.example.com").
    pub base_url: String,
    /// Project prefixes, comma and/or whitespace separated.
    pub prefixes: String,
    /// Username for basic auth. The token never comes from this file.
    pub username: Option<String>,
    /// Maximum number of concurrent issue lookups.
    pub max_concurrent_lookups: usize,
    /// Timeout for a single issue lookup in seconds.
    pub lookup_timeout_secs: u64,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: "".to_string(),
            prefixes: "".to_string(),
            username: None,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            lookup_timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
        }
    }
}

/// Root configuration structure for `gitchangelog.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Repository path.
    pub repo: String,
    /// Exclusive start revision.
    pub from_rev: Option<String>,
    /// Inclusive end revision, HEAD when absent.
    pub to_rev: Option<String>,
    /// Output file; stdout when absent.
    pub output_file: Option<String>,
    /// Tera template used instead of the plain text format.
    pub template: Option<String>,
    /// Jira settings.
    pub jira: JiraConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: ".".to_string(),
            from_rev: None,
            to_rev: None,
            output_file: None,
            template: None,
            jira: JiraConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] in the
    /// current directory when no path is given.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        match std::fs::read_to_string(path) {
            Ok(content) => {
                log::debug!("loading configuration from {}", path.display());
                Ok(toml::from_str(&content)?)
            }
            Err(err) if required => Err(ChangelogError::invalid_config(format!(
                "unable to read config file {}: {err}",
                path.display()
            ))),
            Err(_) => {
                log::debug!("configuration file not found: using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Expand `$VAR` / `${VAR}` placeholders in the revision, Jira and
    /// output settings.
    pub fn expand_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let expand = |value: &mut String| *value = env::expand(value, &lookup);

        if let Some(v) = self.from_rev.as_mut() {
            expand(v);
        }
        if let Some(v) = self.to_rev.as_mut() {
            expand(v);
        }
        if let Some(v) = self.output_file.as_mut() {
            expand(v);
        }
        expand(&mut self.jira.base_url);
        expand(&mut self.jira.prefixes);
    }

    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig::new(&self.jira.base_url, &self.jira.prefixes)
    }

    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions::new(
            self.jira.max_concurrent_lookups,
            Duration::from_secs(self.jira.lookup_timeout_secs),
        )
    }
}

/// Settings of the Jira issue processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Base URL without trailing slash.
    pub jira_base_url: String,
    /// Ordered, de-duplicated project prefixes.
    pub project_prefixes: Vec<String>,
}

impl ProcessorConfig {
    pub fn new(jira_base_url: &str, prefixes: &str) -> Self {
        Self {
            jira_base_url: jira_base_url.trim().trim_end_matches('/').to_string(),
            project_prefixes: parse_prefixes(prefixes),
        }
    }

    /// False when no prefixes or no base URL are configured.
    pub fn is_enabled(&self) -> bool {
        !self.jira_base_url.is_empty() && !self.project_prefixes.is_empty()
    }

    /// Human facing URL of an issue.
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.jira_base_url)
    }
}

/// Bounds applied to issue lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    /// Maximum number of in-flight lookups, at least 1.
    pub max_concurrent: usize,
    /// Per-lookup timeout.
    pub timeout: Duration,
}

impl LookupOptions {
    pub fn new(max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            timeout,
        }
    }
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_CONCURRENT_LOOKUPS,
            Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        )
    }
}

/// Split a prefix list on commas and whitespace.
///
/// Items are trimmed, empty items dropped and duplicates removed keeping the
/// first occurrence.
pub fn parse_prefixes(raw: &str) -> Vec<String> {
    let mut prefixes: Vec<String> = vec![];

    for item in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let item = item.trim();
        if !item.is_empty() && !prefixes.iter().any(|p| p == item) {
            prefixes.push(item.to_string());
        }
    }

    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults() {
        let config = Config::default();
        assert_eq!(config.repo, ".");
        assert_eq!(
            config.jira.max_concurrent_lookups,
            DEFAULT_MAX_CONCURRENT_LOOKUPS
        );
        assert!(!config.processor_config().is_enabled());
    }

    #[test]
    fn parses_toml_with_partial_fields() {
        let config: Config = toml::from_str(
            r#"
            from_rev = "v1.0.0"

            [jira]
            base_url = "https://issues.example.com/"
            prefixes = "ABC, XYZ"
            "#,
        )
        .unwrap();

        assert_eq!(config.repo, ".");
        assert_eq!(config.from_rev.as_deref(), Some("v1.0.0"));
        assert_eq!(config.jira.lookup_timeout_secs, DEFAULT_LOOKUP_TIMEOUT_SECS);

        let processor = config.processor_config();
        assert_eq!(processor.jira_base_url, "https://issues.example.com");
        assert_eq!(processor.project_prefixes, vec!["ABC", "XYZ"]);
        assert!(processor.is_enabled());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = Config::load(Some(&tmp.path().join("missing.toml")));
        assert!(matches!(result, Err(ChangelogError::InvalidConfig(_))));
    }

    #[test]
    fn loads_explicit_config_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        std::fs::write(&path, "repo = \"/srv/repo\"\n[jira]\nprefixes = \"OPS\"\n")
            .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.repo, "/srv/repo");
        assert_eq!(config.jira.prefixes, "OPS");
    }

    #[test]
    fn parse_prefixes_handles_mixed_delimiters() {
        assert_eq!(parse_prefixes("ABC,XYZ"), vec!["ABC", "XYZ"]);
        assert_eq!(parse_prefixes(" ABC , XYZ "), vec!["ABC", "XYZ"]);
        assert_eq!(parse_prefixes("ABC XYZ\tOPS"), vec!["ABC", "XYZ", "OPS"]);
        assert_eq!(parse_prefixes("ABC,,XYZ,"), vec!["ABC", "XYZ"]);
        assert_eq!(parse_prefixes("ABC,XYZ,ABC"), vec!["ABC", "XYZ"]);
        assert!(parse_prefixes("  ,  ").is_empty());
    }

    #[test]
    fn processor_config_degrades_without_base_url() {
        let config = ProcessorConfig::new("   ", "ABC");
        assert!(!config.is_enabled());

        let config = ProcessorConfig::new("https://issues.example.com", "");
        assert!(!config.is_enabled());
    }

    #[test]
    fn browse_url_joins_without_double_slash() {
        let config = ProcessorConfig::new("https://issues.example.com/", "ABC");
        assert_eq!(
            config.browse_url("ABC-1"),
            "https://issues.example.com/browse/ABC-1"
        );
    }

    #[test]
    fn lookup_options_clamp_concurrency() {
        let options = LookupOptions::new(0, Duration::from_secs(1));
        assert_eq!(options.max_concurrent, 1);
    }

    #[test]
    fn expand_env_substitutes_known_variables() {
        let mut config = Config {
            from_rev: Some("${PREVIOUS_TAG}".into()),
            output_file: Some("$WORKSPACE/CHANGES.txt".into()),
            jira: JiraConfig {
                base_url: "$JIRA_URL".into(),
                prefixes: "ABC,$EXTRA".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        config.expand_env(|name| match name {
            "PREVIOUS_TAG" => Some("v1.2.0".into()),
            "WORKSPACE" => Some("/build".into()),
            "JIRA_URL" => Some("https://issues.example.com".into()),
            _ => None,
        });

        assert_eq!(config.from_rev.as_deref(), Some("v1.2.0"));
        assert_eq!(config.output_file.as_deref(), Some("/build/CHANGES.txt"));
        assert_eq!(config.jira.base_url, "https://issues.example.com");
        assert_eq!(config.jira.prefixes, "ABC,$EXTRA");
    }
}
