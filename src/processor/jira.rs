//! Jira issue reference extraction and resolution.
//!
//! The processor scans every commit message for keys of the configured
//! projects (`ABC-123`), resolves each distinct key once through an
//! [`IssueTracker`] and attaches the ordered references to the entry under
//! [`JIRA_ISSUES_ANNOTATION`].
//!
//! Lookup failures never fail the run: the reference is kept with
//! `resolved = false` and a browse URL built from the configured base URL.
use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use log::*;
use regex::Regex;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;

use crate::{
    changelog::{
        Annotation, Changelog, IssueReference, JIRA_ISSUES_ANNOTATION,
        traits::Processor,
    },
    config::{LookupOptions, ProcessorConfig},
    error::{ChangelogError, Result},
    tracker::{IssueDetails, IssueTracker},
};

/// Finds issue keys of a fixed set of project prefixes in free text.
#[derive(Debug, Clone)]
pub struct IssueKeyMatcher {
    patterns: Vec<Regex>,
}

impl IssueKeyMatcher {
    /// Build a matcher for `prefixes`, or `None` when the list is empty.
    ///
    /// A key is `<prefix>-<alphanumerics>`, case-sensitive, and the prefix
    /// must not be the tail of a longer word.
    pub fn new(prefixes: &[String]) -> Result<Option<Self>> {
        if prefixes.is_empty() {
            return Ok(None);
        }

        let patterns = prefixes
            .iter()
            .map(|p| Regex::new(&format!(r"\b{}-[A-Za-z0-9]+", regex::escape(p))))
            .collect::<std::result::Result<Vec<Regex>, regex::Error>>()?;

        Ok(Some(Self { patterns }))
    }

    /// Distinct keys in order of first occurrence.
    ///
    /// Every prefix is scanned on its own and matches may overlap, so
    /// `XYZ-ABC-12` yields both `XYZ-ABC` and `ABC-12`.
    pub fn find_keys(&self, text: &str) -> Vec<String> {
        let mut found = self
            .patterns
            .iter()
            .flat_map(|pattern| overlapping_matches(pattern, text))
            .collect::<Vec<(usize, &str)>>();

        // stable: at equal offsets the configured prefix order wins
        found.sort_by_key(|(start, _)| *start);

        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter(|(_, key)| seen.insert(*key))
            .map(|(_, key)| key.to_string())
            .collect()
    }
}

/// All matches of `pattern`, restarting one character after each match
/// start instead of after its end.
fn overlapping_matches<'t>(pattern: &Regex, text: &'t str) -> Vec<(usize, &'t str)> {
    let mut matches = vec![];
    let mut start = 0;

    while let Some(m) = pattern.find_at(text, start) {
        matches.push((m.start(), m.as_str()));
        start = m.start()
            + text[m.start()..].chars().next().map_or(1, char::len_utf8);
    }

    matches
}

/// Processor attaching Jira issue references to changelog entries.
pub struct JiraFilterProcessor {
    config: ProcessorConfig,
    tracker: Arc<dyn IssueTracker>,
    options: LookupOptions,
}

impl JiraFilterProcessor {
    pub fn new(
        config: ProcessorConfig,
        tracker: Arc<dyn IssueTracker>,
        options: LookupOptions,
    ) -> Self {
        Self {
            config,
            tracker,
            options,
        }
    }

    /// Resolve every key concurrently, at most `max_concurrent` at a time.
    ///
    /// Failed and timed-out lookups map to `None`. Returns `Cancelled` as
    /// soon as the token fires; in-flight requests are dropped.
    async fn resolve_keys(
        &self,
        keys: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<HashMap<String, Option<IssueDetails>>> {
        let tracker = &self.tracker;
        let timeout = self.options.timeout;

        let lookups = stream::iter(keys)
            .map(move |key| async move {
                let result = tokio::time::timeout(timeout, tracker.lookup(&key)).await;

                let details = match result {
                    Ok(Ok(details)) => Some(details),
                    Ok(Err(err)) => {
                        warn!("unable to resolve issue {key}: {err}");
                        None
                    }
                    Err(_) => {
                        warn!(
                            "unable to resolve issue {key}: timed out after {}ms",
                            timeout.as_millis()
                        );
                        None
                    }
                };

                (key, details)
            })
            .buffer_unordered(self.options.max_concurrent)
            .collect::<HashMap<String, Option<IssueDetails>>>();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ChangelogError::Cancelled),
            resolved = lookups => Ok(resolved),
        }
    }

    fn to_reference(
        &self,
        key: &str,
        details: Option<&IssueDetails>,
    ) -> IssueReference {
        match details {
            Some(details) => IssueReference {
                key: key.to_string(),
                url: details.url.clone(),
                title: Some(details.title.clone()),
                resolved: true,
            },
            None => IssueReference {
                key: key.to_string(),
                url: self.config.browse_url(key),
                title: None,
                resolved: false,
            },
        }
    }
}

#[async_trait]
impl Processor for JiraFilterProcessor {
    fn name(&self) -> &'static str {
        "jira-filter"
    }

    async fn process(
        &self,
        mut changelog: Changelog,
        cancel: &CancellationToken,
    ) -> Result<Changelog> {
        if self.config.jira_base_url.is_empty() {
            info!("jira base url not configured: skipping issue extraction");
            return Ok(changelog);
        }

        let Some(matcher) = IssueKeyMatcher::new(&self.config.project_prefixes)?
        else {
            info!("no jira project prefixes configured: skipping issue extraction");
            return Ok(changelog);
        };

        // entries already annotated by an earlier pass are left alone
        let matches = changelog
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.has_annotation(JIRA_ISSUES_ANNOTATION))
            .map(|(index, entry)| (index, matcher.find_keys(&entry.commit.message)))
            .filter(|(_, keys)| !keys.is_empty())
            .collect::<Vec<(usize, Vec<String>)>>();

        let mut unique_keys = vec![];
        let mut seen = HashSet::new();
        for key in matches.iter().flat_map(|(_, keys)| keys) {
            if seen.insert(key.as_str()) {
                unique_keys.push(key.clone());
            }
        }

        info!(
            "found {} distinct jira issues in {} of {} commits",
            unique_keys.len(),
            matches.len(),
            changelog.len()
        );

        let resolved = self.resolve_keys(unique_keys, cancel).await?;

        let unresolved = resolved.values().filter(|d| d.is_none()).count();
        if unresolved > 0 {
            warn!("{unresolved} jira issues could not be resolved");
        }

        for (index, keys) in matches {
            let references = keys
                .iter()
                .map(|key| {
                    self.to_reference(key, resolved.get(key).and_then(Option::as_ref))
                })
                .collect::<Vec<IssueReference>>();

            changelog.entries[index]
                .annotate(JIRA_ISSUES_ANNOTATION, Annotation::Issues(references))?;
        }

        Ok(changelog)
    }
}

#[cfg(test)]
#[path = "./jira_tests.rs"]
mod jira_tests;
