//! In-memory changelog model.
//!
//! A [`Changelog`] is an ordered list of [`ChangelogEntry`] values, one per
//! commit, newest first. Processors enrich entries through append-only
//! annotations; nothing in the model allows an annotation to be removed or
//! replaced once attached.
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    error::{ChangelogError, Result},
    repo::CommitRecord,
};

pub mod render;
pub mod traits;

/// Annotation key used by the Jira issue processor.
pub const JIRA_ISSUES_ANNOTATION: &str = "jira-issues";

/// Pointer to an issue-tracker ticket extracted from a commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueReference {
    /// Issue key, e.g. "ABC-123".
    pub key: String,
    /// Browse URL for the issue. Always present, even when unresolved.
    pub url: String,
    /// Issue summary as reported by the tracker.
    pub title: Option<String>,
    /// Whether the tracker lookup succeeded.
    pub resolved: bool,
}

/// Processor-attached metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Annotation {
    /// Ordered, de-duplicated issue references.
    Issues(Vec<IssueReference>),
}

/// One commit's representation within a changelog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangelogEntry {
    pub commit: CommitRecord,
    annotations: BTreeMap<String, Annotation>,
}

impl ChangelogEntry {
    pub fn new(commit: CommitRecord) -> Self {
        Self {
            commit,
            annotations: BTreeMap::new(),
        }
    }

    /// Attach an annotation. Keys are write-once.
    pub fn annotate(
        &mut self,
        key: impl Into<String>,
        annotation: Annotation,
    ) -> Result<()> {
        let key = key.into();
        if self.annotations.contains_key(&key) {
            return Err(ChangelogError::AnnotationExists { key });
        }
        self.annotations.insert(key, annotation);
        Ok(())
    }

    pub fn annotation(&self, key: &str) -> Option<&Annotation> {
        self.annotations.get(key)
    }

    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations.contains_key(key)
    }

    /// All annotations, ordered by key.
    pub fn annotations(&self) -> impl Iterator<Item = (&str, &Annotation)> {
        self.annotations.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Issue references attached by any processor, in annotation-key order.
    pub fn issues(&self) -> impl Iterator<Item = &IssueReference> {
        self.annotations.values().flat_map(|annotation| match annotation {
            Annotation::Issues(issues) => issues.iter(),
        })
    }
}

/// Ordered sequence of commit entries produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Changelog {
    /// Exclusive lower bound of the revision range, as requested.
    pub from_rev: Option<String>,
    /// Inclusive upper bound of the revision range, as requested.
    pub to_rev: Option<String>,
    /// Entries in reverse-chronological order.
    pub entries: Vec<ChangelogEntry>,
}

impl Changelog {
    pub fn new(
        from_rev: Option<String>,
        to_rev: Option<String>,
        commits: impl IntoIterator<Item = CommitRecord>,
    ) -> Self {
        Self {
            from_rev,
            to_rev,
            entries: commits.into_iter().map(ChangelogEntry::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
