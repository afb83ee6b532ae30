//! Git repository access for changelog generation.
//!
//! This module wraps `git2` to provide the two operations a changelog run
//! needs from version control:
//!
//! - **Range resolution**: turn optional from/to revision strings into
//!   concrete commit ids
//! - **Commit reading**: walk the resolved range and yield [`CommitRecord`]s
//!
//! # Ordering
//!
//! Commits are yielded newest first (topological order, ties broken by commit
//! time), the same order `git log` prints them. `from` is exclusive and `to`
//! is inclusive, matching `git log from..to`.
//!
//! # Usage
//!
//! ```rust,ignore
//! let repo = Repository::open("./my-repo")?;
//! let range = repo.resolve_range(Some("v1.0.0"), None)?;
//! for commit in repo.commits(&range)? {
//!     println!("{}", commit?.summary());
//! }
//! ```
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use git2::{ErrorCode, Oid, Sort};
use log::*;
use serde::Serialize;
use std::path::Path;

use crate::error::{ChangelogError, Result};

/// Immutable record of a single commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Full commit hash.
    pub hash: String,
    /// Author name.
    pub author: String,
    /// Author email.
    pub author_email: String,
    /// Author timestamp in the author's own UTC offset.
    pub timestamp: DateTime<FixedOffset>,
    /// Full commit message with trailing whitespace removed.
    pub message: String,
}

impl CommitRecord {
    /// First 8 characters of the hash.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..8).unwrap_or(&self.hash)
    }

    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

impl From<&git2::Commit<'_>> for CommitRecord {
    fn from(commit: &git2::Commit<'_>) -> Self {
        let author = commit.author();
        Self {
            hash: commit.id().to_string(),
            author: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            timestamp: author_time(author.when()),
            message: String::from_utf8_lossy(commit.message_bytes())
                .trim_end()
                .to_string(),
        }
    }
}

/// Convert a git time, keeping its offset. Out of range values fall back
/// to UTC.
fn author_time(when: git2::Time) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(when.offset_minutes() * 60)
        .and_then(|offset| offset.timestamp_opt(when.seconds(), 0).single())
        .unwrap_or_else(|| {
            DateTime::<Utc>::from_timestamp(when.seconds(), 0)
                .unwrap_or_default()
                .fixed_offset()
        })
}

/// Concrete commit boundaries resolved from revision strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionRange {
    /// Exclusive start; `None` walks the whole history.
    pub from: Option<Oid>,
    /// Inclusive end; `None` only for a repository with no commits.
    pub to: Option<Oid>,
}

/// Read-only handle to a local git repository.
pub struct Repository {
    path: String,
    repo: git2::Repository,
}

impl Repository {
    /// Open the repository located exactly at `path`.
    ///
    /// No upward discovery is performed: `path` must be the repository's
    /// working directory (or git dir for bare repositories).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let repo = git2::Repository::open(path).map_err(|err| {
            debug!("failed to open repository at {display}: {err}");
            ChangelogError::repository_not_found(&display)
        })?;

        debug!("opened repository at {display}");

        Ok(Self {
            path: display,
            repo,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolve optional from/to revisions into commit ids.
    ///
    /// Revisions accept anything `git rev-parse` understands (full or short
    /// sha, branch, tag, `HEAD~2`) and are peeled to commits. A missing `to`
    /// means HEAD; an unborn HEAD yields an empty range.
    pub fn resolve_range(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<RevisionRange> {
        let from = from.map(|rev| self.resolve_revision(rev)).transpose()?;

        let to = match to {
            Some(rev) => Some(self.resolve_revision(rev)?),
            None => self.head_commit()?,
        };

        debug!("resolved revision range: from={from:?}, to={to:?}");

        Ok(RevisionRange { from, to })
    }

    /// Lazily walk the commits in `range`, newest first.
    ///
    /// Each call starts a fresh walk, so the sequence can be re-read.
    pub fn commits(&self, range: &RevisionRange) -> Result<CommitLog<'_>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let Some(to) = range.to else {
            return Ok(CommitLog {
                repo: &self.repo,
                revwalk: None,
            });
        };

        revwalk.push(to)?;

        if let Some(from) = range.from {
            revwalk.hide(from)?;
        }

        Ok(CommitLog {
            repo: &self.repo,
            revwalk: Some(revwalk),
        })
    }

    fn resolve_revision(&self, rev: &str) -> Result<Oid> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|err| ChangelogError::invalid_revision(rev, err.message()))?;

        let commit = object
            .peel_to_commit()
            .map_err(|err| ChangelogError::invalid_revision(rev, err.message()))?;

        Ok(commit.id())
    }

    fn head_commit(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(err)
                if err.code() == ErrorCode::UnbornBranch
                    || err.code() == ErrorCode::NotFound =>
            {
                warn!("repository {} has no commits yet", self.path);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Lazy sequence of commits produced by [`Repository::commits`].
pub struct CommitLog<'r> {
    repo: &'r git2::Repository,
    revwalk: Option<git2::Revwalk<'r>>,
}

impl Iterator for CommitLog<'_> {
    type Item = Result<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.revwalk.as_mut()?.next()?;

        Some(
            oid.and_then(|oid| self.repo.find_commit(oid))
                .map(|commit| CommitRecord::from(&commit))
                .map_err(ChangelogError::from),
        )
    }
}
