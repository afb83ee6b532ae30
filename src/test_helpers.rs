//! Common test helper functions shared across test modules.
//!
//! This module provides reusable utilities for creating test fixtures,
//! reducing code duplication across different test suites.
use chrono::DateTime;
use git2::{Oid, Signature, Time};
use std::{cell::Cell, path::Path};
use tempfile::TempDir;

use crate::repo::CommitRecord;

/// Creates a CommitRecord with fixed author data.
///
/// # Example
/// ```ignore
/// let record = commit_record("abc123", "fix ABC-1 crash");
/// ```
pub fn commit_record(hash: &str, message: &str) -> CommitRecord {
    CommitRecord {
        hash: hash.to_string(),
        author: "Jane Doe".to_string(),
        author_email: "jane@example.com".to_string(),
        timestamp: DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .fixed_offset(),
        message: message.to_string(),
    }
}

/// Throwaway git repository with deterministic commit signatures.
///
/// Every commit is authored by "Test User" one minute after the previous
/// one, starting at [`TestRepo::BASE_TIME`], so hashes and ordering are
/// stable across runs.
pub struct TestRepo {
    tmp_dir: TempDir,
    repo: git2::Repository,
    counter: Cell<i64>,
}

impl TestRepo {
    pub const BASE_TIME: i64 = 1_700_000_000;

    pub fn new() -> Self {
        let tmp_dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(tmp_dir.path()).unwrap();
        Self {
            tmp_dir,
            repo,
            counter: Cell::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        self.tmp_dir.path()
    }

    /// Commit a file change with the given message and return its id.
    pub fn commit(&self, message: &str) -> Oid {
        self.commit_with_offset(message, 0)
    }

    /// Like [`TestRepo::commit`] with the signature in a UTC offset given
    /// in minutes.
    pub fn commit_with_offset(&self, message: &str, offset_minutes: i32) -> Oid {
        let n = self.counter.get() + 1;
        self.counter.set(n);

        let file_name = format!("file-{n}.txt");
        std::fs::write(self.path().join(&file_name), message).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(&file_name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let sig = Signature::new(
            "Test User",
            "test@example.com",
            &Time::new(Self::BASE_TIME + n * 60, offset_minutes),
        )
        .unwrap();

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents = parent.iter().collect::<Vec<&git2::Commit>>();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Create a lightweight tag on HEAD.
    pub fn tag(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .unwrap();
    }
}
