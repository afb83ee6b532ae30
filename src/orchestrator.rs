//! Runs the changelog pipeline: read the revision range, then fold the
//! changelog through each processor in order.
use log::*;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::{
    changelog::{Changelog, traits::Processor},
    error::{ChangelogError, Result},
    repo::{CommitRecord, Repository},
};

/// Repository and revision range of a single run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub repo_path: PathBuf,
    pub from_rev: Option<String>,
    pub to_rev: Option<String>,
}

/// Build the changelog for `request` and apply `processors` sequentially.
///
/// `Cancelled` and `ProcessorFatal` errors from a processor are surfaced
/// unchanged; anything else is reported as a fatal error of that processor.
pub async fn run(
    request: &RunRequest,
    processors: &[Box<dyn Processor>],
    cancel: &CancellationToken,
) -> Result<Changelog> {
    check_cancelled(cancel)?;

    let changelog = read_changelog(request)?;

    info!(
        "read {} commits from {}",
        changelog.len(),
        request.repo_path.display()
    );

    let mut changelog = changelog;

    for processor in processors.iter() {
        check_cancelled(cancel)?;

        let name = processor.name();
        debug!("running processor {name}");

        changelog = processor
            .process(changelog, cancel)
            .await
            .map_err(|err| match err {
                ChangelogError::Cancelled
                | ChangelogError::ProcessorFatal { .. } => err,
                other => ChangelogError::processor_fatal(name, other.to_string()),
            })?;
    }

    Ok(changelog)
}

fn read_changelog(request: &RunRequest) -> Result<Changelog> {
    let repo = Repository::open(&request.repo_path)?;

    let range = repo
        .resolve_range(request.from_rev.as_deref(), request.to_rev.as_deref())?;

    let commits = repo
        .commits(&range)?
        .collect::<Result<Vec<CommitRecord>>>()?;

    Ok(Changelog::new(
        request.from_rev.clone(),
        request.to_rev.clone(),
        commits,
    ))
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        warn!("changelog run cancelled");
        return Err(ChangelogError::Cancelled);
    }
    Ok(())
}
