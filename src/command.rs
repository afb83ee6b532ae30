//! Execution of a changelog run from parsed CLI arguments.
//!
//! Configuration is resolved in three layers: the TOML file, then CLI
//! flags, then `$VAR` expansion against the process environment. The
//! resolved configuration drives the orchestrator, the renderer and the
//! output target.
use log::*;
use secrecy::SecretString;
use std::{env, path::Path, sync::Arc};
use tokio_util::sync::CancellationToken;

use crate::{
    changelog::{
        render::{TemplateRenderer, TextRenderer},
        traits::{Processor, Renderer},
    },
    cli::Args,
    config::Config,
    error::{ChangelogError, Result},
    orchestrator::{self, RunRequest},
    output::OutputTarget,
    processor::JiraFilterProcessor,
    tracker::{JiraCredentials, JiraTracker},
};

/// Run the full pipeline and write the rendered changelog.
pub async fn execute(args: &Args, cancel: &CancellationToken) -> Result<()> {
    let config = resolve_config(args, |name| env::var(name).ok())?;

    let processors = build_processors(&config, args.jira_token())?;
    let renderer = build_renderer(&config)?;

    let request = RunRequest {
        repo_path: config.repo.clone().into(),
        from_rev: config.from_rev.clone(),
        to_rev: config.to_rev.clone(),
    };

    let changelog = orchestrator::run(&request, &processors, cancel).await?;

    let issues: usize = changelog.entries.iter().map(|e| e.issues().count()).sum();
    info!(
        "generated changelog with {} entries and {issues} issue references",
        changelog.len()
    );

    OutputTarget::from_path(config.output_file.as_deref())
        .write(&changelog, renderer.as_ref())
}

/// Load the config file, overlay CLI flags and expand placeholders.
pub fn resolve_config<F>(args: &Args, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::load(args.config.as_deref().map(Path::new))?;
    args.apply_to(&mut config);
    config.expand_env(lookup);
    debug!("resolved configuration: {config:?}");
    Ok(config)
}

/// Processors in the order they are applied.
///
/// The Jira filter is only added when a base URL and at least one project
/// prefix are configured.
pub fn build_processors(
    config: &Config,
    token: Option<SecretString>,
) -> Result<Vec<Box<dyn Processor>>> {
    let processor_config = config.processor_config();

    if !processor_config.is_enabled() {
        info!("jira base url or project prefixes missing: issue extraction disabled");
        return Ok(vec![]);
    }

    let credentials = match (config.jira.username.clone(), token) {
        (Some(username), Some(token)) => Some(JiraCredentials { username, token }),
        (None, Some(_)) => {
            warn!("jira token given without a username: sending anonymous requests");
            None
        }
        _ => None,
    };

    let tracker = JiraTracker::new(&processor_config.jira_base_url, credentials)?;

    Ok(vec![Box::new(JiraFilterProcessor::new(
        processor_config,
        Arc::new(tracker),
        config.lookup_options(),
    ))])
}

fn build_renderer(config: &Config) -> Result<Box<dyn Renderer>> {
    let Some(path) = &config.template else {
        return Ok(Box::new(TextRenderer));
    };

    let template = std::fs::read_to_string(path).map_err(|err| {
        ChangelogError::invalid_config(format!(
            "unable to read template {path}: {err}"
        ))
    })?;

    debug!("rendering with template {path}");

    Ok(Box::new(TemplateRenderer::new(&template)?))
}
