//! Changelog related traits
use async_trait::async_trait;
use std::io::Write;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
use mockall::automock;

use crate::{changelog::Changelog, error::Result};

/// A transformation stage applied to a changelog.
///
/// Processors receive the previous stage's output by value and return the
/// changelog for the next stage. They may only add annotations.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Processor: Send + Sync {
    /// Stable name used in diagnostics.
    fn name(&self) -> &'static str;

    async fn process(
        &self,
        changelog: Changelog,
        cancel: &CancellationToken,
    ) -> Result<Changelog>;
}

/// Serializes a changelog into a caller-owned sink.
pub trait Renderer {
    fn render(&self, changelog: &Changelog, sink: &mut dyn Write) -> Result<()>;

    fn render_to_string(&self, changelog: &Changelog) -> Result<String> {
        let mut buf = Vec::new();
        self.render(changelog, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|err| crate::error::ChangelogError::output_sink(err.to_string()))
    }
}
