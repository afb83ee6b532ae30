//! Changelog renderers.
//!
//! [`TextRenderer`] produces the fixed plain text format, one block per
//! entry, each block followed by an empty line:
//!
//! ```text
//! commit <full hash>
//! Author: <name> <<email>> | Date: <%Y-%m-%d %H:%M:%S %z>
//!     <message line>
//!   * <KEY>: <title or "(unresolved)"> <<url>>
//! ```
//!
//! Blank message lines are dropped so an empty line only ever separates
//! blocks. [`TemplateRenderer`] renders a user supplied Tera template.
use std::io::Write;

use crate::{
    changelog::{Changelog, ChangelogEntry, traits::Renderer},
    error::Result,
};

/// Title placeholder for references the tracker could not resolve.
pub const UNRESOLVED_TITLE: &str = "(unresolved)";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Plain text renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl TextRenderer {
    fn write_entry(
        &self,
        entry: &ChangelogEntry,
        sink: &mut dyn Write,
    ) -> Result<()> {
        let commit = &entry.commit;

        writeln!(sink, "commit {}", commit.hash)?;
        writeln!(
            sink,
            "Author: {} <{}> | Date: {}",
            commit.author,
            commit.author_email,
            commit.timestamp.format(DATE_FORMAT)
        )?;

        for line in commit.message.lines().filter(|l| !l.trim().is_empty()) {
            writeln!(sink, "    {}", line.trim_end())?;
        }

        for issue in entry.issues() {
            writeln!(
                sink,
                "  * {}: {} <{}>",
                issue.key,
                issue.title.as_deref().unwrap_or(UNRESOLVED_TITLE),
                issue.url
            )?;
        }

        writeln!(sink)?;

        Ok(())
    }
}

impl Renderer for TextRenderer {
    fn render(&self, changelog: &Changelog, sink: &mut dyn Write) -> Result<()> {
        for entry in changelog.entries.iter() {
            self.write_entry(entry, sink)?;
        }
        sink.flush()?;
        Ok(())
    }
}

/// Renders a Tera template with the serialized changelog as context.
///
/// The context exposes `from_rev`, `to_rev` and `entries`; every entry has
/// `commit` and `annotations` (e.g. `entry.annotations["jira-issues"]`).
pub struct TemplateRenderer {
    tera: tera::Tera,
}

impl TemplateRenderer {
    const TEMPLATE_NAME: &'static str = "changelog";

    pub fn new(template: &str) -> Result<Self> {
        let mut tera = tera::Tera::default();
        tera.add_raw_template(Self::TEMPLATE_NAME, template)?;
        Ok(Self { tera })
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, changelog: &Changelog, sink: &mut dyn Write) -> Result<()> {
        let context = tera::Context::from_serialize(changelog)?;
        let output = self.tera.render(Self::TEMPLATE_NAME, &context)?;
        sink.write_all(output.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}
