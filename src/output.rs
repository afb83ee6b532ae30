//! Changelog output destinations.
use log::*;
use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::{
    changelog::{Changelog, traits::Renderer},
    error::{ChangelogError, Result},
};

/// Where the rendered changelog goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    /// File replaced atomically once rendering succeeded.
    File(PathBuf),
}

impl OutputTarget {
    pub fn from_path(path: Option<&str>) -> Self {
        match path {
            Some(path) if !path.trim().is_empty() => Self::File(PathBuf::from(path)),
            _ => Self::Stdout,
        }
    }

    pub fn write(
        &self,
        changelog: &Changelog,
        renderer: &dyn Renderer,
    ) -> Result<()> {
        match self {
            Self::Stdout => {
                let stdout = std::io::stdout();
                let mut sink = BufWriter::new(stdout.lock());
                renderer.render(changelog, &mut sink)
            }
            Self::File(path) => write_atomically(path, changelog, renderer),
        }
    }
}

/// Render into a temporary file next to `path`, then rename it over `path`.
///
/// The temporary file is removed on any failure, leaving `path` untouched.
fn write_atomically(
    path: &Path,
    changelog: &Changelog,
    renderer: &dyn Renderer,
) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| {
        ChangelogError::output_sink(format!(
            "unable to create temporary file in {}: {err}",
            dir.display()
        ))
    })?;

    {
        let mut sink = BufWriter::new(tmp.as_file_mut());
        renderer.render(changelog, &mut sink)?;
        sink.flush()?;
    }

    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|err| {
        ChangelogError::output_sink(format!(
            "unable to write {}: {}",
            path.display(),
            err.error
        ))
    })?;

    info!("changelog written to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{changelog::render::TextRenderer, test_helpers::commit_record};
    use tempfile::TempDir;

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&self, _changelog: &Changelog, sink: &mut dyn Write) -> Result<()> {
            sink.write_all(b"partial output")?;
            Err(ChangelogError::output_sink("renderer exploded"))
        }
    }

    fn changelog() -> Changelog {
        Changelog::new(None, None, vec![commit_record("c1", "fix ABC-1")])
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn target_from_path() {
        assert_eq!(OutputTarget::from_path(None), OutputTarget::Stdout);
        assert_eq!(OutputTarget::from_path(Some("  ")), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::from_path(Some("CHANGELOG.txt")),
            OutputTarget::File(PathBuf::from("CHANGELOG.txt"))
        );
    }

    #[test]
    fn writes_rendered_changelog_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("CHANGELOG.txt");

        OutputTarget::File(path.clone())
            .write(&changelog(), &TextRenderer)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("commit c1\n"));
        assert!(content.contains("    fix ABC-1\n"));
        assert_eq!(dir_entries(tmp.path()), vec!["CHANGELOG.txt"]);
    }

    #[test]
    fn replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("CHANGELOG.txt");
        std::fs::write(&path, "old content").unwrap();

        OutputTarget::File(path.clone())
            .write(&changelog(), &TextRenderer)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("old content"));
        assert!(content.starts_with("commit c1\n"));
    }

    #[test]
    fn failed_render_leaves_destination_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("CHANGELOG.txt");
        std::fs::write(&path, "old content").unwrap();

        let err = OutputTarget::File(path.clone())
            .write(&changelog(), &FailingRenderer)
            .unwrap_err();

        assert!(matches!(err, ChangelogError::OutputSink(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old content");
        assert_eq!(dir_entries(tmp.path()), vec!["CHANGELOG.txt"]);
    }

    #[test]
    fn failed_render_creates_no_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("CHANGELOG.txt");

        OutputTarget::File(path.clone())
            .write(&changelog(), &FailingRenderer)
            .unwrap_err();

        assert!(!path.exists());
        assert!(dir_entries(tmp.path()).is_empty());
    }

    #[test]
    fn missing_directory_is_a_sink_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("CHANGELOG.txt");

        let err = OutputTarget::File(path)
            .write(&changelog(), &TextRenderer)
            .unwrap_err();

        assert!(matches!(err, ChangelogError::OutputSink(_)));
    }
}
