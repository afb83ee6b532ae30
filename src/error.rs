//! Error types for gitchangelog.
//!
//! Fatal errors abort a run and are surfaced to the caller verbatim. Issue
//! lookup failures are the one non-fatal kind: the issue processor turns them
//! into unresolved references instead of propagating them.

use thiserror::Error;

/// Main error type for gitchangelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    // Repository errors
    #[error("Repository not found at path: {path}")]
    RepositoryNotFound { path: String },

    #[error("Invalid revision '{revision}': {reason}")]
    InvalidRevision { revision: String, reason: String },

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    // Pipeline errors
    #[error("Processor '{processor}' failed: {message}")]
    ProcessorFatal { processor: String, message: String },

    #[error("Annotation '{key}' already exists on entry")]
    AnnotationExists { key: String },

    #[error("Changelog run was cancelled")]
    Cancelled,

    // Issue tracker errors
    #[error("Lookup of issue {key} failed: {reason}")]
    IssueLookup { key: String, reason: String },

    #[error("Network request failed: {0}")]
    NetworkError(String),

    // Output errors
    #[error("Failed to write changelog output: {0}")]
    OutputSink(String),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ChangelogError
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create a repository-not-found error for the given path
    pub fn repository_not_found(path: impl Into<String>) -> Self {
        Self::RepositoryNotFound { path: path.into() }
    }

    /// Create an invalid revision error with the offending revision string
    pub fn invalid_revision(
        revision: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRevision {
            revision: revision.into(),
            reason: reason.into(),
        }
    }

    /// Create a fatal processor error naming the failing stage
    pub fn processor_fatal(
        processor: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProcessorFatal {
            processor: processor.into(),
            message: message.into(),
        }
    }

    /// Create a (non-fatal) issue lookup failure
    pub fn issue_lookup(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IssueLookup {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an output sink error
    pub fn output_sink(msg: impl Into<String>) -> Self {
        Self::OutputSink(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

// I/O errors only surface while writing output, so they belong to the sink
impl From<std::io::Error> for ChangelogError {
    fn from(err: std::io::Error) -> Self {
        Self::OutputSink(err.to_string())
    }
}

impl From<reqwest::Error> for ChangelogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::NetworkError(format!("request timed out: {err}"))
        } else if let Some(status) = err.status() {
            Self::NetworkError(format!("unexpected status {status}: {err}"))
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}
