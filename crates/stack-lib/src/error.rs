//! Error types shared by the installer and the lifecycle manager

use std::path::PathBuf;

/// Errors produced while installing or operating the stack.
///
/// Every variant is terminal for the current invocation: callers log the
/// error and exit non-zero. There is no retry logic anywhere.
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    /// A required external tool or service is absent.
    #[error("prerequisite missing: {0}")]
    PrerequisiteMissing(String),

    /// A lifecycle command was issued against a deployment that does not exist.
    #[error("no deployment found at {0} (run the installer first)")]
    NotInstalled(PathBuf),

    /// The compose descriptor was expected on disk but is not there.
    #[error("service descriptor not found at {0}")]
    DescriptorNotFound(PathBuf),

    /// `restore` was pointed at a path that is not a snapshot.
    #[error("invalid backup target: {path}: {reason}")]
    BackupTargetInvalid { path: PathBuf, reason: String },

    /// The orchestration CLI returned a non-zero exit status.
    #[error("`{command}` failed with exit status {status}")]
    ExternalToolFailure { command: String, status: i32 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("failed to set up health probe client: {0}")]
    Probe(#[from] reqwest::Error),
}

impl StackError {
    /// Attach a path to a bare I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StackError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
