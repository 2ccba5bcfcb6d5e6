//! Installer failure taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the installation steps.
///
/// Fatal preconditions and external-command failures abort the run; soft
/// failures never reach this type and are logged as warnings instead.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Host is not the supported platform (marker file missing).
    #[error("unsupported platform: {0}")]
    Platform(String),

    /// A required command or component could not be found.
    #[error("missing dependency: {0}")]
    Dependency(String),

    /// An external command exited unsuccessfully.
    #[error("command failed: {0}")]
    Command(String),

    /// User-supplied input was rejected.
    #[error("invalid input: {0}")]
    Input(String),

    /// A required staged artifact was not found on disk.
    #[error("missing artifact: {0}")]
    MissingArtifact(PathBuf),

    /// Filesystem or OS-level failure.
    #[error("system error: {0}")]
    System(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}
