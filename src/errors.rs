// src/errors.rs

//! Crate-wide error type and its mapping onto process exit codes.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Exit code for configuration and precondition failures.
pub const EXIT_CONFIG: i32 = 78;
/// Exit code for I/O failures of the launcher itself.
pub const EXIT_IO: i32 = 74;
/// Exit code when the external program could not be started.
pub const EXIT_LAUNCH: i32 = 127;
/// Exit code when the run exceeded its timeout.
pub const EXIT_TIMEOUT: i32 = 124;
/// Exit code when the run was cancelled (Ctrl-C).
pub const EXIT_CANCELLED: i32 = 130;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Configuration error in `{key}`: {reason}")]
    ConfigError { key: String, reason: String },

    #[error("Missing {what}: {path:?}")]
    PrecursorMissing { what: String, path: PathBuf },

    #[error("Output location {path:?} is unusable: {reason}")]
    OutputUnavailable { path: PathBuf, reason: String },

    #[error("Could not start {program:?}: {source}")]
    LaunchError {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("External program exited with status {exit_code} (log: {log_path:?})")]
    ExternalProcess { exit_code: i32, log_path: PathBuf },

    #[error("External program timed out after {after:?} (log: {log_path:?})")]
    Timeout { after: Duration, log_path: PathBuf },

    #[error("Run cancelled (log: {log_path:?})")]
    Cancelled { log_path: PathBuf },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl LauncherError {
    pub(crate) fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        LauncherError::ConfigError {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The process exit code `main` should use for this error.
    ///
    /// A failing child keeps its own status so callers can tell "bad config"
    /// apart from "algorithm failed".
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::ConfigError { .. }
            | LauncherError::PrecursorMissing { .. }
            | LauncherError::OutputUnavailable { .. }
            | LauncherError::TomlError(_) => EXIT_CONFIG,
            LauncherError::LaunchError { .. } => EXIT_LAUNCH,
            LauncherError::ExternalProcess { exit_code, .. } => *exit_code,
            LauncherError::Timeout { .. } => EXIT_TIMEOUT,
            LauncherError::Cancelled { .. } => EXIT_CANCELLED,
            LauncherError::IoError(_) => EXIT_IO,
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
