//! Session error types.

use std::path::PathBuf;
use std::time::Duration;

use mariadump_core::ConfigError;
use thiserror::Error;

use crate::exec::ExecError;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while building or using a command session.
///
/// Only [`SessionError::ReadinessTimeout`] is the outcome of local retries;
/// every other variant is surfaced on first occurrence.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to resolve credentials: {0}")]
    CredentialResolution(String),

    #[error("failed to resolve connection target: {0}")]
    ConnectionResolution(#[source] mariadump_core::BindingError),

    #[error("failed to write {}: {source}", .path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database not ready after {waited:?} ({attempts} attempts): {last_error}")]
    ReadinessTimeout {
        waited: Duration,
        attempts: u32,
        last_error: String,
    },

    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error(transparent)]
    Command(#[from] ExecError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
