//! Error types for the external collaborators: bindings, secrets, config.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving a connection binding.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("binding {0} has neither a url nor a service endpoint")]
    MissingEndpoint(String),

    #[error("invalid url in binding: {0}")]
    InvalidUrl(String),

    #[error("failed to read binding {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse binding {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
}

/// Errors raised by a [`SecretStore`](crate::SecretStore).
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret not found: {namespace}/{name}")]
    NotFound { namespace: String, name: String },

    #[error("failed to read secret {namespace}/{name}: {source}")]
    Read {
        namespace: String,
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),
}
