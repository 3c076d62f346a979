//! Connection bindings.
//!
//! A binding describes how to reach a managed database: an endpoint
//! (URL or in-cluster service), optional TLS material, and a reference to
//! the secret holding its credentials.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BindingError;
use crate::secret::SecretData;

/// Reference to a secret in the secret store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    pub namespace: String,
    pub name: String,
}

/// Resolves connection parameters for a database instance.
pub trait ConnectionBinding {
    fn hostname(&self) -> Result<String, BindingError>;

    /// Port to connect to; 0 means unspecified.
    fn port(&self) -> Result<u16, BindingError>;

    /// PEM-encoded CA bundle, when the server requires TLS.
    fn ca_bundle(&self) -> Option<&[u8]>;

    fn secret_ref(&self) -> Option<SecretRef>;

    /// Post-process raw secret fields into the fields the client reads.
    fn transform_secret(&self, _data: &mut SecretData) -> Result<(), BindingError> {
        Ok(())
    }
}

/// Serialized binding resource, as published by the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppBinding {
    pub namespace: String,
    pub name: String,
    pub client_config: ClientEndpoint,
    pub secret: Option<SecretName>,
    /// Secret field aliases: `alias -> canonical field`.
    #[serde(default)]
    pub secret_key_aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientEndpoint {
    pub url: Option<String>,
    pub service: Option<ServiceEndpoint>,
    pub ca_bundle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub name: String,
    pub port: Option<u16>,
    pub scheme: Option<String>,
}

/// Secret name, resolved in the binding's own namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretName {
    pub name: String,
}

impl AppBinding {
    /// Load a binding from a `.json` or `.toml` file.
    pub fn from_file(path: &Path) -> Result<Self, BindingError> {
        let content = std::fs::read_to_string(path).map_err(|source| BindingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |reason: String| BindingError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string())),
            _ => toml::from_str(&content).map_err(|e| parse_err(e.to_string())),
        }
    }

    fn url_authority(&self) -> Result<Option<(String, u16)>, BindingError> {
        let Some(url) = self.client_config.url.as_deref() else {
            return Ok(None);
        };
        split_authority(url).map(Some)
    }
}

impl ConnectionBinding for AppBinding {
    fn hostname(&self) -> Result<String, BindingError> {
        if let Some((host, _)) = self.url_authority()? {
            return Ok(host);
        }
        match &self.client_config.service {
            Some(svc) => Ok(format!("{}.{}.svc", svc.name, self.namespace)),
            None => Err(BindingError::MissingEndpoint(format!(
                "{}/{}",
                self.namespace, self.name
            ))),
        }
    }

    fn port(&self) -> Result<u16, BindingError> {
        if let Some((_, port)) = self.url_authority()? {
            return Ok(port);
        }
        Ok(self
            .client_config
            .service
            .as_ref()
            .and_then(|svc| svc.port)
            .unwrap_or(0))
    }

    fn ca_bundle(&self) -> Option<&[u8]> {
        self.client_config.ca_bundle.as_deref().map(str::as_bytes)
    }

    fn secret_ref(&self) -> Option<SecretRef> {
        self.secret.as_ref().map(|s| SecretRef {
            namespace: self.namespace.clone(),
            name: s.name.clone(),
        })
    }

    fn transform_secret(&self, data: &mut SecretData) -> Result<(), BindingError> {
        for (alias, canonical) in &self.secret_key_aliases {
            if data.contains_key(canonical) {
                continue;
            }
            if let Some(value) = data.get(alias).cloned() {
                data.insert(canonical.clone(), value);
            }
        }
        Ok(())
    }
}

/// Extract `(host, port)` from `scheme://[user@]host[:port][/path]`.
fn split_authority(url: &str) -> Result<(String, u16), BindingError> {
    let invalid = || BindingError::InvalidUrl(url.to_string());

    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    // Bracketed IPv6 literal.
    let (host, port) = if let Some(inner) = authority.strip_prefix('[') {
        let (host, tail) = inner.split_once(']').ok_or_else(invalid)?;
        (host, tail.strip_prefix(':'))
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return Err(invalid());
    }
    let port = match port {
        Some(p) => p.parse::<u16>().map_err(|_| invalid())?,
        None => 0,
    };
    Ok((host.to_string(), port))
}
