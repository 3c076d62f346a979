//! Secret retrieval.
//!
//! Credentials are fetched by reference from a [`SecretStore`]. The CLI
//! reads secrets mounted as one file per field; tests and embedding
//! callers use [`MemorySecretStore`].

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tracing::debug;

use crate::error::SecretError;

/// Secret payload: field name → raw bytes.
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Fetches secret payloads by namespace and name.
pub trait SecretStore {
    fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData, SecretError>;
}

/// Secrets laid out as `<root>/<namespace>/<name>/<field>`.
#[derive(Debug, Clone)]
pub struct DirSecretStore {
    root: PathBuf,
}

impl DirSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SecretStore for DirSecretStore {
    fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData, SecretError> {
        let dir = self.root.join(namespace).join(name);
        if !dir.is_dir() {
            return Err(SecretError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }

        let read_err = |source| SecretError::Read {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source,
        };

        let mut data = SecretData::new();
        for entry in std::fs::read_dir(&dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();
            // Mounted secrets carry `..data` symlink bookkeeping; skip dotfiles.
            let Some(field) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if field.starts_with('.') || !path.is_file() {
                continue;
            }
            let field = field.to_string();
            data.insert(field, std::fs::read(&path).map_err(read_err)?);
        }

        debug!(%namespace, %name, fields = data.len(), "loaded secret");
        Ok(data)
    }
}

/// In-memory secret store.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    secrets: HashMap<(String, String), SecretData>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a secret with string-valued fields.
    pub fn with_secret(mut self, namespace: &str, name: &str, fields: &[(&str, &str)]) -> Self {
        let data = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect();
        self.secrets
            .insert((namespace.to_string(), name.to_string()), data);
        self
    }
}

impl SecretStore for MemorySecretStore {
    fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData, SecretError> {
        self.secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SecretError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn dir_store_reads_one_file_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let secret_dir = dir.path().join("demo").join("maria-auth");
        fs::create_dir_all(&secret_dir).unwrap();
        fs::write(secret_dir.join("username"), "root").unwrap();
        fs::write(secret_dir.join("password"), "s3cr3t").unwrap();
        fs::write(secret_dir.join("..data"), "ignored").unwrap();

        let store = DirSecretStore::new(dir.path());
        let data = store.get_secret("demo", "maria-auth").unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data["username"], b"root");
        assert_eq!(data["password"], b"s3cr3t");
    }

    #[test]
    fn dir_store_missing_secret() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirSecretStore::new(dir.path());
        let err = store.get_secret("demo", "absent").unwrap_err();
        assert!(matches!(err, SecretError::NotFound { ref name, .. } if name == "absent"));
    }

    #[test]
    fn memory_store_lookup() {
        let store = MemorySecretStore::new()
            .with_secret("demo", "auth", &[("username", "root"), ("password", "pw")]);

        let data = store.get_secret("demo", "auth").unwrap();
        assert_eq!(data["password"], b"pw");
        assert!(store.get_secret("other", "auth").is_err());
    }
}
