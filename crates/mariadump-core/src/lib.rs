pub mod binding;
pub mod config;
pub mod error;
pub mod secret;

pub use binding::{
    AppBinding, ClientEndpoint, ConnectionBinding, SecretName, SecretRef, ServiceEndpoint,
};
pub use config::{ClientConfig, Config, DiscoveryConfig, ProbeConfig};
pub use error::{BindingError, ConfigError, SecretError};
pub use secret::{DirSecretStore, MemorySecretStore, SecretData, SecretStore};
