//! mariadump.toml configuration parser.
//!
//! Every section is optional; a missing file section falls back to the
//! stock MariaDB client conventions.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub probe: ProbeConfig,
    pub discovery: DiscoveryConfig,
}

/// Binary names and field-name conventions of the database client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Interactive client used for probes and discovery queries.
    pub client_binary: String,
    pub dump_binary: String,
    pub restore_binary: String,
    /// Secret field holding the username.
    pub username_key: String,
    /// Secret field holding the password.
    pub password_key: String,
    /// Environment variable the client reads its password from.
    pub password_env: String,
    /// File name of the CA bundle inside the scratch directory.
    pub ca_file_name: String,
    pub dump_file_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_binary: "mariadb".to_string(),
            dump_binary: "mariadb-dump".to_string(),
            restore_binary: "mariadb".to_string(),
            username_key: "username".to_string(),
            password_key: "password".to_string(),
            password_env: "MYSQL_PWD".to_string(),
            ca_file_name: "ca.crt".to_string(),
            dump_file_name: "dumpfile.sql".to_string(),
        }
    }
}

/// Readiness polling policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Delay between attempts, e.g. "5s" or "500ms".
    pub interval: String,
    /// Discard stdout of probe queries.
    pub quiet: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval: "5s".to_string(),
            quiet: true,
        }
    }
}

impl ProbeConfig {
    /// Parsed `interval`.
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.interval)
            .ok_or_else(|| ConfigError::InvalidDuration(self.interval.clone()))
    }

    /// Builder method: set the interval from a `Duration`.
    pub fn with_interval(self, interval: Duration) -> Self {
        Self {
            interval: format!("{}ms", interval.as_millis()),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Report a failed listing query as an empty result instead of an error.
    pub lenient: bool,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.probe.interval()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_client_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.client.password_env, "MYSQL_PWD");
        assert_eq!(config.client.dump_binary, "mariadb-dump");
        assert_eq!(config.probe.interval().unwrap(), Duration::from_secs(5));
        assert!(config.probe.quiet);
        assert!(!config.discovery.lenient);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
[client]
client_binary = "mysql"
password_env = "MARIADB_PWD"

[probe]
interval = "250ms"

[discovery]
lenient = true
"#,
        )
        .unwrap();

        assert_eq!(config.client.client_binary, "mysql");
        assert_eq!(config.client.password_env, "MARIADB_PWD");
        assert_eq!(config.client.username_key, "username");
        assert_eq!(config.probe.interval().unwrap(), Duration::from_millis(250));
        assert!(config.probe.quiet);
        assert!(config.discovery.lenient);
    }

    #[test]
    fn invalid_interval_is_rejected() {
        let err = Config::from_toml_str("[probe]\ninterval = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration(ref s) if s == "soon"));
    }

    #[test]
    fn renders_and_reparses() {
        let config = Config::default();
        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("mariadb-dump"));
        assert_eq!(Config::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn with_interval_round_trips_through_string() {
        let probe = ProbeConfig::default().with_interval(Duration::from_millis(1500));
        assert_eq!(probe.interval().unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn from_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("x"), None);
    }

    #[test]
    fn oversized_minutes_are_invalid() {
        assert_eq!(parse_duration("307445734561825861m"), None);
        let err = Config::from_toml_str("[probe]\ninterval = \"307445734561825861m\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration(_)));
    }
}
