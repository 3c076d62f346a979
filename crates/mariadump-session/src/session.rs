//! Session builder: accumulates the argument list and environment of a
//! single MariaDB client invocation.
//!
//! Each concern appends to the same ordered argument list, so the setters
//! are meant to be called as credentials → connection target → user
//! arguments → TLS. [`SessionBuilder::finalize`] checks the result before
//! anything is executed.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use mariadump_core::{ClientConfig, ConnectionBinding, SecretStore};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};
use crate::exec::Invocation;

/// Incrementally populated client session.
pub struct SessionBuilder {
    config: ClientConfig,
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    has_credentials: bool,
    has_target: bool,
}

impl SessionBuilder {
    /// Start a session for `program`.
    pub fn new(config: ClientConfig, program: impl Into<String>) -> Self {
        Self {
            config,
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            has_credentials: false,
            has_target: false,
        }
    }

    /// Session for the interactive client (probes, restores).
    pub fn client(config: ClientConfig) -> Self {
        let program = config.client_binary.clone();
        Self::new(config, program)
    }

    /// Session for the dump binary.
    pub fn dump(config: ClientConfig) -> Self {
        let program = config.dump_binary.clone();
        Self::new(config, program)
    }

    /// Session for the restore binary.
    pub fn restore(config: ClientConfig) -> Self {
        let program = config.restore_binary.clone();
        Self::new(config, program)
    }

    /// Fetch the binding's secret, append `-u <username>` and export the
    /// password through the configured environment variable.
    pub fn set_credentials(
        &mut self,
        store: &dyn SecretStore,
        binding: &dyn ConnectionBinding,
    ) -> SessionResult<()> {
        let secret_ref = binding.secret_ref().ok_or_else(|| {
            SessionError::CredentialResolution("binding has no secret reference".to_string())
        })?;

        let mut data = store
            .get_secret(&secret_ref.namespace, &secret_ref.name)
            .map_err(|e| SessionError::CredentialResolution(e.to_string()))?;
        binding
            .transform_secret(&mut data)
            .map_err(|e| SessionError::CredentialResolution(e.to_string()))?;

        let field = |key: &str| -> SessionResult<String> {
            let raw = data.get(key).ok_or_else(|| {
                SessionError::CredentialResolution(format!(
                    "secret {}/{} has no {key:?} field",
                    secret_ref.namespace, secret_ref.name
                ))
            })?;
            String::from_utf8(raw.clone()).map_err(|_| {
                SessionError::CredentialResolution(format!(
                    "secret {}/{} field {key:?} is not valid UTF-8",
                    secret_ref.namespace, secret_ref.name
                ))
            })
        };
        let username = field(&self.config.username_key)?;
        let password = field(&self.config.password_key)?;

        self.args.push("-u".to_string());
        self.args.push(username);
        self.env.insert(self.config.password_env.clone(), password);
        self.has_credentials = true;

        debug!(secret = %secret_ref.name, "credentials set");
        Ok(())
    }

    /// Append `-h <hostname>` and, for a nonzero port, `--port=<port>`.
    pub fn set_connection_target(&mut self, binding: &dyn ConnectionBinding) -> SessionResult<()> {
        let hostname = binding
            .hostname()
            .map_err(SessionError::ConnectionResolution)?;
        let port = binding.port().map_err(SessionError::ConnectionResolution)?;

        self.args.push("-h".to_string());
        self.args.push(hostname);
        if port != 0 {
            self.args.push(format!("--port={port}"));
        }
        self.has_target = true;
        Ok(())
    }

    /// Append whitespace-separated user flags verbatim, in order.
    ///
    /// Flags are not validated; the caller is trusted.
    pub fn set_user_arguments(&mut self, raw: &str) {
        self.args.extend(raw.split_whitespace().map(str::to_string));
    }

    /// Write the binding's CA bundle into `scratch_dir` and append
    /// `--ssl-ca=<path>`. No-op without a CA bundle.
    ///
    /// Calling this twice appends the flag twice.
    pub fn set_tls_parameters(
        &mut self,
        binding: &dyn ConnectionBinding,
        scratch_dir: &Path,
    ) -> SessionResult<()> {
        let Some(ca_bundle) = binding.ca_bundle() else {
            return Ok(());
        };

        let path = scratch_dir.join(&self.config.ca_file_name);
        std::fs::write(&path, ca_bundle).map_err(|source| SessionError::IoWrite {
            path: path.clone(),
            source,
        })?;

        self.args.push(format!("--ssl-ca={}", path.display()));
        debug!(path = %path.display(), "wrote CA bundle");
        Ok(())
    }

    /// Arguments accumulated so far.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Validate and freeze the session.
    ///
    /// Requires credentials and a connection target, exactly one host flag
    /// and at most one port flag (user arguments included).
    pub fn finalize(self) -> SessionResult<CommandSession> {
        if !self.has_credentials {
            return Err(SessionError::InvalidSession(
                "credentials were never set".to_string(),
            ));
        }
        if !self.has_target {
            return Err(SessionError::InvalidSession(
                "connection target was never set".to_string(),
            ));
        }

        let hosts = self.args.iter().filter(|a| is_host_flag(a)).count();
        if hosts != 1 {
            return Err(SessionError::InvalidSession(format!(
                "expected exactly one host flag, found {hosts}"
            )));
        }
        let ports = self.args.iter().filter(|a| is_port_flag(a)).count();
        if ports > 1 {
            return Err(SessionError::InvalidSession(format!(
                "expected at most one port flag, found {ports}"
            )));
        }

        info!(program = %self.program, args = ?self.args, "session ready");

        Ok(CommandSession {
            config: self.config,
            program: self.program,
            args: self.args,
            env: self.env,
        })
    }
}

fn is_host_flag(arg: &str) -> bool {
    arg == "--host" || arg.starts_with("--host=") || arg.starts_with("-h")
}

fn is_port_flag(arg: &str) -> bool {
    arg == "--port" || arg.starts_with("--port=") || arg.starts_with("-P")
}

/// A validated, immutable client session.
///
/// Every execution derives its own [`Invocation`] with copies of the
/// arguments and environment.
#[derive(Clone)]
pub struct CommandSession {
    config: ClientConfig,
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl fmt::Debug for CommandSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted: HashMap<&str, &str> =
            self.env.keys().map(|k| (k.as_str(), "<redacted>")).collect();
        f.debug_struct("CommandSession")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &redacted)
            .finish()
    }
}

impl CommandSession {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Invocation of the session's own program with `extra` appended.
    pub fn invocation(&self, extra: &[&str]) -> Invocation {
        self.invocation_of(&self.program, extra)
    }

    /// Invocation of the interactive client with the session's arguments,
    /// used for probe and discovery queries.
    pub fn client_invocation(&self, extra: &[&str]) -> Invocation {
        self.invocation_of(&self.config.client_binary, extra)
    }

    fn invocation_of(&self, program: &str, extra: &[&str]) -> Invocation {
        let mut args = self.args.clone();
        args.extend(extra.iter().map(|a| a.to_string()));
        Invocation::new(program, args).with_env(self.env.clone())
    }
}
