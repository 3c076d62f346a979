//! Subcommand implementations and the shared target setup.

pub mod backup;
pub mod probe;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use mariadump_core::{AppBinding, Config, DirSecretStore};
use mariadump_session::{
    CommandSession, Prober, SessionBuilder, SystemClock, SystemRunner,
};
use tempfile::TempDir;
use tracing::debug;

/// Where the database is and how to authenticate against it.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Connection binding file (.toml or .json)
    #[arg(long)]
    pub binding: PathBuf,
    /// Root of mounted secrets, laid out as <dir>/<namespace>/<name>/<field>
    #[arg(long, default_value = "/etc/mariadump/secrets")]
    pub secret_dir: PathBuf,
    /// Directory for TLS material (a temporary directory when omitted)
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,
    /// Seconds to wait for the database to accept connections
    #[arg(long, default_value = "300")]
    pub wait_timeout: u64,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

enum Scratch {
    Owned(TempDir),
    Provided(PathBuf),
}

impl Scratch {
    fn path(&self) -> &Path {
        match self {
            Scratch::Owned(dir) => dir.path(),
            Scratch::Provided(path) => path,
        }
    }
}

/// Resolved target for one dump/restore attempt.
///
/// Owns the scratch directory, so TLS material lives exactly as long as
/// the attempt.
pub struct Target<'a> {
    config: &'a Config,
    binding: AppBinding,
    store: DirSecretStore,
    scratch: Scratch,
    wait_timeout: Duration,
}

impl<'a> Target<'a> {
    pub fn load(config: &'a Config, args: &TargetArgs) -> anyhow::Result<Self> {
        let binding = AppBinding::from_file(&args.binding)?;

        let scratch = match &args.scratch_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create scratch directory {}", dir.display())
                })?;
                Scratch::Provided(dir.clone())
            }
            None => Scratch::Owned(
                tempfile::Builder::new()
                    .prefix("mariadump-")
                    .tempdir()
                    .context("Failed to create scratch directory")?,
            ),
        };
        debug!(scratch = %scratch.path().display(), "using scratch directory");

        Ok(Self {
            config,
            binding,
            store: DirSecretStore::new(&args.secret_dir),
            scratch,
            wait_timeout: Duration::from_secs(args.wait_timeout),
        })
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Populate `builder` as credentials → connection → user args → TLS.
    pub fn session(
        &self,
        mut builder: SessionBuilder,
        user_args: &str,
    ) -> anyhow::Result<CommandSession> {
        builder.set_credentials(&self.store, &self.binding)?;
        builder.set_connection_target(&self.binding)?;
        builder.set_user_arguments(user_args);
        builder.set_tls_parameters(&self.binding, self.scratch.path())?;
        Ok(builder.finalize()?)
    }

    /// Client session without user flags, for probes and discovery.
    pub fn client_session(&self) -> anyhow::Result<CommandSession> {
        self.session(SessionBuilder::client(self.config.client.clone()), "")
    }

    pub fn wait_until_ready(&self, session: &CommandSession) -> anyhow::Result<()> {
        Prober::new(&SystemRunner, &SystemClock, &self.config.probe)?
            .wait_until_ready(session, self.wait_timeout)?;
        Ok(())
    }
}
