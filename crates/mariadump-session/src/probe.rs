//! Readiness probing.
//!
//! The client has no native "wait for server" mode, so readiness is a
//! fixed-interval poll of `SELECT 1` bounded by a caller-supplied timeout.
//! Every failed attempt inside the window counts as "not ready yet".

use std::time::{Duration, Instant};

use mariadump_core::ProbeConfig;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::exec::{CommandRunner, StdoutMode};
use crate::session::CommandSession;

/// Lightweight no-op query used to test connectivity.
const PROBE_QUERY: &str = "SELECT 1;";

/// Time source for the poll loop.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock; `sleep` blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Polls a session until the server accepts connections.
pub struct Prober<'a> {
    runner: &'a dyn CommandRunner,
    clock: &'a dyn Clock,
    interval: Duration,
    quiet: bool,
}

impl<'a> Prober<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        clock: &'a dyn Clock,
        config: &ProbeConfig,
    ) -> SessionResult<Self> {
        Ok(Self {
            runner,
            clock,
            interval: config.interval()?,
            quiet: config.quiet,
        })
    }

    /// Block until `SELECT 1` succeeds or `timeout` elapses.
    ///
    /// The first attempt runs immediately; later attempts run every
    /// `interval`. No attempt is started past the deadline.
    pub fn wait_until_ready(
        &self,
        session: &CommandSession,
        timeout: Duration,
    ) -> SessionResult<()> {
        info!("waiting for the database to be ready");

        let stdout = if self.quiet {
            StdoutMode::Discard
        } else {
            StdoutMode::Capture
        };
        let invocation = session
            .client_invocation(&["-e", PROBE_QUERY])
            .with_stdout(stdout);
        debug!(args = ?invocation.args, "probe arguments");

        let start = self.clock.now();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let last_error = match self.runner.run(&invocation) {
                Ok(output) => {
                    if !output.is_empty() {
                        debug!(output = %String::from_utf8_lossy(&output).trim(), "probe output");
                    }
                    info!(attempts, "database is accepting connections");
                    return Ok(());
                }
                Err(e) => e.to_string(),
            };

            let elapsed = self.clock.now().saturating_duration_since(start);
            if elapsed.saturating_add(self.interval) > timeout {
                warn!(attempts, ?elapsed, "database did not become ready");
                return Err(SessionError::ReadinessTimeout {
                    waited: elapsed,
                    attempts,
                    last_error,
                });
            }

            info!(
                attempt = attempts,
                reason = %last_error,
                "unable to connect to the database, retrying in {:?}",
                self.interval
            );
            self.clock.sleep(self.interval);
        }
    }
}
