//! Scripted runner and virtual clock shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use mariadump_core::{AppBinding, ClientEndpoint, MemorySecretStore, SecretName};

use crate::exec::{CommandRunner, ExecError, Invocation};
use crate::probe::Clock;
use crate::session::SessionBuilder;

/// Binding `demo/maria` reachable at `url`, credentials in `demo/maria-auth`.
pub fn binding(url: &str) -> AppBinding {
    AppBinding {
        namespace: "demo".to_string(),
        name: "maria".to_string(),
        client_config: ClientEndpoint {
            url: Some(url.to_string()),
            ..Default::default()
        },
        secret: Some(SecretName {
            name: "maria-auth".to_string(),
        }),
        secret_key_aliases: Default::default(),
    }
}

/// Store holding `root` / `secret` for [`binding`].
pub fn store() -> MemorySecretStore {
    MemorySecretStore::new().with_secret(
        "demo",
        "maria-auth",
        &[("username", "root"), ("password", "secret")],
    )
}

/// Apply credentials and connection target for [`binding`] at `url`.
pub fn populate(mut builder: SessionBuilder, url: &str) -> SessionBuilder {
    let binding = binding(url);
    builder.set_credentials(&store(), &binding).unwrap();
    builder.set_connection_target(&binding).unwrap();
    builder
}

/// Replays queued results and records every invocation.
#[derive(Default)]
pub struct ScriptedRunner {
    results: RefCell<VecDeque<Result<Vec<u8>, ExecError>>>,
    pub calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(self, stdout: &str) -> Self {
        self.results
            .borrow_mut()
            .push_back(Ok(stdout.as_bytes().to_vec()));
        self
    }

    pub fn then_fail(self, stderr: &str) -> Self {
        self.results.borrow_mut().push_back(Err(exit_error(stderr)));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<Vec<u8>, ExecError> {
        self.calls.borrow_mut().push(invocation.clone());
        self.results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(exit_error("script exhausted")))
    }
}

pub fn exit_error(stderr: &str) -> ExecError {
    ExecError::Exit {
        program: "mariadb".to_string(),
        code: Some(1),
        stderr: stderr.to_string(),
    }
}

/// Clock whose `sleep` only advances virtual time.
pub struct FakeClock {
    start: Instant,
    elapsed: Cell<Duration>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.elapsed.set(self.elapsed.get() + duration);
    }
}
