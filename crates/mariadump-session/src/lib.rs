//! mariadump-session: MariaDB client sessions for dump and restore.
//!
//! Turns a connection binding plus user-supplied flags into a
//! credential-bearing invocation of the MariaDB client binaries, and
//! gates dump/restore on the server accepting connections.
//!
//! # Architecture
//!
//! ```text
//! SessionBuilder
//!   ├── set_credentials()        -u <user>, password via env
//!   ├── set_connection_target()  -h <host> [--port=<port>]
//!   ├── set_user_arguments()     verbatim user flags
//!   ├── set_tls_parameters()     --ssl-ca=<scratch>/ca.crt
//!   └── finalize() → CommandSession
//!
//! CommandSession
//!   ├── Prober::wait_until_ready()   SELECT 1, fixed interval
//!   ├── list_databases()             SHOW DATABASES
//!   └── dump_to_file() / restore_from_file()
//! ```
//!
//! Every command goes through a [`CommandRunner`], so the whole flow can
//! be driven by a scripted runner and a virtual [`Clock`] in tests.

pub mod discovery;
pub mod dump;
pub mod error;
pub mod exec;
pub mod probe;
pub mod session;

pub use discovery::{list_databases, parse_database_list, user_databases};
pub use dump::{dump_to_file, restore_from_file};
pub use error::{SessionError, SessionResult};
pub use exec::{CommandRunner, ExecError, Invocation, StdoutMode, SystemRunner};
pub use probe::{Clock, Prober, SystemClock};
pub use session::{CommandSession, SessionBuilder};

#[cfg(test)]
pub(crate) mod test_support;
