//! Database discovery via `SHOW DATABASES`.

use mariadump_core::DiscoveryConfig;
use tracing::{info, warn};

use crate::error::SessionResult;
use crate::exec::CommandRunner;
use crate::session::CommandSession;

/// Schemas owned by the server itself.
pub const SYSTEM_SCHEMAS: [&str; 4] = ["information_schema", "performance_schema", "mysql", "sys"];

/// List the database names visible to the session's credentials.
///
/// The result is the raw line split of the client's silent output, so a
/// trailing newline yields a trailing empty entry; see [`user_databases`].
///
/// A failed query is an error unless `config.lenient` is set, in which case
/// it is logged and reported as an empty list.
pub fn list_databases(
    session: &CommandSession,
    runner: &dyn CommandRunner,
    config: &DiscoveryConfig,
) -> SessionResult<Vec<String>> {
    info!("querying database names");

    let invocation = session.client_invocation(&["-s", "-e", "SHOW DATABASES;"]);
    match runner.run(&invocation) {
        Ok(output) => {
            let databases = parse_database_list(&output);
            info!(?databases, "discovered databases");
            Ok(databases)
        }
        Err(e) if config.lenient => {
            warn!(error = %e, "database listing failed, reporting none");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Split newline-delimited client output into names, keeping empty entries.
pub fn parse_database_list(output: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(output)
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Drop empty entries and server-owned schemas.
pub fn user_databases(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty() && !SYSTEM_SCHEMAS.contains(n))
        .map(str::to_string)
        .collect()
}
