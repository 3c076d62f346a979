//! Dump and restore execution.
//!
//! The dump streams the dump binary's stdout into
//! `<output_dir>/<dump_file_name>`; the restore feeds a dump file to the
//! restore binary's stdin.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{SessionError, SessionResult};
use crate::exec::{CommandRunner, StdoutMode};
use crate::session::CommandSession;

/// Run the session's program and write its output to the dump file.
///
/// `output_dir` is created if missing. Returns the dump file path.
pub fn dump_to_file(
    session: &CommandSession,
    runner: &dyn CommandRunner,
    output_dir: &Path,
) -> SessionResult<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|source| SessionError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let dump_file = output_dir.join(&session.config().dump_file_name);

    info!(program = %session.program(), path = %dump_file.display(), "dumping database");
    let invocation = session
        .invocation(&[])
        .with_stdout(StdoutMode::File(dump_file.clone()));
    runner.run(&invocation)?;

    let size = std::fs::metadata(&dump_file).map(|m| m.len()).unwrap_or(0);
    info!(path = %dump_file.display(), bytes = size, "dump complete");
    Ok(dump_file)
}

/// Feed `dump_file` to the session's program.
pub fn restore_from_file(
    session: &CommandSession,
    runner: &dyn CommandRunner,
    dump_file: &Path,
) -> SessionResult<()> {
    if !dump_file.is_file() {
        return Err(SessionError::Io {
            path: dump_file.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "dump file not found"),
        });
    }

    info!(program = %session.program(), path = %dump_file.display(), "restoring database");
    let invocation = session
        .invocation(&[])
        .with_stdin(dump_file.to_path_buf())
        .with_stdout(StdoutMode::Discard);
    runner.run(&invocation)?;

    info!("restore complete");
    Ok(())
}
