use std::path::Path;

use anyhow::Context;

use mariadump_core::Config;
use mariadump_session::{SessionBuilder, SystemRunner, dump_to_file, restore_from_file};

use super::{Target, TargetArgs};

pub fn dump(
    config: &Config,
    args: &TargetArgs,
    mariadb_args: &str,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let target = Target::load(config, args)?;
    target.wait_until_ready(&target.client_session()?)?;

    let session = target.session(SessionBuilder::dump(config.client.clone()), mariadb_args)?;
    let path = dump_to_file(&session, &SystemRunner, output_dir).context("Dump failed")?;
    println!("✓ Dumped to {}", path.display());
    Ok(())
}

pub fn restore(
    config: &Config,
    args: &TargetArgs,
    mariadb_args: &str,
    file: &Path,
) -> anyhow::Result<()> {
    let target = Target::load(config, args)?;
    target.wait_until_ready(&target.client_session()?)?;

    let session =
        target.session(SessionBuilder::restore(config.client.clone()), mariadb_args)?;
    restore_from_file(&session, &SystemRunner, file).context("Restore failed")?;
    println!("✓ Restored {}", file.display());
    Ok(())
}
