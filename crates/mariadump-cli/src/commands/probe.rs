use mariadump_core::Config;
use mariadump_session::{SystemRunner, list_databases, user_databases};

use super::{Target, TargetArgs};

pub fn wait(config: &Config, args: &TargetArgs) -> anyhow::Result<()> {
    let target = Target::load(config, args)?;
    let session = target.client_session()?;
    target.wait_until_ready(&session)?;
    println!("✓ Database is accepting connections");
    Ok(())
}

pub fn databases(config: &Config, args: &TargetArgs, all: bool) -> anyhow::Result<()> {
    let target = Target::load(config, args)?;
    let session = target.client_session()?;
    target.wait_until_ready(&session)?;

    let names = list_databases(&session, &SystemRunner, &target.config().discovery)?;
    let names = if all { names } else { user_databases(&names) };
    for name in names {
        println!("{name}");
    }
    Ok(())
}
