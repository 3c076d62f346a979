use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::TargetArgs;

#[derive(Parser)]
#[command(
    name = "mariadump",
    about = "Dump and restore MariaDB databases described by a connection binding",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to mariadump.toml (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Block until the database accepts connections
    Wait {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List databases on the server
    Databases {
        #[command(flatten)]
        target: TargetArgs,
        /// Include system schemas and empty entries
        #[arg(long)]
        all: bool,
    },
    /// Dump the database into <output-dir>/<dump file name>
    Dump {
        #[command(flatten)]
        target: TargetArgs,
        /// Extra flags passed verbatim to the dump binary
        #[arg(long, default_value = "--all-databases", allow_hyphen_values = true)]
        mariadb_args: String,
        /// Directory receiving the dump file
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Restore a dump file into the database
    Restore {
        #[command(flatten)]
        target: TargetArgs,
        /// Extra flags passed verbatim to the restore binary
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        mariadb_args: String,
        /// Dump file to restore
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,mariadump=debug,mariadump_session=debug")
            }),
        )
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Wait { target } => commands::probe::wait(&config, &target),
        Commands::Databases { target, all } => commands::probe::databases(&config, &target, all),
        Commands::Dump {
            target,
            mariadb_args,
            output_dir,
        } => commands::backup::dump(&config, &target, &mariadb_args, &output_dir),
        Commands::Restore {
            target,
            mariadb_args,
            file,
        } => commands::backup::restore(&config, &target, &mariadb_args, &file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dump_with_defaults() {
        let cli = Cli::try_parse_from([
            "mariadump",
            "dump",
            "--binding",
            "binding.toml",
        ])
        .unwrap();

        match cli.command {
            Commands::Dump {
                target,
                mariadb_args,
                output_dir,
            } => {
                assert_eq!(target.binding, PathBuf::from("binding.toml"));
                assert_eq!(target.wait_timeout, 300);
                assert_eq!(mariadb_args, "--all-databases");
                assert_eq!(output_dir, PathBuf::from("."));
            }
            _ => panic!("expected dump"),
        }
    }

    #[test]
    fn parses_hyphenated_user_args_and_global_config() {
        let cli = Cli::try_parse_from([
            "mariadump",
            "restore",
            "--binding",
            "b.json",
            "--mariadb-args",
            "--one-database app",
            "--file",
            "dumpfile.sql",
            "--config",
            "mariadump.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("mariadump.toml")));
        match cli.command {
            Commands::Restore {
                mariadb_args, file, ..
            } => {
                assert_eq!(mariadb_args, "--one-database app");
                assert_eq!(file, PathBuf::from("dumpfile.sql"));
            }
            _ => panic!("expected restore"),
        }
    }

    #[test]
    fn binding_is_required() {
        assert!(Cli::try_parse_from(["mariadump", "wait"]).is_err());
    }

    #[test]
    fn wait_takes_no_user_args() {
        let result = Cli::try_parse_from([
            "mariadump",
            "wait",
            "--binding",
            "b.toml",
            "--mariadb-args",
            "--all-databases",
        ]);
        assert!(result.is_err());
    }
}
