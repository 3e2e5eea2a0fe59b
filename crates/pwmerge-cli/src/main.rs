//! pwmerge CLI - merge another host's account database into this one
//!
//! `pwmerge export` dumps the local passwd/group/shadow tables as JSON;
//! `pwmerge <snapshot> <dir>` merges such a snapshot into the local tables and
//! writes the result as `passwd.new`, `group.new` and `shadow.new`.

mod cli;
mod commands;
mod config;
mod error;


use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::completions::run_completions;
use crate::commands::export::run_export;
use crate::commands::merge::{run_merge, MergeOptions};
use crate::config::CliConfig;
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pwmerge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).map_err(CliError::Config)?;
    let etc_dir = config.resolve_etc_dir(cli.etc_dir.as_deref());

    match cli.command {
        Some(Commands::Export { output }) => run_export(&etc_dir, output.as_deref())?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => match (cli.remote.as_deref(), cli.output_dir.as_deref()) {
            (Some(remote), Some(output_dir)) => run_merge(&MergeOptions {
                remote,
                output_dir,
                etc_dir: &etc_dir,
                policy: config.merge_policy(cli.strict),
                dry_run: cli.dry_run,
                json: cli.json,
            })?,
            (None, None) => {
                Cli::command().print_help()?;
                println!();
            }
            _ => return Err(CliError::MissingArguments),
        },
    }

    Ok(())
}
