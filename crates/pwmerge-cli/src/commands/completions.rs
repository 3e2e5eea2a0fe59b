use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::Shell;
use tracing::info;

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

/// Print the completion script for `shell`, or write it to `output_path`.
///
/// The script is registered under the binary name clap derives for [`Cli`].
pub fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let mut command = Cli::command();
    let binary = command.get_name().to_string();
    let mut script = Vec::new();
    clap_complete::generate(Shell::from(shell), &mut command, binary, &mut script);

    match output_path {
        Some(path) => {
            std::fs::write(path, &script)?;
            info!(?shell, path = %path.display(), "wrote completion script");
            println!("{}", path.display());
        }
        None => io::stdout().write_all(&script)?,
    }

    Ok(())
}
