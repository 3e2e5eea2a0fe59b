use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "pwmerge")]
#[command(about = "Merge another host's passwd/group/shadow snapshot into this host's")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Snapshot written by `pwmerge export` on the other host
    #[arg(value_name = "REMOTE_SNAPSHOT")]
    pub remote: Option<PathBuf>,

    /// Directory receiving passwd.new, group.new and shadow.new
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the local passwd, group and shadow files
    #[arg(long, global = true, value_name = "PATH")]
    pub etc_dir: Option<PathBuf>,

    /// Optional path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Fail when remote system users or groups are missing locally
    #[arg(long)]
    pub strict: bool,

    /// Merge and report without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Output the merge report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export the local account database as a JSON snapshot
    Export {
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl From<CompletionShell> for clap_complete::Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Self::Bash,
            CompletionShell::Zsh => Self::Zsh,
            CompletionShell::Fish => Self::Fish,
        }
    }
}
