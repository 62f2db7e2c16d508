use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{build_command, info_command};

#[derive(Parser, Debug)]
#[command(name = "vib-cargo")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the plugin description the host receives
    Info,
    /// Generate the build command for a module, fetching its sources
    #[command(visible_alias = "b")]
    Build(BuildArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Module descriptor JSON file
    #[arg(short, long)]
    pub module: PathBuf,

    /// Recipe context JSON file (an empty recipe when omitted)
    #[arg(short, long)]
    pub recipe: Option<PathBuf>,

    /// Target architecture, e.g. amd64 or arm64
    #[arg(short, long, default_value = "amd64")]
    pub arch: String,

    /// Settings JSON file overriding the plugin defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the command without downloading any source
    #[arg(long)]
    pub no_fetch: bool,
}

impl Cli {
    /// Runs the selected command and returns the process exit code
    pub fn execute(self) -> Result<i32> {
        match self.command {
            Commands::Info => {
                info_command();
                Ok(0)
            }
            Commands::Build(args) => build_command(&args),
        }
    }
}
