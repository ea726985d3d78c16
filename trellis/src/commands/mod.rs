mod check;
mod compile;
mod explain;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use compile::CompileCommand;
use eyre::Result;
use explain::ExplainCommand;

/// Extension trait for exiting on manifest errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for trellis_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "trellis")]
#[command(version)]
#[command(about = "Compile component apps described in TOML")]
pub(crate) struct Cli {
    /// Log compiler activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Check(cmd) => cmd.run(),
            Commands::Compile(cmd) => cmd.run(),
            Commands::Explain(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate trellis.toml and summarize the app graph
    Check(CheckCommand),

    /// Compile a module and all of its components
    Compile(CompileCommand),

    /// Instantiate a component and print its render tree
    Explain(ExplainCommand),
}
