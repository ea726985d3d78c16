use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use trellis_manifest::TrellisToml;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to trellis.toml (defaults to ./trellis.toml)
    #[arg(short, long, default_value = "trellis.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let file = TrellisToml::open(&self.config).unwrap_or_exit();

        let report = ops::check(&file);
        report.render(&mut TerminalOutput::new());

        Ok(())
    }
}
