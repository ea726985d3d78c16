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
pub struct ExplainCommand {
    /// Path to trellis.toml (defaults to ./trellis.toml)
    #[arg(short, long, default_value = "trellis.toml")]
    pub config: PathBuf,

    /// Module to compile (defaults to the manifest's root module)
    #[arg(short, long)]
    pub module: Option<String>,

    /// Component to instantiate (defaults to the module's first bootstrap component)
    #[arg(long)]
    pub component: Option<String>,
}

impl ExplainCommand {
    pub fn run(&self) -> Result<()> {
        let file = TrellisToml::open(&self.config).unwrap_or_exit();

        let report = ops::explain(&file, self.module.as_deref(), self.component.as_deref())?;
        report.render(&mut TerminalOutput::new());

        Ok(())
    }
}
