use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use trellis_compiler::Backend;
use trellis_manifest::TrellisToml;

use super::UnwrapOrExit;
use crate::{
    ops::{self, CompileOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CompileCommand {
    /// Path to trellis.toml (defaults to ./trellis.toml)
    #[arg(short, long, default_value = "trellis.toml")]
    pub config: PathBuf,

    /// Module to compile (defaults to the manifest's root module)
    #[arg(short, long)]
    pub module: Option<String>,

    /// Override the backend from the [compiler] table
    #[arg(short, long)]
    pub backend: Option<Backend>,

    /// Load external templates and stylesheets before compiling
    #[arg(long = "async")]
    pub async_mode: bool,

    /// Write generated sources to this directory
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CompileCommand {
    pub fn run(&self) -> Result<()> {
        let file = TrellisToml::open(&self.config).unwrap_or_exit();

        let options = CompileOptions {
            module: self.module.clone(),
            backend: self.backend,
            async_mode: self.async_mode,
            out_dir: self.out_dir.clone(),
        };
        let report = ops::compile(&file, &options)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            report.render(&mut TerminalOutput::new());
        }

        Ok(())
    }
}
