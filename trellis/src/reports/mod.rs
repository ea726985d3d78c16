//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them to an Output target.

mod check;
mod compile;
mod explain;
mod output;

pub use check::{CheckReport, ModuleSummary};
pub use compile::{CompileReport, CompiledComponent};
pub use explain::ExplainReport;
pub use output::{Report, TerminalOutput};
#[cfg(test)]
pub(crate) use output::BufferOutput;
