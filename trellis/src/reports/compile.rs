//! Compile command report data structures.

use std::path::PathBuf;

use serde::Serialize;
use trellis_compiler::{Backend, runtime::cache::CacheStats};

use super::output::{Output, Report};

/// Report data from compiling a module.
#[derive(Debug, Serialize)]
pub struct CompileReport {
    pub app: String,
    pub module: String,
    pub backend: Backend,
    /// `sync` or `async`.
    pub mode: &'static str,
    /// Factories the module factory hands out.
    pub entry_components: usize,
    /// Host factories of every component in the module graph.
    pub components: Vec<CompiledComponent>,
    pub stats: CacheStats,
    /// Synthesized paths of generated sources.
    pub generated: Vec<String>,
    pub out_dir: Option<PathBuf>,
    /// Files written under `out_dir`.
    pub written: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CompiledComponent {
    pub component: String,
    pub selector: String,
    /// Whether the host template finished its body pass.
    pub compiled: bool,
}

impl Report for CompileReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        out.title(&format!("Compiled {} ({})", self.module, self.app));
        out.key_value_indented("backend", self.backend.as_str());
        out.key_value_indented("mode", self.mode);
        out.key_value_indented("entry components", &self.entry_components.to_string());
        out.newline();

        out.section("Components");
        for component in &self.components {
            let state = if component.compiled { "" } else { " (pending)" };
            out.list_item(&format!(
                "{} <{}>{}",
                component.component, component.selector, state
            ));
        }
        out.newline();

        out.section("Cache");
        out.key_value_indented("templates", &self.stats.templates.to_string());
        out.key_value_indented("host templates", &self.stats.host_templates.to_string());
        out.key_value_indented(
            "directive wrappers",
            &self.stats.directive_wrappers.to_string(),
        );
        out.key_value_indented("module factories", &self.stats.module_factories.to_string());
        out.key_value_indented("compiled", &self.stats.compiled.to_string());

        if !self.generated.is_empty() {
            out.newline();
            out.section("Generated");
            if self.written.is_empty() {
                for path in &self.generated {
                    out.list_item(path);
                }
            } else {
                for path in &self.written {
                    out.added_item(&path.display().to_string());
                }
            }
        }
    }
}
