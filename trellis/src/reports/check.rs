//! Check command report data structures.

use std::path::PathBuf;

use trellis_compiler::Backend;

use super::output::{Output, Report};

/// Report data from manifest validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    /// App name.
    pub name: String,
    /// App description.
    pub description: Option<String>,
    /// Backend from the `[compiler]` table.
    pub backend: Backend,
    /// Module compiled by default.
    pub root_module: Option<String>,
    pub modules: Vec<ModuleSummary>,
    pub components: usize,
    pub directives: usize,
    pub pipes: usize,
    /// Problems that surface at compile time.
    pub warnings: Vec<String>,
}

/// One `[modules.<Name>]` entry.
#[derive(Debug)]
pub struct ModuleSummary {
    pub name: String,
    /// Number of declared types.
    pub declarations: usize,
    pub imports: Vec<String>,
    pub bootstrap: Vec<String>,
}

fn plural(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }
        if !self.warnings.is_empty() {
            out.newline();
        }

        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();

        out.key_value("App", &self.name);
        if let Some(desc) = &self.description {
            out.preformatted(desc);
        }
        out.key_value("Backend", self.backend.as_str());
        out.key_value(
            "Root module",
            self.root_module.as_deref().unwrap_or("(none)"),
        );
        out.key_value(
            "Declares",
            &[
                plural(self.components, "component"),
                plural(self.directives, "directive"),
                plural(self.pipes, "pipe"),
            ]
            .join(", "),
        );
        out.newline();

        out.section(&plural(self.modules.len(), "module"));
        for module in &self.modules {
            let mut line = format!(
                "{} ({})",
                module.name,
                plural(module.declarations, "declaration")
            );
            if !module.imports.is_empty() {
                line.push_str(&format!(", imports {}", module.imports.join(", ")));
            }
            if !module.bootstrap.is_empty() {
                line.push_str(&format!(", bootstraps {}", module.bootstrap.join(", ")));
            }
            out.list_item(&line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::BufferOutput;

    #[test]
    fn test_render_lists_modules() {
        let report = CheckReport {
            config_path: PathBuf::from("trellis.toml"),
            name: "demo".into(),
            description: None,
            backend: Backend::Interpret,
            root_module: Some("AppModule".into()),
            modules: vec![ModuleSummary {
                name: "AppModule".into(),
                declarations: 1,
                imports: vec!["SharedModule".into()],
                bootstrap: vec!["App".into()],
            }],
            components: 2,
            directives: 0,
            pipes: 1,
            warnings: vec![],
        };

        let mut out = BufferOutput::default();
        report.render(&mut out);
        assert_eq!(out.lines[0], "✓ trellis.toml is valid");
        assert!(out.lines.contains(&"Declares: 2 components, 0 directives, 1 pipe".to_string()));
        assert!(out.lines.contains(
            &"  - AppModule (1 declaration), imports SharedModule, bootstraps App".to_string()
        ));
    }
}
