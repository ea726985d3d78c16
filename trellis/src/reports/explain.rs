//! Explain command report data structures.

use trellis_compiler::Backend;

use super::output::{Output, Report};

/// Report data from instantiating a component.
#[derive(Debug)]
pub struct ExplainReport {
    pub component: String,
    pub selector: String,
    /// Module declaring the component.
    pub module: String,
    pub backend: Backend,
    /// Views instantiated, host included.
    pub views: usize,
    /// Indented render tree, one node per line.
    pub tree: Vec<String>,
}

impl Report for ExplainReport {
    fn render(&self, out: &mut dyn Output) {
        out.title(&format!("{} <{}>", self.component, self.selector));
        out.key_value("Module", &self.module);
        out.key_value("Backend", self.backend.as_str());
        out.key_value("Views", &self.views.to_string());
        out.newline();

        out.section("Render tree");
        out.preformatted(&self.tree.join("\n"));
    }
}
