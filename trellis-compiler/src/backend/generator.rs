use std::cell::RefCell;

use serde::Serialize;
use tracing::debug;
use trellis_ir::{Expr, Literal, NodeExpr, PlaceholderId, Statement, ViewDefExpr};

use super::{CodeBuilder, Interpreter, Value};
use crate::{Result, compilers::CompileResult};

/// Source emitted for one compiled artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSource {
    /// Synthesized path, e.g. `/AppModule/AppComponent/component.factory.rs`.
    pub path: String,
    pub source: String,
}

/// Renders statements to source under a synthesized path, then evaluates them.
#[derive(Debug, Default)]
pub struct Generator {
    interpreter: Interpreter,
    sources: RefCell<Vec<GeneratedSource>>,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self, path: &str, result: &CompileResult) -> Result<Value> {
        let source = render(path, result);
        debug!(path, bytes = source.len(), "generated source");

        let mut sources = self.sources.borrow_mut();
        let generated = GeneratedSource {
            path: path.to_string(),
            source,
        };
        match sources.iter_mut().find(|s| s.path == path) {
            Some(existing) => *existing = generated,
            None => sources.push(generated),
        }
        drop(sources);

        self.interpreter.interpret(result)
    }

    /// Every source generated so far, in generation order. A path that was
    /// generated again after a cache clear holds its latest source.
    pub fn sources(&self) -> Vec<GeneratedSource> {
        self.sources.borrow().clone()
    }

    pub fn clear(&self) {
        self.sources.borrow_mut().clear();
    }
}

/// Render a compile result. Placeholders are numbered by their position in
/// the result's dependency list.
pub fn render(path: &str, result: &CompileResult) -> String {
    let deps = Placeholders(
        result
            .dependencies
            .iter()
            .map(|d| d.placeholder().id())
            .collect(),
    );

    let mut b = CodeBuilder::new().comment(path);
    for (index, dependency) in result.dependencies.iter().enumerate() {
        b.push_line(&format!("// ${index}: {}", dependency.describe()));
    }
    b.push_blank();

    for statement in &result.statements {
        match statement {
            Statement::Comment(text) => {
                b.push_line(&format!("// {text}"));
            }
            Statement::DeclareVar {
                name,
                value: Expr::ViewDef(view),
            } => {
                b.push_open(&format!("let {name} = ViewDef {{"));
                view_body(&mut b, view, &deps);
                b.push_close("};");
            }
            Statement::DeclareVar { name, value } => {
                b.push_line(&format!("let {name} = {};", deps.inline(value)));
            }
        }
    }

    b.blank()
        .line(&format!("export {};", result.exported_name))
        .build()
}

struct Placeholders(Vec<PlaceholderId>);

impl Placeholders {
    fn name(&self, id: PlaceholderId) -> String {
        match self.0.iter().position(|p| *p == id) {
            Some(index) => format!("${index}"),
            None => format!("$unbound{}", id.0),
        }
    }

    fn inline(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(Literal::Str(s)) => format!("{s:?}"),
            Expr::Literal(Literal::Int(i)) => i.to_string(),
            Expr::Literal(Literal::Bool(b)) => b.to_string(),
            Expr::Var(name) => name.clone(),
            Expr::Array(items) => self.list(items),
            Expr::Placeholder(id) => self.name(*id),
            Expr::ViewDef(view) => format!("ViewDef {{ class: {:?}, .. }}", view.class_name),
            Expr::DirectiveWrapper { directive, inputs } => {
                format!("DirectiveWrapper({:?}, inputs: {inputs:?})", directive.name())
            }
            Expr::ModuleFactory { module, components } => {
                format!(
                    "ModuleFactory({:?}, components: {})",
                    module.name(),
                    self.list(components)
                )
            }
        }
    }

    fn list(&self, items: &[Expr]) -> String {
        let items: Vec<String> = items.iter().map(|item| self.inline(item)).collect();
        format!("[{}]", items.join(", "))
    }
}

fn view_body(b: &mut CodeBuilder, view: &ViewDefExpr, deps: &Placeholders) {
    b.push_line(&format!("class: {:?},", view.class_name));
    b.push_line(&format!("styles: {},", deps.inline(&view.styles)));
    b.push_line(&format!("animations: {:?},", view.animations));
    b.push_line(&format!(
        "entry_factories: {},",
        deps.list(&view.entry_factories)
    ));
    if view.nodes.is_empty() {
        b.push_line("nodes: [],");
        return;
    }
    b.push_open("nodes: [");
    for node in &view.nodes {
        node_line(b, node, deps);
    }
    b.push_close("],");
}

fn node_line(b: &mut CodeBuilder, node: &NodeExpr, deps: &Placeholders) {
    match node {
        NodeExpr::Text { value } => {
            b.push_line(&format!("Text({value:?}),"));
        }
        NodeExpr::Element {
            tag,
            attrs,
            component,
            directives,
            children,
        } => {
            let component = component
                .as_ref()
                .map_or_else(|| "None".to_string(), |c| format!("Some({})", deps.inline(c)));
            let head = format!(
                "Element({tag:?}, attrs: {attrs:?}, component: {component}, directives: {})",
                deps.list(directives)
            );
            if children.is_empty() {
                b.push_line(&format!("{head},"));
            } else {
                b.push_open(&format!("{head} ["));
                for child in children {
                    node_line(b, child, deps);
                }
                b.push_close("],");
            }
        }
        NodeExpr::Anchor { template: None } => {
            b.push_line("Anchor,");
        }
        NodeExpr::Anchor {
            template: Some(view),
        } => {
            b.push_open("Anchor(ViewDef {");
            view_body(b, view, deps);
            b.push_close("}),");
        }
    }
}
