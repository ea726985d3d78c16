//! Explain operation - instantiate a component and describe its views.

use eyre::{Context, Result, eyre};
use futures::executor::block_on;
use trellis_compiler::RuntimeCompiler;
use trellis_ir::TypeKey;
use trellis_manifest::TrellisToml;
use trellis_view::{AppView, CheckMode, RenderNode};

use super::module_key;
use crate::reports::ExplainReport;

/// Execute the explain operation.
///
/// Compiles the module graph, creates the host view of `component` (or the
/// module's first bootstrap component) and runs one change-detection pass.
pub fn explain(
    file: &TrellisToml,
    module: Option<&str>,
    component: Option<&str>,
) -> Result<ExplainReport> {
    let manifest = file.manifest();
    let module = module_key(manifest, module)?;
    let compiler = RuntimeCompiler::from_toml(file);

    let compiled = block_on(compiler.compile_module_and_all_components_async(&module))
        .wrap_err_with(|| format!("Failed to compile {module}"))?;

    let key = match component {
        Some(name) => TypeKey::new(name),
        None => manifest
            .modules
            .get(module.name())
            .and_then(|decl| decl.bootstrap.first())
            .map(TypeKey::new)
            .or_else(|| {
                compiled
                    .component_factories
                    .first()
                    .map(|factory| factory.component().clone())
            })
            .ok_or_else(|| eyre!("{module} has no components to explain"))?,
    };

    let factory = compiler
        .compile_host_component(&key)
        .wrap_err_with(|| format!("Failed to compile the host of {key}"))?;
    let mut view = factory.create(None)?;
    view.detect_changes(CheckMode::Update)?;

    let mut tree = Vec::new();
    describe_view(&view, 0, &mut tree);

    let mut views = 0;
    count_views(&view, &mut views);

    Ok(ExplainReport {
        component: key.to_string(),
        selector: factory.selector().to_string(),
        module: compiler
            .template(&key)
            .map(|template| template.module().to_string())
            .unwrap_or_else(|| module.to_string()),
        backend: compiler.config().backend,
        views,
        tree,
    })
}

fn describe_view(view: &AppView, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!(
        "{}{} {} ({:?})",
        "  ".repeat(depth),
        view.class(),
        view.id(),
        view.view_type()
    ));
    for node in view.root_nodes() {
        describe_node(view, node, depth + 1, lines);
    }
    for child in view.component_views() {
        describe_view(child, depth + 1, lines);
    }
}

fn describe_node(view: &AppView, node: &RenderNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match node {
        RenderNode::Element {
            tag,
            attrs,
            children,
        } => {
            let attrs: String = attrs
                .iter()
                .map(|(name, value)| format!(" {name}=\"{value}\""))
                .collect();
            lines.push(format!("{indent}<{tag}{attrs}>"));
            for child in children {
                describe_node(view, child, depth + 1, lines);
            }
        }
        RenderNode::Text(text) => lines.push(format!("{indent}{text:?}")),
        RenderNode::Anchor { container } => {
            let nested = view
                .containers()
                .get(*container)
                .map(|c| c.nested_views())
                .unwrap_or_default();
            lines.push(format!(
                "{indent}<!-- container {container}: {} view(s) -->",
                nested.len()
            ));
            for nested_view in nested {
                describe_view(nested_view, depth + 1, lines);
            }
        }
    }
}

fn count_views(view: &AppView, count: &mut usize) {
    *count += 1;
    for child in view.component_views() {
        count_views(child, count);
    }
    for container in view.containers() {
        for nested in container.nested_views() {
            count_views(nested, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const APP: &str = r#"
        [app]
        name = "demo"

        [modules.AppModule]
        declarations = ["App", "Card"]
        bootstrap = ["App"]

        [components.App]
        selector = "app-root"
        template_url = "app.html"

        [components.Card]
        selector = "card-view"
        template = "<p>card</p><template><span>row</span></template>"
    "#;

    fn project() -> (TempDir, TrellisToml) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.html"),
            r#"<h1 class="title">Cards</h1><card-view></card-view>"#,
        )
        .unwrap();
        let path = dir.path().join("trellis.toml");
        fs::write(&path, APP).unwrap();
        let file = TrellisToml::open(&path).unwrap();
        (dir, file)
    }

    #[test]
    fn test_explain_bootstrap_component() {
        let (_dir, file) = project();
        let report = explain(&file, None, None).unwrap();

        assert_eq!(report.component, "App");
        assert_eq!(report.selector, "app-root");
        assert_eq!(report.module, "AppModule");
        assert_eq!(report.views, 3);
        assert!(report.tree[0].starts_with("View_App_Host"));
        assert!(report.tree.iter().any(|l| l.trim() == r#"<h1 class="title">"#));
        assert!(report.tree.iter().any(|l| l.trim_start().starts_with("View_Card ")));
    }

    #[test]
    fn test_explain_named_component() {
        let (_dir, file) = project();
        let report = explain(&file, Some("AppModule"), Some("Card")).unwrap();

        assert_eq!(report.component, "Card");
        assert_eq!(report.views, 2);
        assert!(
            report
                .tree
                .iter()
                .any(|l| l.trim() == "<!-- container 0: 0 view(s) -->")
        );
    }

    #[test]
    fn test_explain_reports_template_cycle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trellis.toml");
        fs::write(
            &path,
            r#"
            [app]
            name = "loop"

            [modules.AppModule]
            declarations = ["Ping", "Pong"]
            bootstrap = ["Ping"]

            [components.Ping]
            selector = "ping-view"
            template = "<pong-view></pong-view>"

            [components.Pong]
            selector = "pong-view"
            template = "<ping-view></ping-view>"
            "#,
        )
        .unwrap();
        let file = TrellisToml::open(&path).unwrap();

        let err = explain(&file, None, None).unwrap_err();
        assert!(err.to_string().contains("Ping -> Pong -> Ping"));
    }
}
