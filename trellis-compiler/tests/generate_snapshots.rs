//! Snapshot tests for the generate backend.
//!
//! Run `cargo insta review` to update snapshots when making intentional changes.

use trellis_compiler::{
    Backend, CompilerConfig, RuntimeCompiler,
    resolver::{ManifestResolver, StaticResourceLoader},
};
use trellis_ir::TypeKey;

const APP: &str = r#"
    [app]
    name = "demo"

    [compiler]
    backend = "generate"

    [modules.AppModule]
    declarations = ["App", "Highlight"]
    bootstrap = ["App"]

    [components.App]
    selector = "app-root"
    template = "<h1 highlight>Hi</h1>"
    styles = ["h1 { color: red }"]
    animations = ["fade"]

    [directives.Highlight]
    selector = "[highlight]"
    inputs = ["color"]
"#;

/// Compile the app and return the generated sources as `(path, source)`.
fn generate() -> Vec<(String, String)> {
    let manifest: trellis_manifest::Manifest = APP.parse().expect("valid manifest");
    let config = CompilerConfig::from_manifest(&manifest);
    assert_eq!(config.backend, Backend::Generate);

    let compiler = RuntimeCompiler::new(
        ManifestResolver::new(manifest, StaticResourceLoader::new()),
        config,
    );
    compiler
        .compile_module_sync(&TypeKey::new("AppModule"))
        .expect("app compiles");
    compiler
        .generated_sources()
        .into_iter()
        .map(|s| (s.path, s.source))
        .collect()
}

fn get_file<'a>(files: &'a [(String, String)], path: &str) -> Option<&'a str> {
    files
        .iter()
        .find(|(p, _)| p == path)
        .map(|(_, c)| c.as_str())
}

#[test]
fn test_generated_paths() {
    let files = generate();
    let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        paths,
        [
            "/AppModule/App/wrapper.factory.rs",
            "/AppModule/Highlight/wrapper.factory.rs",
            "/AppModule/App/component.factory.rs",
            "/AppModule/App/host.factory.rs",
            "/AppModule/module.factory.rs",
        ]
    );
}

#[test]
fn test_component_factory_source() {
    let files = generate();
    let source = get_file(&files, "/AppModule/App/component.factory.rs").expect("component source");
    insta::assert_snapshot!("app_component", source);
}

#[test]
fn test_host_factory_source() {
    let files = generate();
    let source = get_file(&files, "/AppModule/App/host.factory.rs").expect("host source");
    insta::assert_snapshot!("app_host", source);
}

#[test]
fn test_module_factory_source() {
    let files = generate();
    let source = get_file(&files, "/AppModule/module.factory.rs").expect("module source");
    insta::assert_snapshot!("app_module", source);
}

#[test]
fn test_wrapper_source() {
    let files = generate();
    let source =
        get_file(&files, "/AppModule/Highlight/wrapper.factory.rs").expect("wrapper source");
    assert_eq!(
        source,
        "// /AppModule/Highlight/wrapper.factory.rs\n\
         \n\
         let Wrapper_Highlight = DirectiveWrapper(\"Highlight\", inputs: [\"color\"]);\n\
         \n\
         export Wrapper_Highlight;\n"
    );
}
