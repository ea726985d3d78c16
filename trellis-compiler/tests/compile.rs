//! End-to-end tests of the compilation orchestrator.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
    task::{Context, Poll},
};

use futures::{
    FutureExt,
    channel::oneshot,
    executor::block_on,
    future::LocalBoxFuture,
    task::noop_waker_ref,
};
use trellis_compiler::{
    CompileError, CompilerConfig, Result, RuntimeCompiler,
    resolver::{ManifestResolver, ResourceLoader, StaticResourceLoader},
    runtime::cache::CacheStats,
};
use trellis_ir::TypeKey;
use trellis_manifest::Manifest;

const APP: &str = r#"
    [app]
    name = "demo"

    [modules.SharedModule]
    declarations = ["Card"]
    exports = ["Card"]

    [modules.AppModule]
    declarations = ["App"]
    imports = ["SharedModule"]
    bootstrap = ["App"]

    [components.App]
    selector = "app-root"
    template = "<h1>Cards</h1><card-view></card-view>"

    [components.Card]
    selector = "card-view"
    template = "<p>card</p>"
"#;

fn manifest(src: &str) -> Manifest {
    src.parse().expect("valid manifest")
}

fn compiler(src: &str) -> RuntimeCompiler {
    RuntimeCompiler::new(
        ManifestResolver::new(manifest(src), StaticResourceLoader::new()),
        CompilerConfig::default(),
    )
}

fn key(name: &str) -> TypeKey {
    TypeKey::new(name)
}

#[test]
fn test_compile_component_is_cached() {
    let compiler = compiler(APP);
    compiler.compile_module_sync(&key("AppModule")).unwrap();

    let first = compiler.compile_component(&key("Card")).unwrap();
    let second = compiler.compile_component(&key("Card")).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert!(first.is_compiled());
    assert_eq!(first.module(), &key("SharedModule"));
}

#[test]
fn test_mutually_referencing_components() {
    let compiler = compiler(
        r#"
        [app]
        name = "cycle"

        [modules.AppModule]
        declarations = ["Tree", "Leaf"]

        [components.Tree]
        selector = "tree-view"
        template = "<template><leaf-view></leaf-view></template>"

        [components.Leaf]
        selector = "leaf-view"
        template = "<span>leaf</span><template><tree-view></tree-view></template>"
        "#,
    );

    let compiled = compiler
        .compile_module_and_all_components_sync(&key("AppModule"))
        .unwrap();
    let components: Vec<&str> = compiled
        .component_factories
        .iter()
        .map(|f| f.component().name())
        .collect();
    assert_eq!(components, ["Tree", "Leaf"]);

    let tree = compiler.template(&key("Tree")).unwrap();
    let leaf = compiler.template(&key("Leaf")).unwrap();
    assert!(tree.is_compiled());
    assert!(leaf.is_compiled());

    // The embedded view of Tree instantiates Leaf, whose embedded view refers back to Tree.
    let embedded = tree.view_class().unwrap().embedded_templates();
    let row = embedded[0].as_ref().unwrap();
    let view = row
        .create_view(trellis_view::ViewType::Embedded, None)
        .unwrap();
    assert_eq!(view.component_views()[0].class(), "View_Leaf");
}

#[test]
fn test_components_hosting_each_other_fail_to_instantiate() {
    let compiler = compiler(
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
        template = "<p>pong</p><ping-view></ping-view>"
        "#,
    );

    let compiled = compiler
        .compile_module_and_all_components_sync(&key("AppModule"))
        .unwrap();
    assert!(compiler.template(&key("Ping")).unwrap().is_compiled());

    let err = compiled.module.factories()[0].create(None).unwrap_err();
    assert!(matches!(err, CompileError::Configuration { .. }));
    assert_eq!(
        err.to_string(),
        "Cyclic template of component Ping: Ping -> Pong -> Ping"
    );

    let pong = compiler.template(&key("Pong")).unwrap().view_class().unwrap();
    let err = pong
        .create_view(trellis_view::ViewType::Component, None)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cyclic template of component Ping: Ping -> Pong -> Ping"
    );
}

#[test]
fn test_clear_cache_for_recompiles() {
    let compiler = compiler(APP);
    compiler.compile_module_sync(&key("AppModule")).unwrap();
    let before = compiler.compile_component(&key("Card")).unwrap();

    compiler.clear_cache_for(&key("Card"));
    assert!(compiler.template(&key("Card")).is_none());

    let after = compiler.compile_component(&key("Card")).unwrap();
    assert!(!Rc::ptr_eq(&before, &after));
    assert!(after.is_compiled());
}

#[test]
fn test_clear_cache_drops_everything() {
    let compiler = compiler(APP);
    compiler.compile_module_sync(&key("AppModule")).unwrap();
    compiler.clear_cache();

    assert_eq!(compiler.cache_stats(), CacheStats::default());
    let err = compiler.compile_component(&key("Card")).unwrap_err();
    assert!(matches!(err, CompileError::Configuration { .. }));
}

#[test]
fn test_undeclared_entry_component() {
    let compiler = compiler(
        r#"
        [app]
        name = "orphan"

        [modules.AppModule]
        declarations = ["App"]
        entry_components = ["Dialog"]

        [components.App]
        selector = "app-root"
        template = ""

        [components.Dialog]
        selector = "app-dialog"
        template = ""
        "#,
    );

    let err = compiler
        .compile_module_sync(&key("AppModule"))
        .unwrap_err();
    assert!(matches!(err, CompileError::Configuration { .. }));
    assert!(err.to_string().contains("Component Dialog is not part of any module"));
}

#[test]
fn test_pending_factory_after_failed_body() {
    let compiler = compiler(
        r#"
        [app]
        name = "broken"

        [modules.AppModule]
        declarations = ["App"]
        bootstrap = ["App"]

        [components.App]
        selector = "app-root"
        template = "<missing-view></missing-view>"
        "#,
    );

    let err = compiler
        .compile_module_sync(&key("AppModule"))
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::TemplateParse { ref component, .. } if component == "App"
    ));

    let factory = compiler.host_factory(&key("App")).unwrap();
    assert!(matches!(
        factory.create(None),
        Err(CompileError::IllegalState { .. })
    ));
}

const EXTERNAL: &str = r#"
    [app]
    name = "external"

    [modules.AppModule]
    declarations = ["App"]
    bootstrap = ["App"]

    [components.App]
    selector = "app-root"
    template_url = "app.html"
    style_urls = ["app.css"]
"#;

#[test]
fn test_sync_fails_until_resources_are_loaded() {
    let loader = StaticResourceLoader::new()
        .with("app.html", "<p>external</p>")
        .with("app.css", "p { color: blue }");
    let compiler = RuntimeCompiler::new(
        ManifestResolver::new(manifest(EXTERNAL), loader),
        CompilerConfig::default(),
    );

    let err = compiler
        .compile_module_sync(&key("AppModule"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Can't compile synchronously as App is still being loaded!"
    );

    let module = block_on(compiler.compile_module_async(&key("AppModule"))).unwrap();
    let view = module.factories()[0].create(None).unwrap();
    let app = &view.component_views()[0];
    assert_eq!(app.class(), "View_App");

    let view_class = compiler.template(&key("App")).unwrap().view_class().unwrap();
    assert_eq!(view_class.styles, ["p { color: blue }"]);

    // Everything is resident now.
    compiler.compile_module_sync(&key("AppModule")).unwrap();
}

#[test]
fn test_async_reports_loading_errors() {
    let compiler = RuntimeCompiler::new(
        ManifestResolver::new(manifest(EXTERNAL), StaticResourceLoader::new()),
        CompilerConfig::default(),
    );

    let err = block_on(compiler.compile_module_and_all_components_async(&key("AppModule")))
        .unwrap_err();
    assert!(matches!(err, CompileError::Loading { .. }));
    assert!(compiler.template(&key("App")).is_none());
}

/// Serves each resource once its sender fires.
#[derive(Clone, Default)]
struct GatedLoader {
    pending: Rc<RefCell<HashMap<String, oneshot::Receiver<String>>>>,
}

impl GatedLoader {
    fn gate(&self, url: &str) -> oneshot::Sender<String> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().insert(url.to_string(), rx);
        tx
    }
}

impl ResourceLoader for GatedLoader {
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<String>> {
        let receiver = self.pending.borrow_mut().remove(url);
        let url = url.to_string();
        async move {
            match receiver {
                Some(receiver) => receiver
                    .await
                    .map_err(|_| CompileError::loading(url, "cancelled")),
                None => Err(CompileError::loading(url, "not gated")),
            }
        }
        .boxed_local()
    }
}

#[test]
fn test_async_compile_waits_for_loading() {
    let loader = GatedLoader::default();
    let html = loader.gate("app.html");
    let css = loader.gate("app.css");
    let compiler = RuntimeCompiler::new(
        ManifestResolver::new(manifest(EXTERNAL), loader.clone()),
        CompilerConfig::default(),
    );

    let app_module = key("AppModule");
    let mut compile = compiler.compile_module_async(&app_module).boxed_local();
    let mut cx = Context::from_waker(noop_waker_ref());
    assert!(compile.poll_unpin(&mut cx).is_pending());

    html.send("<p>late</p>".to_string()).unwrap();
    assert!(compile.poll_unpin(&mut cx).is_pending());
    assert_eq!(compiler.cache_stats().templates, 0);

    css.send(String::new()).unwrap();
    let Poll::Ready(module) = compile.poll_unpin(&mut cx) else {
        panic!("compile should finish once every resource is loaded");
    };
    assert_eq!(module.unwrap().module(), &key("AppModule"));
    assert!(compiler.template(&key("App")).unwrap().is_compiled());
}
