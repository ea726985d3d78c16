use std::{cell::RefCell, collections::HashMap, rc::Rc};

use futures::{FutureExt, future::try_join_all};
use indexmap::IndexMap;
use tracing::debug;
use trellis_ir::{
    DirectiveMeta, ModuleMeta, PipeMeta, StylesheetMeta, TemplateMeta, TransitiveModule, TypeKey,
    stylesheet_imports,
};
use trellis_manifest::{DeclKind, Manifest, TemplateSource, TrellisToml};

use super::{FileResourceLoader, LoadMode, Loading, ResourceLoader, Resolver};
use crate::{CompileError, Result};

type Resources = Rc<RefCell<HashMap<String, String>>>;

/// Resolves descriptors from a parsed `trellis.toml`.
///
/// External templates and stylesheets are fetched through a [`ResourceLoader`]
/// and kept until [`Resolver::clear_cache`].
pub struct ManifestResolver {
    manifest: Manifest,
    loader: Rc<dyn ResourceLoader>,
    resources: Resources,
    modules: RefCell<IndexMap<TypeKey, Rc<ModuleMeta>>>,
    directives: RefCell<HashMap<TypeKey, Rc<DirectiveMeta>>>,
    pipes: RefCell<HashMap<TypeKey, Rc<PipeMeta>>>,
}

impl ManifestResolver {
    pub fn new(manifest: Manifest, loader: impl ResourceLoader + 'static) -> Self {
        Self {
            manifest,
            loader: Rc::new(loader),
            resources: Rc::default(),
            modules: RefCell::default(),
            directives: RefCell::default(),
            pipes: RefCell::default(),
        }
    }

    /// Resolve against a manifest file, loading resources relative to its directory.
    pub fn from_toml(file: &TrellisToml) -> Self {
        Self::new(
            file.manifest().clone(),
            FileResourceLoader::new(file.base_dir()),
        )
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Make a resource resident without going through the loader.
    pub fn preload(&self, url: impl Into<String>, content: impl Into<String>) {
        self.resources.borrow_mut().insert(url.into(), content.into());
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.resources.borrow().contains_key(url)
    }

    fn resource(&self, url: &str) -> Option<String> {
        self.resources.borrow().get(url).cloned()
    }

    fn resolve_module(&self, key: &TypeKey, stack: &mut Vec<TypeKey>) -> Result<Rc<ModuleMeta>> {
        if let Some(meta) = self.modules.borrow().get(key) {
            return Ok(Rc::clone(meta));
        }
        if let Some(start) = stack.iter().position(|k| k == key) {
            let chain: Vec<&str> = stack[start..]
                .iter()
                .chain(std::iter::once(key))
                .map(TypeKey::name)
                .collect();
            return Err(CompileError::configuration(format!(
                "Cyclic import of module {key}: {}",
                chain.join(" -> ")
            )));
        }
        let decl = self.manifest.modules.get(key.name()).ok_or_else(|| {
            CompileError::configuration(format!("Unexpected value '{key}': not a module"))
        })?;

        stack.push(key.clone());
        let imported = decl
            .imports
            .iter()
            .map(|import| self.resolve_module(&TypeKey::new(import.as_str()), stack))
            .collect::<Result<Vec<_>>>()?;
        stack.pop();

        let of_kind = |names: &[String], kinds: &[DeclKind]| -> Vec<TypeKey> {
            names
                .iter()
                .filter(|name| {
                    self.manifest
                        .kind_of(name)
                        .is_some_and(|kind| kinds.contains(&kind))
                })
                .map(|name| TypeKey::new(name.as_str()))
                .collect()
        };
        let directive_kinds = [DeclKind::Component, DeclKind::Directive];
        let declared_directives = of_kind(&decl.declarations, &directive_kinds);
        let declared_pipes = of_kind(&decl.declarations, &[DeclKind::Pipe]);

        for declared in declared_directives.iter().chain(&declared_pipes) {
            if let Some(other) = self.declaring_module(declared) {
                return Err(CompileError::configuration(format!(
                    "Type {declared} is part of the declarations of 2 modules: {other} and {key}!"
                )));
            }
        }

        let mut transitive = TransitiveModule {
            modules: Vec::new(),
            directives: declared_directives.clone(),
            pipes: declared_pipes.clone(),
        };
        for module in &imported {
            for nested in &module.transitive.modules {
                push_unique(&mut transitive.modules, nested);
            }
            for export in &module.exports {
                match self.manifest.kind_of(export.name()) {
                    Some(DeclKind::Pipe) => push_unique(&mut transitive.pipes, export),
                    Some(_) => push_unique(&mut transitive.directives, export),
                    None => {}
                }
            }
        }
        transitive.modules.push(key.clone());

        let bootstrap_components: Vec<TypeKey> =
            decl.bootstrap.iter().map(|n| TypeKey::new(n.as_str())).collect();
        let mut entry_components: Vec<TypeKey> = decl
            .entry_components
            .iter()
            .map(|n| TypeKey::new(n.as_str()))
            .collect();
        for component in &bootstrap_components {
            push_unique(&mut entry_components, component);
        }

        let meta = Rc::new(ModuleMeta {
            key: key.clone(),
            declared_directives,
            declared_pipes,
            imported_modules: imported.iter().map(|m| m.key.clone()).collect(),
            exports: decl.exports.iter().map(|n| TypeKey::new(n.as_str())).collect(),
            entry_components,
            bootstrap_components,
            transitive,
        });
        debug!(module = %key, modules = meta.transitive.modules.len(), "resolved module");
        self.modules
            .borrow_mut()
            .insert(key.clone(), Rc::clone(&meta));
        Ok(meta)
    }

    /// Resources the module's own declarations still need, as
    /// `(component, url, is_stylesheet)`.
    fn missing_resources(&self, module: &ModuleMeta) -> Vec<(TypeKey, String, bool)> {
        let mut missing: Vec<(TypeKey, String, bool)> = Vec::new();
        for key in &module.declared_directives {
            let Some(decl) = self.manifest.components.get(key.name()) else {
                continue;
            };
            if let Some(TemplateSource::Url(url)) = decl.template_source()
                && !self.is_loaded(url)
            {
                missing.push((key.clone(), url.to_string(), false));
            }

            let mut queue: Vec<String> = decl.style_urls.clone();
            let mut seen: Vec<String> = Vec::new();
            while let Some(url) = queue.pop() {
                if seen.contains(&url) {
                    continue;
                }
                seen.push(url.clone());
                match self.resource(&url) {
                    Some(content) => {
                        queue.extend(stylesheet_imports(&content).map(str::to_string));
                    }
                    None if missing.iter().any(|(_, u, _)| *u == url) => {}
                    None => missing.push((key.clone(), url, true)),
                }
            }
        }
        missing
    }

    fn stylesheets(&self, component: &str, style_urls: &[String]) -> Result<Vec<StylesheetMeta>> {
        let mut sheets: Vec<StylesheetMeta> = Vec::new();
        let mut queue: Vec<String> = style_urls.iter().rev().cloned().collect();
        while let Some(url) = queue.pop() {
            if sheets.iter().any(|s| s.url == url) {
                continue;
            }
            let content = self.resource(&url).ok_or_else(|| still_loading(component))?;
            let sheet = StylesheetMeta::from_source(url, &content);
            queue.extend(sheet.style_urls.iter().rev().cloned());
            sheets.push(sheet);
        }
        Ok(sheets)
    }
}

fn push_unique(list: &mut Vec<TypeKey>, key: &TypeKey) {
    if !list.contains(key) {
        list.push(key.clone());
    }
}

fn still_loading(component: &str) -> CompileError {
    CompileError::configuration(format!(
        "Can't compile synchronously as {component} is still being loaded!"
    ))
}

/// Fetch a resource, then any stylesheets it imports.
fn fetch(
    loader: Rc<dyn ResourceLoader>,
    resources: Resources,
    url: String,
    stylesheet: bool,
) -> Loading {
    async move {
        if resources.borrow().contains_key(&url) {
            return Ok(());
        }
        let content = loader.get(&url).await?;
        let imports: Vec<String> = if stylesheet {
            stylesheet_imports(&content).map(str::to_string).collect()
        } else {
            Vec::new()
        };
        debug!(url = %url, bytes = content.len(), "loaded resource");
        resources.borrow_mut().insert(url, content);

        try_join_all(
            imports
                .into_iter()
                .map(|import| fetch(Rc::clone(&loader), Rc::clone(&resources), import, true)),
        )
        .await?;
        Ok(())
    }
    .boxed_local()
}

impl Resolver for ManifestResolver {
    fn load_module_metadata(
        &self,
        key: &TypeKey,
        mode: LoadMode,
    ) -> Result<(Rc<ModuleMeta>, Loading)> {
        let meta = self.resolve_module(key, &mut Vec::new())?;
        let missing = self.missing_resources(&meta);
        debug!(module = %key, ?mode, missing = missing.len(), "loading module metadata");

        let loading: Loading = match mode {
            LoadMode::Sync => {
                if let Some((component, _, _)) = missing.first() {
                    return Err(still_loading(component.name()));
                }
                futures::future::ready(Ok(())).boxed_local()
            }
            LoadMode::Async => {
                let fetches: Vec<Loading> = missing
                    .into_iter()
                    .map(|(_, url, stylesheet)| {
                        fetch(
                            Rc::clone(&self.loader),
                            Rc::clone(&self.resources),
                            url,
                            stylesheet,
                        )
                    })
                    .collect();
                async move { try_join_all(fetches).await.map(|_| ()) }.boxed_local()
            }
        };
        Ok((meta, loading))
    }

    fn module_metadata(&self, key: &TypeKey) -> Result<Rc<ModuleMeta>> {
        self.resolve_module(key, &mut Vec::new())
    }

    fn directive_metadata(&self, key: &TypeKey) -> Result<Rc<DirectiveMeta>> {
        if let Some(meta) = self.directives.borrow().get(key) {
            return Ok(Rc::clone(meta));
        }

        let meta = if let Some(decl) = self.manifest.components.get(key.name()) {
            let template = match decl.template_source() {
                Some(TemplateSource::Inline(template)) => template.to_string(),
                Some(TemplateSource::Url(url)) => {
                    self.resource(url).ok_or_else(|| still_loading(key.name()))?
                }
                None => {
                    return Err(CompileError::configuration(format!(
                        "Component {key} has no template"
                    )));
                }
            };
            DirectiveMeta {
                key: key.clone(),
                selector: decl.selector.clone(),
                is_component: true,
                inputs: decl.inputs.clone(),
                template: Some(TemplateMeta {
                    template,
                    template_url: decl.template_url.clone(),
                    styles: decl.styles.clone(),
                    style_urls: decl.style_urls.clone(),
                    animations: decl.animations.clone(),
                    external_stylesheets: self.stylesheets(key.name(), &decl.style_urls)?,
                }),
                entry_components: decl
                    .entry_components
                    .iter()
                    .map(|n| TypeKey::new(n.as_str()))
                    .collect(),
            }
        } else if let Some(decl) = self.manifest.directives.get(key.name()) {
            DirectiveMeta {
                key: key.clone(),
                selector: decl.selector.clone(),
                is_component: false,
                inputs: decl.inputs.clone(),
                template: None,
                entry_components: Vec::new(),
            }
        } else {
            return Err(CompileError::configuration(format!(
                "Unexpected value '{key}': not a directive or component"
            )));
        };

        let meta = Rc::new(meta);
        self.directives
            .borrow_mut()
            .insert(key.clone(), Rc::clone(&meta));
        Ok(meta)
    }

    fn pipe_summary(&self, key: &TypeKey) -> Result<Rc<PipeMeta>> {
        if let Some(meta) = self.pipes.borrow().get(key) {
            return Ok(Rc::clone(meta));
        }
        let decl = self.manifest.pipes.get(key.name()).ok_or_else(|| {
            CompileError::configuration(format!("Unexpected value '{key}': not a pipe"))
        })?;
        let meta = Rc::new(PipeMeta {
            key: key.clone(),
            name: decl.name.clone(),
            pure: decl.pure,
        });
        self.pipes.borrow_mut().insert(key.clone(), Rc::clone(&meta));
        Ok(meta)
    }

    fn declaring_module(&self, key: &TypeKey) -> Option<TypeKey> {
        self.modules
            .borrow()
            .values()
            .find(|m| m.declared_directives.contains(key) || m.declared_pipes.contains(key))
            .map(|m| m.key.clone())
    }

    fn clear_cache_for(&self, key: &TypeKey) {
        self.modules.borrow_mut().shift_remove(key);
        self.directives.borrow_mut().remove(key);
        self.pipes.borrow_mut().remove(key);
    }

    fn clear_cache(&self) {
        self.modules.borrow_mut().clear();
        self.directives.borrow_mut().clear();
        self.pipes.borrow_mut().clear();
        self.resources.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::resolver::StaticResourceLoader;

    const APP: &str = r#"
        [app]
        name = "demo"

        [modules.SharedModule]
        declarations = ["Card", "Hidden", "UpperPipe"]
        exports = ["Card", "UpperPipe"]

        [modules.AppModule]
        declarations = ["App", "Highlight"]
        imports = ["SharedModule"]
        bootstrap = ["App"]
        entry_components = ["Card"]

        [components.App]
        selector = "app-root"
        template_url = "app.html"
        style_urls = ["app.css"]

        [components.Card]
        selector = "card-view"
        template = "<p>card</p>"

        [components.Hidden]
        selector = "hidden-view"
        template = ""

        [directives.Highlight]
        selector = "[highlight]"
        inputs = ["color"]

        [pipes.UpperPipe]
        name = "upper"
    "#;

    fn resolver(loader: StaticResourceLoader) -> ManifestResolver {
        ManifestResolver::new(APP.parse().unwrap(), loader)
    }

    fn loaded() -> StaticResourceLoader {
        StaticResourceLoader::new()
            .with("app.html", "<card-view></card-view>")
            .with("app.css", "@import 'base.css';\nh1 { color: red }")
            .with("base.css", "body { margin: 0 }")
    }

    #[test]
    fn test_module_graph() {
        let resolver = resolver(loaded());
        let meta = resolver
            .module_metadata(&TypeKey::new("AppModule"))
            .unwrap();

        let names = |keys: &[TypeKey]| {
            keys.iter()
                .map(|k| k.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&meta.transitive.modules), ["SharedModule", "AppModule"]);
        assert_eq!(names(&meta.transitive.directives), ["App", "Highlight", "Card"]);
        assert_eq!(names(&meta.transitive.pipes), ["UpperPipe"]);
        assert_eq!(names(&meta.entry_components), ["Card", "App"]);
        assert_eq!(names(&meta.bootstrap_components), ["App"]);
    }

    #[test]
    fn test_sync_load_fails_while_resources_missing() {
        let resolver = resolver(loaded());
        let err = resolver
            .load_module_metadata(&TypeKey::new("AppModule"), LoadMode::Sync)
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "Can't compile synchronously as App is still being loaded!"
        );
    }

    #[test]
    fn test_async_load_fetches_templates_and_imports() {
        let resolver = resolver(loaded());
        let (_, loading) = resolver
            .load_module_metadata(&TypeKey::new("AppModule"), LoadMode::Async)
            .unwrap();
        block_on(loading).unwrap();

        assert!(resolver.is_loaded("app.html"));
        assert!(resolver.is_loaded("base.css"));
        assert!(
            resolver
                .load_module_metadata(&TypeKey::new("AppModule"), LoadMode::Sync)
                .is_ok()
        );

        let app = resolver.directive_metadata(&TypeKey::new("App")).unwrap();
        let template = app.template.as_ref().unwrap();
        assert_eq!(template.template, "<card-view></card-view>");
        let urls: Vec<&str> = template
            .external_stylesheets
            .iter()
            .map(|s| s.url.as_str())
            .collect();
        assert_eq!(urls, ["app.css", "base.css"]);
    }

    #[test]
    fn test_async_load_reports_missing_resource() {
        let resolver = resolver(StaticResourceLoader::new().with("app.html", ""));
        let (_, loading) = resolver
            .load_module_metadata(&TypeKey::new("AppModule"), LoadMode::Async)
            .unwrap();
        let err = block_on(loading).unwrap_err();
        assert!(matches!(err, CompileError::Loading { ref url, .. } if url == "app.css"));
    }

    #[test]
    fn test_preload_allows_sync_load() {
        let resolver = resolver(StaticResourceLoader::new());
        resolver.preload("app.html", "<p></p>");
        resolver.preload("app.css", "");
        let (meta, _) = resolver
            .load_module_metadata(&TypeKey::new("AppModule"), LoadMode::Sync)
            .unwrap();
        assert_eq!(meta.name(), "AppModule");
        assert_eq!(
            resolver.declaring_module(&TypeKey::new("Card")),
            Some(TypeKey::new("SharedModule"))
        );
    }

    #[test]
    fn test_cyclic_imports() {
        let manifest: Manifest = r#"
            [app]
            name = "cycle"

            [modules.A]
            imports = ["B"]

            [modules.B]
            imports = ["A"]
        "#
        .parse()
        .unwrap();
        let resolver = ManifestResolver::new(manifest, StaticResourceLoader::new());
        let err = resolver.module_metadata(&TypeKey::new("A")).unwrap_err();
        assert_eq!(err.to_string(), "Cyclic import of module A: A -> B -> A");
    }

    #[test]
    fn test_declared_in_two_modules() {
        let manifest: Manifest = r#"
            [app]
            name = "twice"

            [modules.A]
            declarations = ["Card"]

            [modules.B]
            declarations = ["Card"]
            imports = ["A"]

            [components.Card]
            selector = "card-view"
            template = ""
        "#
        .parse()
        .unwrap();
        let resolver = ManifestResolver::new(manifest, StaticResourceLoader::new());
        let err = resolver.module_metadata(&TypeKey::new("B")).unwrap_err();
        assert!(err.to_string().contains("part of the declarations of 2 modules"));
    }

    #[test]
    fn test_clear_cache_for_rebuilds_descriptor() {
        let resolver = resolver(loaded());
        let key = TypeKey::new("Card");
        let first = resolver.directive_metadata(&key).unwrap();
        assert!(Rc::ptr_eq(&first, &resolver.directive_metadata(&key).unwrap()));

        resolver.clear_cache_for(&key);
        let second = resolver.directive_metadata(&key).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_lookups() {
        let resolver = resolver(loaded());
        assert!(resolver.directive_metadata(&TypeKey::new("UpperPipe")).is_err());
        assert!(resolver.pipe_summary(&TypeKey::new("Card")).is_err());
        assert_eq!(
            resolver.pipe_summary(&TypeKey::new("UpperPipe")).unwrap().name,
            "upper"
        );
    }
}
