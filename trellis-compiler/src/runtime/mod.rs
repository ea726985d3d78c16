//! The compilation orchestrator.
//!
//! [`RuntimeCompiler`] compiles a module graph in two passes. The skeleton
//! pass registers a Pending [`CompiledTemplate`] for every component (and
//! every host that will be needed) before any body is compiled. The body pass
//! then compiles each skeleton, binding references to other components to
//! their skeletons, so components may refer to each other in cycles.
//!
//! # Example
//!
//! ```
//! use trellis_compiler::{
//!     CompilerConfig, RuntimeCompiler,
//!     resolver::{ManifestResolver, StaticResourceLoader},
//! };
//! use trellis_ir::TypeKey;
//!
//! let manifest: trellis_manifest::Manifest = r#"
//!     [app]
//!     name = "hello"
//!
//!     [modules.AppModule]
//!     declarations = ["App"]
//!     bootstrap = ["App"]
//!
//!     [components.App]
//!     selector = "app-root"
//!     template = "<h1>Hello</h1>"
//! "#
//! .parse()
//! .unwrap();
//!
//! let resolver = ManifestResolver::new(manifest, StaticResourceLoader::new());
//! let compiler = RuntimeCompiler::new(resolver, CompilerConfig::default());
//! let module = compiler.compile_module_sync(&TypeKey::new("AppModule")).unwrap();
//!
//! let view = module.factories()[0].create(None).unwrap();
//! assert_eq!(view.class(), "View_App_Host");
//! ```

pub mod cache;

use std::{cell::RefCell, rc::Rc};

use futures::future::try_join_all;
use tracing::{Instrument, debug, debug_span};
use trellis_ir::{DirectiveMeta, Expr, StylesheetMeta, TypeKey, create_host_component_meta};
use trellis_manifest::TrellisToml;

use self::cache::{ArtifactCache, CacheStats};
use crate::{
    CompileError, CompiledTemplate, CompilerConfig, ComponentFactory, ModuleFactory, Result,
    TemplateHandle,
    backend::{Evaluator, GeneratedSource},
    compilers::{Binding, CompileResult, Dependency, SubCompilers},
    resolver::{LoadMode, Loading, ManifestResolver, Resolver},
};

/// A compiled module together with the host factories of its components.
#[derive(Debug, Clone)]
pub struct ModuleWithComponentFactories {
    pub module: Rc<ModuleFactory>,
    /// One factory per component declared across the transitive module
    /// graph, in declaration order.
    pub component_factories: Vec<Rc<ComponentFactory>>,
}

/// Compiles module graphs into view factories and caches the results.
pub struct RuntimeCompiler {
    resolver: Rc<dyn Resolver>,
    config: CompilerConfig,
    compilers: SubCompilers,
    evaluator: Evaluator,
    cache: RefCell<ArtifactCache>,
}

impl RuntimeCompiler {
    pub fn new(resolver: impl Resolver + 'static, config: CompilerConfig) -> Self {
        Self::with_resolver(Rc::new(resolver), config)
    }

    /// Share a resolver with other owners.
    pub fn with_resolver(resolver: Rc<dyn Resolver>, config: CompilerConfig) -> Self {
        debug!(backend = %config.backend, "creating runtime compiler");
        Self {
            resolver,
            evaluator: Evaluator::new(config.backend),
            config,
            compilers: SubCompilers::default(),
            cache: RefCell::default(),
        }
    }

    /// Compiler for the app graph of a manifest file, configured by its
    /// `[compiler]` table.
    pub fn from_toml(file: &TrellisToml) -> Self {
        Self::new(
            ManifestResolver::from_toml(file),
            CompilerConfig::from_manifest(file.manifest()),
        )
    }

    /// Replace the built-in sub-compilers.
    pub fn with_compilers(mut self, compilers: SubCompilers) -> Self {
        self.compilers = compilers;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Rc<dyn Resolver> {
        &self.resolver
    }

    pub fn compile_module_sync(&self, key: &TypeKey) -> Result<Rc<ModuleFactory>> {
        let _span = debug_span!("compile_module", module = %key, mode = "sync").entered();
        self.load_modules(key, LoadMode::Sync)?;
        self.compile_loaded(key, false).map(|compiled| compiled.module)
    }

    /// Load the module graph, fetching missing resources, then compile it.
    ///
    /// Nothing is compiled before every loading handle has settled.
    pub async fn compile_module_async(&self, key: &TypeKey) -> Result<Rc<ModuleFactory>> {
        let span = debug_span!("compile_module", module = %key, mode = "async");
        async {
            let loading = self.load_modules(key, LoadMode::Async)?;
            try_join_all(loading).await?;
            self.compile_loaded(key, false).map(|compiled| compiled.module)
        }
        .instrument(span)
        .await
    }

    pub fn compile_module_and_all_components_sync(
        &self,
        key: &TypeKey,
    ) -> Result<ModuleWithComponentFactories> {
        let _span = debug_span!("compile_module_and_all_components", module = %key, mode = "sync")
            .entered();
        self.load_modules(key, LoadMode::Sync)?;
        self.compile_loaded(key, true)
    }

    pub async fn compile_module_and_all_components_async(
        &self,
        key: &TypeKey,
    ) -> Result<ModuleWithComponentFactories> {
        let span = debug_span!("compile_module_and_all_components", module = %key, mode = "async");
        async {
            let loading = self.load_modules(key, LoadMode::Async)?;
            try_join_all(loading).await?;
            self.compile_loaded(key, true)
        }
        .instrument(span)
        .await
    }

    /// The compiled template of a component declared by a loaded module.
    pub fn compile_component(&self, key: &TypeKey) -> Result<TemplateHandle> {
        if let Some(template) = self.cache.borrow().template(key)
            && template.is_compiled()
        {
            return Ok(template);
        }

        let _span = debug_span!("compile_component", component = %key).entered();
        let module = self.prepare_component(key)?;
        self.compile_components(&module, false)?;
        self.cache.borrow().template(key).ok_or_else(|| {
            CompileError::illegal_state(format!(
                "CompiledTemplate for {key} (is host: false) does not exist!"
            ))
        })
    }

    /// The host factory of a component declared by a loaded module.
    pub fn compile_host_component(&self, key: &TypeKey) -> Result<Rc<ComponentFactory>> {
        if let Some(factory) = self.cache.borrow().host_factory(key)
            && factory.host_template().is_compiled()
        {
            return Ok(factory);
        }

        let _span = debug_span!("compile_host_component", component = %key).entered();
        let module = self.prepare_component(key)?;
        self.compile_components(&module, false)?;
        let meta = self.resolver.directive_metadata(key)?;
        let factory = self.host_skeleton(&meta, &module)?;
        let host = factory.host_template();
        if !host.is_compiled() {
            self.compile_template(host)?;
        }
        Ok(factory)
    }

    /// Evict every artifact and descriptor cached for `key`.
    pub fn clear_cache_for(&self, key: &TypeKey) {
        debug!(key = %key, "clearing cache");
        self.cache.borrow_mut().evict(key);
        self.resolver.clear_cache_for(key);
    }

    pub fn clear_cache(&self) {
        debug!("clearing all caches");
        self.cache.borrow_mut().clear();
        self.resolver.clear_cache();
        self.evaluator.clear();
    }

    /// Sources emitted so far by the generate backend.
    pub fn generated_sources(&self) -> Vec<GeneratedSource> {
        self.evaluator.generated_sources()
    }

    pub fn template(&self, key: &TypeKey) -> Option<TemplateHandle> {
        self.cache.borrow().template(key)
    }

    pub fn host_factory(&self, key: &TypeKey) -> Option<Rc<ComponentFactory>> {
        self.cache.borrow().host_factory(key)
    }

    pub fn module_factory(&self, key: &TypeKey) -> Option<Rc<ModuleFactory>> {
        self.cache.borrow().module_factory(key)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    fn load_modules(&self, key: &TypeKey, mode: LoadMode) -> Result<Vec<Loading>> {
        let (module, loading) = self.resolver.load_module_metadata(key, mode)?;
        let mut handles = vec![loading];
        for imported in module.transitive.modules.iter().filter(|m| *m != key) {
            let (_, loading) = self.resolver.load_module_metadata(imported, mode)?;
            handles.push(loading);
        }
        debug!(module = %key, modules = handles.len(), "module graph loaded");
        Ok(handles)
    }

    fn compile_loaded(
        &self,
        key: &TypeKey,
        collect_factories: bool,
    ) -> Result<ModuleWithComponentFactories> {
        let component_factories = self.compile_components(key, collect_factories)?;
        let module = self.compile_module(key)?;
        Ok(ModuleWithComponentFactories {
            module,
            component_factories,
        })
    }

    /// Find the module declaring `key` and check that `key` is a component.
    fn prepare_component(&self, key: &TypeKey) -> Result<TypeKey> {
        let module = self
            .cache
            .borrow()
            .declaring_module(key)
            .or_else(|| self.resolver.declaring_module(key))
            .ok_or_else(|| not_declared(key))?;
        let meta = self.resolver.directive_metadata(key)?;
        if !meta.is_component {
            return Err(not_a_component(key));
        }
        Ok(module)
    }

    fn compile_components(
        &self,
        key: &TypeKey,
        collect_factories: bool,
    ) -> Result<Vec<Rc<ComponentFactory>>> {
        let module = self.resolver.module_metadata(key)?;
        let mut skeletons: Vec<TemplateHandle> = Vec::new();
        let mut factories = Vec::new();

        for module_key in &module.transitive.modules {
            let declaring = self.resolver.module_metadata(module_key)?;
            for directive in &declaring.declared_directives {
                self.cache
                    .borrow_mut()
                    .record_declaration(directive.clone(), module_key.clone());
                let meta = self.resolver.directive_metadata(directive)?;
                self.compile_directive_wrapper(&meta, module_key)?;
                if !meta.is_component {
                    continue;
                }
                skeletons.push(self.component_skeleton(&meta, module_key)?);
                if collect_factories {
                    let factory = self.host_skeleton(&meta, module_key)?;
                    skeletons.push(Rc::clone(factory.host_template()));
                    factories.push(factory);
                }
            }
        }

        for module_key in &module.transitive.modules {
            let declaring = self.resolver.module_metadata(module_key)?;
            for directive in &declaring.declared_directives {
                let meta = self.resolver.directive_metadata(directive)?;
                for entry in &meta.entry_components {
                    skeletons.push(self.entry_host_skeleton(entry)?);
                }
            }
            for entry in &declaring.entry_components {
                skeletons.push(self.entry_host_skeleton(entry)?);
            }
        }

        debug!(module = %key, skeletons = skeletons.len(), "skeleton pass done");
        for template in &skeletons {
            if !template.is_compiled() {
                self.compile_template(template)?;
            }
        }
        Ok(factories)
    }

    fn component_skeleton(
        &self,
        meta: &Rc<DirectiveMeta>,
        module: &TypeKey,
    ) -> Result<TemplateHandle> {
        if let Some(template) = self.cache.borrow().template(&meta.key) {
            return Ok(template);
        }
        if !meta.is_component {
            return Err(not_a_component(&meta.key));
        }
        let template = Rc::new(CompiledTemplate::new(
            false,
            meta.key.clone(),
            module.clone(),
            Rc::clone(meta),
        ));
        self.cache
            .borrow_mut()
            .insert_template(Rc::clone(&template));
        Ok(template)
    }

    fn host_skeleton(
        &self,
        meta: &Rc<DirectiveMeta>,
        module: &TypeKey,
    ) -> Result<Rc<ComponentFactory>> {
        if let Some(factory) = self.cache.borrow().host_factory(&meta.key) {
            return Ok(factory);
        }
        if !meta.is_component {
            return Err(not_a_component(&meta.key));
        }
        let host = Rc::new(CompiledTemplate::new(
            true,
            meta.key.clone(),
            module.clone(),
            Rc::new(create_host_component_meta(meta)),
        ));
        let factory = Rc::new(ComponentFactory::new(meta.selector.clone(), host));
        self.cache
            .borrow_mut()
            .insert_host_factory(Rc::clone(&factory));
        Ok(factory)
    }

    fn entry_host_skeleton(&self, entry: &TypeKey) -> Result<TemplateHandle> {
        let module = self
            .cache
            .borrow()
            .declaring_module(entry)
            .ok_or_else(|| not_declared(entry))?;
        let meta = self.resolver.directive_metadata(entry)?;
        let factory = self.host_skeleton(&meta, &module)?;
        Ok(Rc::clone(factory.host_template()))
    }

    fn compile_template(&self, template: &CompiledTemplate) -> Result<()> {
        let _span = debug_span!(
            "compile_template",
            component = %template.component(),
            host = template.is_host()
        )
        .entered();

        let meta = template.meta();
        let source = meta
            .template
            .as_ref()
            .ok_or_else(|| not_a_component(template.component()))?;
        let module = self.resolver.module_metadata(template.module())?;

        let styles = self.compilers.style.compile_component(meta)?;
        self.bind_dependencies(&styles, &source.external_stylesheets, &mut Vec::new())?;

        let triggers = self.compilers.animation.parse(meta)?;
        let animations = self.compilers.animation.compile(meta, &triggers)?;

        let directives = module
            .transitive
            .directives
            .iter()
            .map(|key| self.resolver.directive_metadata(key))
            .collect::<Result<Vec<_>>>()?;
        let pipes = module
            .transitive
            .pipes
            .iter()
            .map(|key| self.resolver.pipe_summary(key))
            .collect::<Result<Vec<_>>>()?;
        let nodes = self
            .compilers
            .template
            .parse(meta, &source.template, &directives, &pipes)?;

        let styles_var = Expr::var(styles.exported_name.as_str());
        let view = self.compilers.view.compile(meta, &nodes, styles_var, &triggers)?;
        self.bind_dependencies(&view, &source.external_stylesheets, &mut Vec::new())?;

        let result = CompileResult::concat([styles, animations, view]);
        let kind = if template.is_host() { "host" } else { "component" };
        let path = format!(
            "/{}/{}/{kind}.factory.rs",
            template.module(),
            template.component()
        );
        let view_class = self.evaluator.evaluate(&path, &result)?.into_view()?;
        template.mark_compiled(view_class)?;
        debug!(component = %template.component(), host = template.is_host(), "compiled template");
        Ok(())
    }

    /// Bind every placeholder of `result` to the artifact it refers to.
    ///
    /// `stylesheets` are the external stylesheets of the component being
    /// compiled; `importing` holds the stylesheet URLs currently being
    /// compiled, to reject cyclic imports.
    fn bind_dependencies(
        &self,
        result: &CompileResult,
        stylesheets: &[StylesheetMeta],
        importing: &mut Vec<String>,
    ) -> Result<()> {
        for dependency in &result.dependencies {
            let binding = match dependency {
                Dependency::ViewClass { component, .. } => {
                    let template = self.cache.borrow().template(component).ok_or_else(|| {
                        CompileError::illegal_state(format!(
                            "CompiledTemplate for {component} (is host: false) does not exist!"
                        ))
                    })?;
                    Binding::ViewClass(template)
                }
                Dependency::ComponentFactory { component, .. } => {
                    let factory = self.cache.borrow().host_factory(component).ok_or_else(|| {
                        CompileError::illegal_state(format!(
                            "CompiledTemplate for {component} (is host: true) does not exist!"
                        ))
                    })?;
                    Binding::ComponentFactory(factory)
                }
                Dependency::DirectiveWrapper { directive, .. } => {
                    let wrapper = self
                        .cache
                        .borrow()
                        .directive_wrapper(directive)
                        .ok_or_else(|| {
                            CompileError::illegal_state(format!(
                                "Wrapper for {directive} does not exist!"
                            ))
                        })?;
                    Binding::DirectiveWrapper(wrapper)
                }
                Dependency::Stylesheet { url, .. } => {
                    let stylesheet = stylesheets.iter().find(|s| s.url == *url).ok_or_else(|| {
                        CompileError::illegal_state(format!("stylesheet {url} was never loaded"))
                    })?;
                    Binding::Styles(self.compile_stylesheet(stylesheet, stylesheets, importing)?)
                }
            };
            dependency.placeholder().bind(binding)?;
        }
        Ok(())
    }

    fn compile_stylesheet(
        &self,
        stylesheet: &StylesheetMeta,
        stylesheets: &[StylesheetMeta],
        importing: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        if importing.contains(&stylesheet.url) {
            return Err(CompileError::configuration(format!(
                "Cyclic @import of stylesheet {}: {} -> {}",
                stylesheet.url,
                importing.join(" -> "),
                stylesheet.url
            )));
        }
        importing.push(stylesheet.url.clone());
        let result = self.compilers.style.compile_stylesheet(stylesheet)?;
        self.bind_dependencies(&result, stylesheets, importing)?;
        importing.pop();

        let path = format!("/{}.css.rs", stylesheet.url.trim_start_matches('/'));
        self.evaluator.evaluate(&path, &result)?.into_strings()
    }

    fn compile_directive_wrapper(&self, meta: &DirectiveMeta, module: &TypeKey) -> Result<()> {
        if self.cache.borrow().directive_wrapper(&meta.key).is_some() {
            return Ok(());
        }
        let result = self.compilers.wrapper.compile(meta)?;
        self.bind_dependencies(&result, &[], &mut Vec::new())?;
        let path = format!("/{module}/{}/wrapper.factory.rs", meta.key);
        let wrapper = self
            .evaluator
            .evaluate(&path, &result)?
            .into_directive_wrapper()?;
        self.cache
            .borrow_mut()
            .insert_directive_wrapper(meta.key.clone(), wrapper);
        Ok(())
    }

    fn compile_module(&self, key: &TypeKey) -> Result<Rc<ModuleFactory>> {
        if let Some(factory) = self.cache.borrow().module_factory(key) {
            return Ok(factory);
        }
        let module = self.resolver.module_metadata(key)?;
        let result = self.compilers.module.compile(&module)?;
        self.bind_dependencies(&result, &[], &mut Vec::new())?;
        let factory = self
            .evaluator
            .evaluate(&format!("/{key}/module.factory.rs"), &result)?
            .into_module()?;
        self.cache
            .borrow_mut()
            .insert_module_factory(Rc::clone(&factory));
        debug!(module = %key, factories = factory.factories().len(), "compiled module");
        Ok(factory)
    }
}

fn not_declared(key: &TypeKey) -> CompileError {
    CompileError::configuration(format!(
        "Component {key} is not part of any module or the module has not been imported into your module."
    ))
}

fn not_a_component(key: &TypeKey) -> CompileError {
    CompileError::configuration(format!(
        "Could not compile '{key}' because it is not a component."
    ))
}
