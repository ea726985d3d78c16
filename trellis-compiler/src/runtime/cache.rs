use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;
use trellis_ir::TypeKey;

use crate::{ComponentFactory, DirectiveWrapper, ModuleFactory, TemplateHandle};

/// Compiled and pending artifacts, keyed by type.
///
/// Host templates are stored through the factory that wraps them, so a
/// component always hands out the same factory.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    templates: IndexMap<TypeKey, TemplateHandle>,
    host_templates: IndexMap<TypeKey, Rc<ComponentFactory>>,
    directive_wrappers: IndexMap<TypeKey, Rc<DirectiveWrapper>>,
    module_factories: IndexMap<TypeKey, Rc<ModuleFactory>>,
    declarations: IndexMap<TypeKey, TypeKey>,
}

/// Entry counts, for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub templates: usize,
    pub host_templates: usize,
    pub directive_wrappers: usize,
    pub module_factories: usize,
    /// Templates and host templates that finished their body pass.
    pub compiled: usize,
}

impl ArtifactCache {
    pub fn template(&self, key: &TypeKey) -> Option<TemplateHandle> {
        self.templates.get(key).cloned()
    }

    pub fn host_factory(&self, key: &TypeKey) -> Option<Rc<ComponentFactory>> {
        self.host_templates.get(key).cloned()
    }

    pub fn host_template(&self, key: &TypeKey) -> Option<TemplateHandle> {
        self.host_templates
            .get(key)
            .map(|factory| Rc::clone(factory.host_template()))
    }

    pub fn directive_wrapper(&self, key: &TypeKey) -> Option<Rc<DirectiveWrapper>> {
        self.directive_wrappers.get(key).cloned()
    }

    pub fn module_factory(&self, key: &TypeKey) -> Option<Rc<ModuleFactory>> {
        self.module_factories.get(key).cloned()
    }

    /// Module recorded as declaring `key` during a skeleton pass.
    pub fn declaring_module(&self, key: &TypeKey) -> Option<TypeKey> {
        self.declarations.get(key).cloned()
    }

    pub fn templates(&self) -> impl Iterator<Item = &TemplateHandle> {
        self.templates.values()
    }

    pub fn host_factories(&self) -> impl Iterator<Item = &Rc<ComponentFactory>> {
        self.host_templates.values()
    }

    pub(crate) fn insert_template(&mut self, template: TemplateHandle) {
        self.templates.insert(template.component().clone(), template);
    }

    pub(crate) fn insert_host_factory(&mut self, factory: Rc<ComponentFactory>) {
        self.host_templates
            .insert(factory.component().clone(), factory);
    }

    pub(crate) fn insert_directive_wrapper(&mut self, key: TypeKey, wrapper: Rc<DirectiveWrapper>) {
        self.directive_wrappers.insert(key, wrapper);
    }

    pub(crate) fn insert_module_factory(&mut self, factory: Rc<ModuleFactory>) {
        self.module_factories
            .insert(factory.module().clone(), factory);
    }

    pub(crate) fn record_declaration(&mut self, key: TypeKey, module: TypeKey) {
        self.declarations.insert(key, module);
    }

    /// Drop every entry stored under `key`.
    pub fn evict(&mut self, key: &TypeKey) {
        self.templates.shift_remove(key);
        self.host_templates.shift_remove(key);
        self.directive_wrappers.shift_remove(key);
        self.module_factories.shift_remove(key);
        self.declarations.shift_remove(key);
    }

    pub fn clear(&mut self) {
        self.templates.clear();
        self.host_templates.clear();
        self.directive_wrappers.clear();
        self.module_factories.clear();
        self.declarations.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let compiled = self
            .templates
            .values()
            .chain(self.host_templates.values().map(|f| f.host_template()))
            .filter(|t| t.is_compiled())
            .count();
        CacheStats {
            templates: self.templates.len(),
            host_templates: self.host_templates.len(),
            directive_wrappers: self.directive_wrappers.len(),
            module_factories: self.module_factories.len(),
            compiled,
        }
    }
}

#[cfg(test)]
mod tests {
    use trellis_ir::{DirectiveMeta, create_host_component_meta};

    use super::*;
    use crate::CompiledTemplate;

    fn card() -> Rc<DirectiveMeta> {
        Rc::new(DirectiveMeta {
            key: TypeKey::new("Card"),
            selector: "card-view".into(),
            is_component: true,
            inputs: vec![],
            template: None,
            entry_components: vec![],
        })
    }

    #[test]
    fn test_evict_drops_all_entries_for_key() {
        let meta = card();
        let module = TypeKey::new("AppModule");
        let mut cache = ArtifactCache::default();
        cache.insert_template(Rc::new(CompiledTemplate::new(
            false,
            meta.key.clone(),
            module.clone(),
            Rc::clone(&meta),
        )));
        let host = Rc::new(CompiledTemplate::new(
            true,
            meta.key.clone(),
            module.clone(),
            Rc::new(create_host_component_meta(&meta)),
        ));
        cache.insert_host_factory(Rc::new(ComponentFactory::new("card-view", host)));
        cache.record_declaration(meta.key.clone(), module.clone());

        assert_eq!(
            cache.stats(),
            CacheStats {
                templates: 1,
                host_templates: 1,
                ..CacheStats::default()
            }
        );
        assert_eq!(cache.declaring_module(&meta.key), Some(module));
        assert!(cache.host_template(&meta.key).unwrap().is_host());

        cache.evict(&meta.key);
        assert_eq!(cache.stats(), CacheStats::default());
        assert!(cache.declaring_module(&meta.key).is_none());
    }
}
