//! Runtime artifacts produced by the compiler.
//!
//! A [`CompiledTemplate`] is created as a Pending skeleton before any body is
//! compiled, so that other templates can reference it while it is still being
//! built. The view class behind it is only available once the body pass has
//! marked it compiled.

use std::{cell::RefCell, fmt, rc::Rc};

use trellis_ir::{DirectiveMeta, TypeKey};
use trellis_view::{AppView, RenderNode, ViewHooks, ViewType};

use crate::{CompileError, Result};

/// Shared handle to a template skeleton.
pub type TemplateHandle = Rc<CompiledTemplate>;

/// Compilation state of a template.
#[derive(Clone)]
pub enum ArtifactState {
    Pending,
    Compiled(Rc<ViewDefinition>),
}

/// A component (or host) template and the view class compiled from it.
pub struct CompiledTemplate {
    is_host: bool,
    component: TypeKey,
    module: TypeKey,
    meta: Rc<DirectiveMeta>,
    state: RefCell<ArtifactState>,
}

impl CompiledTemplate {
    pub(crate) fn new(
        is_host: bool,
        component: TypeKey,
        module: TypeKey,
        meta: Rc<DirectiveMeta>,
    ) -> Self {
        Self {
            is_host,
            component,
            module,
            meta,
            state: RefCell::new(ArtifactState::Pending),
        }
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// The component this template renders, also for host templates.
    pub fn component(&self) -> &TypeKey {
        &self.component
    }

    /// The module whose scope the template was compiled in.
    pub fn module(&self) -> &TypeKey {
        &self.module
    }

    /// Descriptor the template is compiled from (the synthetic host descriptor for hosts).
    pub fn meta(&self) -> &Rc<DirectiveMeta> {
        &self.meta
    }

    pub fn state(&self) -> ArtifactState {
        self.state.borrow().clone()
    }

    pub fn is_compiled(&self) -> bool {
        matches!(*self.state.borrow(), ArtifactState::Compiled(_))
    }

    /// The compiled view class, or `IllegalState` while the template is Pending.
    pub fn view_class(&self) -> Result<Rc<ViewDefinition>> {
        match &*self.state.borrow() {
            ArtifactState::Compiled(view) => Ok(Rc::clone(view)),
            ArtifactState::Pending => Err(CompileError::illegal_state(format!(
                "{} of {} is not compiled yet",
                self.kind(),
                self.component
            ))),
        }
    }

    pub(crate) fn mark_compiled(&self, view: Rc<ViewDefinition>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let ArtifactState::Compiled(_) = *state {
            return Err(CompileError::illegal_state(format!(
                "{} of {} was compiled twice",
                self.kind(),
                self.component
            )));
        }
        *state = ArtifactState::Compiled(view);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        if self.is_host {
            "host template"
        } else {
            "template"
        }
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("component", &self.component)
            .field("module", &self.module)
            .field("is_host", &self.is_host)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

/// A node of a compiled view class.
#[derive(Debug, Clone)]
pub enum NodeDef {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        /// Template of the component hosted on this element.
        component: Option<TemplateHandle>,
        directives: Vec<Rc<DirectiveWrapper>>,
        children: Vec<NodeDef>,
    },
    Text(String),
    Anchor {
        template: Option<Rc<ViewDefinition>>,
    },
}

/// An evaluated view class.
#[derive(Debug)]
pub struct ViewDefinition {
    pub class_name: String,
    pub styles: Vec<String>,
    pub animations: Vec<String>,
    pub entry_factories: Vec<Rc<ComponentFactory>>,
    pub nodes: Vec<NodeDef>,
}

impl ViewDefinition {
    /// Instantiate a view of this class.
    ///
    /// Child components are instantiated through their template handles, so
    /// every one of them must be compiled by now. A component whose template
    /// hosts itself, directly or through other components, is a
    /// `Configuration` error.
    pub fn create_view(
        &self,
        view_type: ViewType,
        hooks: Option<Rc<dyn ViewHooks>>,
    ) -> Result<AppView> {
        self.instantiate(view_type, hooks, &mut Vec::new())
    }

    /// `path` holds the components being instantiated around this view.
    fn instantiate(
        &self,
        view_type: ViewType,
        hooks: Option<Rc<dyn ViewHooks>>,
        path: &mut Vec<TypeKey>,
    ) -> Result<AppView> {
        let mut view = AppView::new(self.class_name.as_str(), view_type);
        if let Some(hooks) = &hooks {
            view = view.with_hooks(Rc::clone(hooks));
        }

        let mut next_index = 0;
        let mut roots = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            roots.push(build_node(node, None, &mut next_index, &mut view, &hooks, path)?);
        }
        Ok(view.with_root_nodes(roots))
    }

    /// Templates declared by `<template>` anchors, in document order.
    ///
    /// The n-th entry belongs to the n-th container of a view created from
    /// this definition.
    pub fn embedded_templates(&self) -> Vec<Option<Rc<ViewDefinition>>> {
        fn collect(nodes: &[NodeDef], out: &mut Vec<Option<Rc<ViewDefinition>>>) {
            for node in nodes {
                match node {
                    NodeDef::Element { children, .. } => collect(children, out),
                    NodeDef::Anchor { template } => out.push(template.clone()),
                    NodeDef::Text(_) => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.nodes, &mut out);
        out
    }

    /// Factory of an entry component declared by the component of this view.
    pub fn entry_factory(&self, component: &TypeKey) -> Option<&Rc<ComponentFactory>> {
        self.entry_factories
            .iter()
            .find(|f| f.component() == component)
    }
}

fn build_node(
    node: &NodeDef,
    parent: Option<usize>,
    next_index: &mut usize,
    view: &mut AppView,
    hooks: &Option<Rc<dyn ViewHooks>>,
    path: &mut Vec<TypeKey>,
) -> Result<RenderNode> {
    let index = *next_index;
    *next_index += 1;

    match node {
        NodeDef::Text(text) => Ok(RenderNode::Text(text.clone())),
        NodeDef::Anchor { .. } => Ok(RenderNode::Anchor {
            container: view.add_container(index, parent),
        }),
        NodeDef::Element {
            tag,
            attrs,
            component,
            children,
            ..
        } => {
            let mut rendered = Vec::with_capacity(children.len());
            for child in children {
                rendered.push(build_node(child, Some(index), next_index, view, hooks, path)?);
            }
            if let Some(template) = component {
                let key = template.component();
                if let Some(start) = path.iter().position(|k| k == key) {
                    let chain: Vec<&str> = path[start..]
                        .iter()
                        .chain([key])
                        .map(TypeKey::name)
                        .collect();
                    return Err(CompileError::configuration(format!(
                        "Cyclic template of component {key}: {}",
                        chain.join(" -> ")
                    )));
                }
                path.push(key.clone());
                let component_view = template.view_class()?.instantiate(
                    ViewType::Component,
                    hooks.clone(),
                    path,
                )?;
                path.pop();
                view.add_component_view(component_view);
            }
            Ok(RenderNode::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                children: rendered,
            })
        }
    }
}

/// Creates host views of a component.
#[derive(Debug)]
pub struct ComponentFactory {
    selector: String,
    component: TypeKey,
    host: TemplateHandle,
}

impl ComponentFactory {
    pub(crate) fn new(selector: impl Into<String>, host: TemplateHandle) -> Self {
        Self {
            selector: selector.into(),
            component: host.component().clone(),
            host,
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn component(&self) -> &TypeKey {
        &self.component
    }

    pub fn host_template(&self) -> &TemplateHandle {
        &self.host
    }

    /// Create a host view. The host view class is looked up at call time.
    pub fn create(&self, hooks: Option<Rc<dyn ViewHooks>>) -> Result<AppView> {
        self.host.view_class()?.create_view(ViewType::Host, hooks)
    }
}

/// Compiled wrapper of a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveWrapper {
    pub directive: TypeKey,
    pub inputs: Vec<String>,
}

/// Compiled module: the factories of its entry components.
#[derive(Debug)]
pub struct ModuleFactory {
    module: TypeKey,
    factories: Vec<Rc<ComponentFactory>>,
}

impl ModuleFactory {
    pub(crate) fn new(module: TypeKey, factories: Vec<Rc<ComponentFactory>>) -> Self {
        Self { module, factories }
    }

    pub fn module(&self) -> &TypeKey {
        &self.module
    }

    pub fn factories(&self) -> &[Rc<ComponentFactory>] {
        &self.factories
    }

    pub fn factory(&self, component: &TypeKey) -> Option<&Rc<ComponentFactory>> {
        self.factories.iter().find(|f| f.component() == component)
    }
}

#[cfg(test)]
mod tests {
    use trellis_ir::create_host_component_meta;

    use super::*;

    fn component(name: &str, selector: &str) -> Rc<DirectiveMeta> {
        Rc::new(DirectiveMeta {
            key: TypeKey::new(name),
            selector: selector.into(),
            is_component: true,
            inputs: vec![],
            template: None,
            entry_components: vec![],
        })
    }

    fn definition(class_name: &str, nodes: Vec<NodeDef>) -> Rc<ViewDefinition> {
        Rc::new(ViewDefinition {
            class_name: class_name.into(),
            styles: vec![],
            animations: vec![],
            entry_factories: vec![],
            nodes,
        })
    }

    fn template(meta: Rc<DirectiveMeta>, is_host: bool) -> TemplateHandle {
        let component = meta.key.clone();
        Rc::new(CompiledTemplate::new(
            is_host,
            component,
            TypeKey::new("AppModule"),
            meta,
        ))
    }

    #[test]
    fn test_pending_template_is_illegal_to_use() {
        let card = template(component("Card", "card"), false);
        assert!(!card.is_compiled());
        assert!(matches!(
            card.view_class(),
            Err(CompileError::IllegalState { .. })
        ));
    }

    #[test]
    fn test_mark_compiled_once() {
        let card = template(component("Card", "card"), false);
        card.mark_compiled(definition("View_Card", vec![])).unwrap();
        assert!(card.is_compiled());
        assert!(
            card.mark_compiled(definition("View_Card", vec![]))
                .is_err()
        );
    }

    #[test]
    fn test_factory_fails_while_host_pending() {
        let card = component("Card", "card");
        let host = Rc::new(CompiledTemplate::new(
            true,
            card.key.clone(),
            TypeKey::new("AppModule"),
            Rc::new(create_host_component_meta(&card)),
        ));
        let factory = ComponentFactory::new(card.selector.clone(), Rc::clone(&host));
        assert_eq!(factory.component().name(), "Card");
        assert_eq!(factory.selector(), "card");
        assert!(matches!(
            factory.create(None),
            Err(CompileError::IllegalState { .. })
        ));

        host.mark_compiled(definition("View_Card_Host", vec![]))
            .unwrap();
        let view = factory.create(None).unwrap();
        assert_eq!(view.view_type(), ViewType::Host);
    }

    #[test]
    fn test_create_view_builds_components_and_containers() {
        let card = template(component("Card", "card"), false);
        card.mark_compiled(definition(
            "View_Card",
            vec![NodeDef::Text("card body".into())],
        ))
        .unwrap();

        let row = definition("View_App1", vec![NodeDef::Text("row".into())]);
        let app = definition(
            "View_App",
            vec![
                NodeDef::Element {
                    tag: "card".into(),
                    attrs: vec![],
                    component: Some(Rc::clone(&card)),
                    directives: vec![],
                    children: vec![],
                },
                NodeDef::Anchor {
                    template: Some(Rc::clone(&row)),
                },
            ],
        );

        let view = app.create_view(ViewType::Component, None).unwrap();
        assert_eq!(view.class(), "View_App");
        assert_eq!(view.component_views().len(), 1);
        assert_eq!(view.component_views()[0].class(), "View_Card");
        assert_eq!(view.containers().len(), 1);
        assert_eq!(view.containers()[0].index(), 1);
        assert!(matches!(
            view.root_nodes()[1],
            RenderNode::Anchor { container: 0 }
        ));

        let embedded = app.embedded_templates();
        assert_eq!(embedded.len(), 1);
        assert!(Rc::ptr_eq(embedded[0].as_ref().unwrap(), &row));
    }

    #[test]
    fn test_create_view_with_pending_child() {
        let card = template(component("Card", "card"), false);
        let app = definition(
            "View_App",
            vec![NodeDef::Element {
                tag: "card".into(),
                attrs: vec![],
                component: Some(card),
                directives: vec![],
                children: vec![],
            }],
        );
        assert!(matches!(
            app.create_view(ViewType::Component, None),
            Err(CompileError::IllegalState { .. })
        ));
    }
}
