use std::{
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{ContainerId, ViewContainer, ViewError};

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a view, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a view was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    /// Wraps a component so it can be created from a factory.
    Host,
    /// Renders a component's template; owned by its host element.
    Component,
    /// Created from a `<template>` anchor and placed in a container.
    Embedded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Created,
    Attached,
    Detached,
    Destroyed,
}

/// Mode of a change-detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    Update,
    /// Verification pass that must not observe any change.
    CheckNoChanges,
}

/// Where an attached view sits inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLink {
    pub container: ContainerId,
    /// The view rendered immediately before this one, `None` when first.
    pub prev: Option<ViewId>,
}

/// Rendered output of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<RenderNode>,
    },
    Text(String),
    /// Location of a [`ViewContainer`], by index into the owning view's containers.
    Anchor { container: usize },
}

/// Callbacks a compiled view runs during its lifecycle.
pub trait ViewHooks {
    fn on_detect_changes(&self, _view: &AppView, _mode: CheckMode) {}

    fn on_destroy(&self, _view: &AppView) {}
}

/// A runtime view instance.
pub struct AppView {
    id: ViewId,
    class: Rc<str>,
    view_type: ViewType,
    state: ViewState,
    link: Option<ContainerLink>,
    root_nodes: Vec<RenderNode>,
    containers: Vec<ViewContainer>,
    component_views: Vec<AppView>,
    hooks: Option<Rc<dyn ViewHooks>>,
    checks: u64,
}

impl AppView {
    pub fn new(class: impl Into<Rc<str>>, view_type: ViewType) -> Self {
        Self {
            id: ViewId::next(),
            class: class.into(),
            view_type,
            state: ViewState::Created,
            link: None,
            root_nodes: Vec::new(),
            containers: Vec::new(),
            component_views: Vec::new(),
            hooks: None,
            checks: 0,
        }
    }

    pub fn with_root_nodes(mut self, nodes: Vec<RenderNode>) -> Self {
        self.root_nodes = nodes;
        self
    }

    pub fn with_hooks(mut self, hooks: Rc<dyn ViewHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Add an empty container anchored at node `index` and return its position
    /// in [`AppView::containers`].
    pub fn add_container(&mut self, index: usize, parent_index: Option<usize>) -> usize {
        self.containers.push(ViewContainer::new(index, parent_index));
        self.containers.len() - 1
    }

    /// Attach the component view rendered by one of this view's elements.
    pub fn add_component_view(&mut self, mut view: AppView) {
        view.state = ViewState::Attached;
        self.component_views.push(view);
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Tag of the compiled view class this view was created from.
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == ViewState::Destroyed
    }

    pub fn link(&self) -> Option<ContainerLink> {
        self.link
    }

    pub fn root_nodes(&self) -> &[RenderNode] {
        &self.root_nodes
    }

    pub fn containers(&self) -> &[ViewContainer] {
        &self.containers
    }

    pub fn container_mut(&mut self, index: usize) -> Option<&mut ViewContainer> {
        self.containers.get_mut(index)
    }

    pub fn component_views(&self) -> &[AppView] {
        &self.component_views
    }

    /// Number of completed change-detection passes over this view.
    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// Run change detection over this view, its containers and its component views.
    pub fn detect_changes(&mut self, mode: CheckMode) -> Result<(), ViewError> {
        if self.is_destroyed() {
            return Err(ViewError::Destroyed { view: self.id });
        }
        if let Some(hooks) = self.hooks.clone() {
            hooks.on_detect_changes(self, mode);
        }
        for container in &mut self.containers {
            container.detect_changes_in_nested_views(mode)?;
        }
        for view in &mut self.component_views {
            view.detect_changes(mode)?;
        }
        self.checks += 1;
        Ok(())
    }

    /// Destroy this view and everything below it. Destroying twice is a no-op.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        for container in &mut self.containers {
            container.destroy_nested_views();
        }
        for view in &mut self.component_views {
            view.destroy();
        }
        if let Some(hooks) = self.hooks.clone() {
            hooks.on_destroy(self);
        }
        self.state = ViewState::Destroyed;
    }

    /// Visit the root nodes in render order, descending into anchored containers.
    pub fn visit_root_nodes<F: FnMut(&RenderNode)>(&self, visitor: &mut F) {
        for node in &self.root_nodes {
            visitor(node);
            if let RenderNode::Anchor { container } = node
                && let Some(container) = self.containers.get(*container)
            {
                container.visit_nested_view_root_nodes(visitor);
            }
        }
    }

    pub(crate) fn attach_to(&mut self, container: ContainerId, prev: Option<ViewId>) {
        self.state = ViewState::Attached;
        self.link = Some(ContainerLink { container, prev });
    }

    pub(crate) fn set_prev(&mut self, prev: Option<ViewId>) {
        if let Some(link) = &mut self.link {
            link.prev = prev;
        }
    }

    /// Drop the container link. A destroyed view stays destroyed.
    pub(crate) fn detach(&mut self) {
        if !self.is_destroyed() {
            self.state = ViewState::Detached;
        }
        self.link = None;
    }
}

impl fmt::Debug for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppView")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("view_type", &self.view_type)
            .field("state", &self.state)
            .field("link", &self.link)
            .field("containers", &self.containers.len())
            .field("component_views", &self.component_views.len())
            .finish_non_exhaustive()
    }
}
