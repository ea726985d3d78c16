use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::{AppView, CheckMode, Rejected, RenderNode, ViewError, ViewId, ViewType};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`ViewContainer`], recorded in the links of its views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

/// Anchor holding an ordered list of nested views and a list of projected views.
///
/// The order of the nested list is the render order. Projected views are
/// associated with the container but skipped by the cascading traversals;
/// only [`ViewContainer::map_nested_views`] sees them.
#[derive(Debug)]
pub struct ViewContainer {
    id: ContainerId,
    index: usize,
    parent_index: Option<usize>,
    nested: Vec<AppView>,
    projected: Vec<AppView>,
}

impl ViewContainer {
    pub fn new(index: usize, parent_index: Option<usize>) -> Self {
        Self {
            id: ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)),
            index,
            parent_index,
            nested: Vec::new(),
            projected: Vec::new(),
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Index of the anchor node within the owning view.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent_index
    }

    pub fn len(&self) -> usize {
        self.nested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nested.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AppView> {
        self.nested.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut AppView> {
        self.nested.get_mut(index)
    }

    /// Nested views in render order.
    pub fn nested_views(&self) -> &[AppView] {
        &self.nested
    }

    pub fn projected_views(&self) -> &[AppView] {
        &self.projected
    }

    pub fn position_of(&self, view: ViewId) -> Option<usize> {
        self.nested.iter().position(|v| v.id() == view)
    }

    /// Insert `view` into the nested list at `index`.
    ///
    /// On failure the view is handed back untouched and the container is unchanged.
    pub fn attach_view(&mut self, mut view: AppView, index: usize) -> Result<(), Rejected> {
        if view.view_type() == ViewType::Component {
            let error = ViewError::UnsupportedOperation {
                view: view.id(),
                operation: "attached",
            };
            return Err(Rejected::new(view, error));
        }
        if view.is_destroyed() {
            let error = ViewError::Destroyed { view: view.id() };
            return Err(Rejected::new(view, error));
        }
        if index > self.nested.len() {
            let error = ViewError::IndexOutOfBounds {
                index,
                len: self.nested.len(),
            };
            return Err(Rejected::new(view, error));
        }

        let prev = index.checked_sub(1).map(|i| self.nested[i].id());
        view.attach_to(self.id, prev);
        trace!(view = %view.id(), index, "attaching view");

        if index == self.nested.len() {
            self.nested.push(view);
        } else {
            self.nested.insert(index, view);
            self.relink(index + 1..index + 2);
        }
        Ok(())
    }

    /// Remove and return the nested view at `index`.
    pub fn detach_view(&mut self, index: usize) -> Result<AppView, ViewError> {
        let len = self.nested.len();
        let view = self
            .nested
            .get(index)
            .ok_or(ViewError::IndexOutOfBounds { index, len })?;
        if view.view_type() == ViewType::Component {
            return Err(ViewError::UnsupportedOperation {
                view: view.id(),
                operation: "detached",
            });
        }

        let mut view = if index + 1 == len {
            self.nested.pop().ok_or(ViewError::IndexOutOfBounds { index, len })?
        } else {
            let view = self.nested.remove(index);
            self.relink(index..index + 1);
            view
        };
        trace!(view = %view.id(), index, "detached view");
        view.detach();
        Ok(view)
    }

    /// Move a nested view to `new_index`, keeping its identity.
    pub fn move_view(&mut self, view: ViewId, new_index: usize) -> Result<(), ViewError> {
        let from = self.position_of(view).ok_or(ViewError::NotFound { view })?;
        if self.nested[from].view_type() == ViewType::Component {
            return Err(ViewError::UnsupportedOperation {
                view,
                operation: "moved",
            });
        }
        if self.nested[from].is_destroyed() {
            return Err(ViewError::Destroyed { view });
        }
        let len = self.nested.len();
        if new_index >= len {
            return Err(ViewError::IndexOutOfBounds {
                index: new_index,
                len,
            });
        }

        let moved = self.nested.remove(from);
        self.nested.insert(new_index, moved);
        self.relink(from.min(new_index)..from.max(new_index) + 2);
        trace!(view = %view, from, to = new_index, "moved view");
        Ok(())
    }

    /// Associate a view with this container without placing it in the render order.
    pub fn project_view(&mut self, mut view: AppView) -> Result<(), Rejected> {
        if view.is_destroyed() {
            let error = ViewError::Destroyed { view: view.id() };
            return Err(Rejected::new(view, error));
        }
        view.attach_to(self.id, None);
        self.projected.push(view);
        Ok(())
    }

    pub fn remove_projected_view(&mut self, view: ViewId) -> Result<AppView, ViewError> {
        let position = self
            .projected
            .iter()
            .position(|v| v.id() == view)
            .ok_or(ViewError::NotFound { view })?;
        let mut view = self.projected.remove(position);
        view.detach();
        Ok(view)
    }

    /// Run change detection over the nested views in list order.
    pub fn detect_changes_in_nested_views(&mut self, mode: CheckMode) -> Result<(), ViewError> {
        for view in &mut self.nested {
            view.detect_changes(mode)?;
        }
        Ok(())
    }

    /// Destroy every nested view in list order.
    pub fn destroy_nested_views(&mut self) {
        for view in &mut self.nested {
            view.destroy();
        }
    }

    pub fn visit_nested_view_root_nodes<F: FnMut(&RenderNode)>(&self, visitor: &mut F) {
        for view in &self.nested {
            view.visit_root_nodes(visitor);
        }
    }

    /// Apply `f` to every nested then projected view created from `class`.
    pub fn map_nested_views<T, F>(&self, class: &str, f: F) -> Vec<T>
    where
        F: FnMut(&AppView) -> T,
    {
        self.nested
            .iter()
            .chain(&self.projected)
            .filter(|v| v.class() == class)
            .map(f)
            .collect()
    }

    fn relink(&mut self, positions: std::ops::Range<usize>) {
        let end = positions.end.min(self.nested.len());
        for i in positions.start..end {
            let prev = i.checked_sub(1).map(|p| self.nested[p].id());
            self.nested[i].set_prev(prev);
        }
    }
}
