//! Runtime view tree.
//!
//! Views created by compiled view factories live in [`ViewContainer`]s. A
//! container owns an ordered list of nested views, whose order is the render
//! order, plus a list of projected views that only type-filtered queries see.
//!
//! # Example
//!
//! ```
//! use trellis_view::{AppView, CheckMode, ViewContainer, ViewType};
//!
//! let mut container = ViewContainer::new(0, None);
//! container.attach_view(AppView::new("Row", ViewType::Embedded), 0).unwrap();
//! container.attach_view(AppView::new("Row", ViewType::Embedded), 1).unwrap();
//!
//! let first = container.get(0).unwrap().id();
//! container.move_view(first, 1).unwrap();
//! container.detect_changes_in_nested_views(CheckMode::Update).unwrap();
//! assert_eq!(container.position_of(first), Some(1));
//! ```

mod container;
mod error;
mod view;

pub use container::{ContainerId, ViewContainer};
pub use error::{Rejected, ViewError};
pub use view::{
    AppView, CheckMode, ContainerLink, RenderNode, ViewHooks, ViewId, ViewState, ViewType,
};
