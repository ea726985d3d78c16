use thiserror::Error;

use crate::{AppView, ViewId};

/// Errors raised by structural view operations.
///
/// Every operation that returns one of these has left the tree unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("component view {view} can't be {operation}")]
    UnsupportedOperation {
        view: ViewId,
        operation: &'static str,
    },

    #[error("index {index} is out of bounds for a container of {len} views")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("view {view} is not a nested view of this container")]
    NotFound { view: ViewId },

    #[error("view {view} has been destroyed")]
    Destroyed { view: ViewId },
}

/// A view handed back to the caller because it could not be attached.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Rejected {
    pub view: Box<AppView>,
    #[source]
    pub error: ViewError,
}

impl Rejected {
    pub(crate) fn new(view: AppView, error: ViewError) -> Self {
        Self {
            view: Box::new(view),
            error,
        }
    }

    /// Take the rejected view back.
    pub fn into_view(self) -> AppView {
        *self.view
    }
}
