//! Metadata resolution.
//!
//! A [`Resolver`] supplies the descriptors the compiler works on. Loading a
//! module may need external resources (templates, stylesheets); in async mode
//! the returned [`Loading`] future settles once they are resident, in sync
//! mode loading fails if anything is missing.

mod loader;
mod manifest;

use std::rc::Rc;

use futures::future::LocalBoxFuture;
pub use loader::{FileResourceLoader, ResourceLoader, StaticResourceLoader};
pub use manifest::ManifestResolver;
use trellis_ir::{DirectiveMeta, ModuleMeta, PipeMeta, TypeKey};

use crate::Result;

/// Handle that settles when a module's resources are loaded.
pub type Loading = LocalBoxFuture<'static, Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Every resource must already be resident.
    Sync,
    /// Missing resources are fetched through the resource loader.
    Async,
}

/// Supplies component, directive, pipe and module descriptors.
///
/// The lookups other than [`Resolver::load_module_metadata`] assume the
/// module graph has been loaded.
pub trait Resolver {
    /// Resolve a module and start loading what its declarations need.
    fn load_module_metadata(
        &self,
        key: &TypeKey,
        mode: LoadMode,
    ) -> Result<(Rc<ModuleMeta>, Loading)>;

    fn module_metadata(&self, key: &TypeKey) -> Result<Rc<ModuleMeta>>;

    fn directive_metadata(&self, key: &TypeKey) -> Result<Rc<DirectiveMeta>>;

    fn pipe_summary(&self, key: &TypeKey) -> Result<Rc<PipeMeta>>;

    /// The loaded module declaring `key`, if any.
    fn declaring_module(&self, key: &TypeKey) -> Option<TypeKey>;

    fn clear_cache_for(&self, key: &TypeKey);

    fn clear_cache(&self);
}
