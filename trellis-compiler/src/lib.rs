//! Compilation orchestrator for Trellis apps.
//!
//! [`RuntimeCompiler`] turns the components and modules described by a
//! [`Resolver`](resolver::Resolver) into view factories that create
//! [`trellis_view`] views.
//!
//! # Module Organization
//!
//! - [`resolver`] - Descriptor resolution and resource loading
//! - [`compilers`] - Sub-compiler traits, built-ins and compile results
//! - [`backend`] - Interpret and generate backends
//! - [`runtime`] - The orchestrator and its artifact cache

mod artifacts;
pub mod backend;
pub mod compilers;
mod config;
mod error;
pub mod resolver;
pub mod runtime;

pub use artifacts::{
    ArtifactState, CompiledTemplate, ComponentFactory, DirectiveWrapper, ModuleFactory, NodeDef,
    TemplateHandle, ViewDefinition,
};
pub use config::CompilerConfig;
pub use error::{CompileError, Result};
pub use runtime::{ModuleWithComponentFactories, RuntimeCompiler};
pub use trellis_manifest::Backend;
