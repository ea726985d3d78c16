//! Intermediate representation types for the Trellis UI compiler.
//!
//! This crate provides the type definitions shared by the compiler and the
//! manifest loader:
//!
//! - [`TypeKey`] - stable identity of a component, directive, pipe or module
//! - [`DirectiveMeta`], [`ModuleMeta`], [`PipeMeta`] - resolved descriptors
//! - [`Statement`], [`Expr`] - the output statement list fed to a backend
//!
//! # Architecture
//!
//! ```text
//! trellis.toml → trellis-manifest (parsing) → resolver → descriptors (this crate)
//!     → sub-compilers → statements (this crate) → backend → view factories
//! ```

mod key;
mod meta;
mod output;

pub use key::TypeKey;
pub use meta::{
    DirectiveMeta, ModuleMeta, PipeMeta, StylesheetMeta, TemplateMeta, TransitiveModule,
    create_host_component_meta, stylesheet_imports,
};
pub use output::{Expr, Literal, NodeExpr, PlaceholderId, Statement, ViewDefExpr};
