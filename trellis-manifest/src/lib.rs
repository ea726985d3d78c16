//! `trellis.toml` manifest parsing and validation.
//!
//! A manifest declares the app graph the compiler works on: modules, the
//! components, directives and pipes they declare, and the compiler settings.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod manifest;

pub use error::{Error, Result, SourceContext};
pub use manifest::{
    AppConfig, Backend, CompilerSection, ComponentDecl, DeclKind, DirectiveDecl, Manifest,
    ModuleDecl, ParseContext, PipeDecl, TemplateSource, TrellisToml, parse_manifest,
};
