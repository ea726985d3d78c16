//! Manifest types and parsing for trellis.toml files.

mod backend;
mod file;
mod parse;
mod validate;

pub use backend::Backend;
pub use file::TrellisToml;
use indexmap::IndexMap;
pub use parse::parse_manifest;
use serde::Deserialize;
pub use validate::ParseContext;

/// Root manifest for trellis.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// App metadata
    pub app: AppConfig,

    /// Compiler settings
    #[serde(default)]
    pub compiler: CompilerSection,

    #[serde(default)]
    pub modules: IndexMap<String, ModuleDecl>,

    #[serde(default)]
    pub components: IndexMap<String, ComponentDecl>,

    #[serde(default)]
    pub directives: IndexMap<String, DirectiveDecl>,

    #[serde(default)]
    pub pipes: IndexMap<String, PipeDecl>,
}

/// The `[app]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    /// Module compiled when no module is given on the command line.
    pub root: Option<String>,
    pub description: Option<String>,
}

/// The `[compiler]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerSection {
    #[serde(default)]
    pub backend: Backend,
}

/// A `[modules.<Name>]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleDecl {
    /// Components, directives and pipes owned by the module.
    #[serde(default)]
    pub declarations: Vec<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub entry_components: Vec<String>,
    #[serde(default)]
    pub bootstrap: Vec<String>,
}

/// A `[components.<Name>]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentDecl {
    pub selector: String,
    /// Inline template.
    pub template: Option<String>,
    /// External template, relative to the manifest directory.
    pub template_url: Option<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub style_urls: Vec<String>,
    #[serde(default)]
    pub animations: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub entry_components: Vec<String>,
}

/// Where a component's template comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource<'a> {
    Inline(&'a str),
    Url(&'a str),
}

impl ComponentDecl {
    /// The template source. Validation guarantees exactly one is set.
    pub fn template_source(&self) -> Option<TemplateSource<'_>> {
        match (&self.template, &self.template_url) {
            (Some(inline), None) => Some(TemplateSource::Inline(inline)),
            (None, Some(url)) => Some(TemplateSource::Url(url)),
            _ => None,
        }
    }
}

/// A `[directives.<Name>]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectiveDecl {
    pub selector: String,
    #[serde(default)]
    pub inputs: Vec<String>,
}

/// A `[pipes.<Name>]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PipeDecl {
    /// Name used in templates.
    pub name: String,
    #[serde(default = "default_pure")]
    pub pure: bool,
}

fn default_pure() -> bool {
    true
}

/// Kind of a declared type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Module,
    Component,
    Directive,
    Pipe,
}

impl DeclKind {
    /// Returns the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Module => "module",
            DeclKind::Component => "component",
            DeclKind::Directive => "directive",
            DeclKind::Pipe => "pipe",
        }
    }
}

impl Manifest {
    /// Look up what kind of type a name refers to.
    pub fn kind_of(&self, name: &str) -> Option<DeclKind> {
        if self.components.contains_key(name) {
            Some(DeclKind::Component)
        } else if self.directives.contains_key(name) {
            Some(DeclKind::Directive)
        } else if self.pipes.contains_key(name) {
            Some(DeclKind::Pipe)
        } else if self.modules.contains_key(name) {
            Some(DeclKind::Module)
        } else {
            None
        }
    }

    /// The module compiled by default: `app.root`, or the only module.
    pub fn root_module(&self) -> Option<&str> {
        match &self.app.root {
            Some(root) => Some(root),
            None if self.modules.len() == 1 => self.modules.keys().next().map(String::as_str),
            None => None,
        }
    }

    /// Modules that declare the given name, in manifest order.
    pub fn declaring_modules<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.modules
            .iter()
            .filter(move |(_, module)| module.declarations.iter().any(|d| d == name))
            .map(|(module_name, _)| module_name.as_str())
    }
}
