//! Sub-compilers and the compile results they produce.
//!
//! Each sub-compiler turns one kind of descriptor into a [`CompileResult`]: a
//! statement list, the name of the variable to export, and the dependencies
//! the statements refer to through placeholders. The orchestrator binds every
//! placeholder before the result reaches a backend.
//!
//! The traits are the seams for custom implementations; the built-in ones
//! are collected in [`SubCompilers::default`].

mod animation;
mod module;
mod style;
mod template;
mod view;
mod wrapper;

use std::{
    cell::OnceCell,
    fmt,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

pub use animation::BuiltinAnimationCompiler;
pub use module::BuiltinModuleCompiler;
pub use style::BuiltinStyleCompiler;
pub use template::{BuiltinTemplateParser, TemplateNode};
use trellis_ir::{
    DirectiveMeta, Expr, ModuleMeta, PipeMeta, PlaceholderId, Statement, StylesheetMeta, TypeKey,
};
pub use view::BuiltinViewCompiler;
pub use wrapper::BuiltinDirectiveWrapperCompiler;

use crate::{CompileError, ComponentFactory, DirectiveWrapper, Result, TemplateHandle};

static NEXT_PLACEHOLDER: AtomicUsize = AtomicUsize::new(0);

/// What a placeholder resolves to.
#[derive(Debug, Clone)]
pub enum Binding {
    ViewClass(TemplateHandle),
    ComponentFactory(Rc<ComponentFactory>),
    DirectiveWrapper(Rc<DirectiveWrapper>),
    /// Evaluated styles of an external stylesheet.
    Styles(Vec<String>),
}

/// A forward reference, bound exactly once before evaluation.
pub struct Placeholder {
    id: PlaceholderId,
    cell: OnceCell<Binding>,
}

impl Placeholder {
    fn new() -> Self {
        Self {
            id: PlaceholderId(NEXT_PLACEHOLDER.fetch_add(1, Ordering::Relaxed)),
            cell: OnceCell::new(),
        }
    }

    pub fn id(&self) -> PlaceholderId {
        self.id
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.cell.get()
    }

    pub fn is_bound(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn bind(&self, binding: Binding) -> Result<()> {
        self.cell.set(binding).map_err(|_| {
            CompileError::illegal_state(format!("placeholder {} was bound twice", self.id.0))
        })
    }
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Placeholder")
            .field("id", &self.id.0)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// A reference from compiled statements to another artifact.
#[derive(Debug)]
pub enum Dependency {
    /// View class of a component template.
    ViewClass {
        placeholder: Placeholder,
        component: TypeKey,
    },
    /// Factory backed by the host template of a component.
    ComponentFactory {
        placeholder: Placeholder,
        component: TypeKey,
    },
    DirectiveWrapper {
        placeholder: Placeholder,
        directive: TypeKey,
    },
    Stylesheet {
        placeholder: Placeholder,
        url: String,
    },
}

impl Dependency {
    pub fn placeholder(&self) -> &Placeholder {
        match self {
            Self::ViewClass { placeholder, .. }
            | Self::ComponentFactory { placeholder, .. }
            | Self::DirectiveWrapper { placeholder, .. }
            | Self::Stylesheet { placeholder, .. } => placeholder,
        }
    }

    /// Human readable description of the target.
    pub fn describe(&self) -> String {
        match self {
            Self::ViewClass { component, .. } => format!("view class of {component}"),
            Self::ComponentFactory { component, .. } => format!("factory of {component}"),
            Self::DirectiveWrapper { directive, .. } => format!("wrapper of {directive}"),
            Self::Stylesheet { url, .. } => format!("stylesheet {url}"),
        }
    }
}

/// Output of a sub-compiler.
#[derive(Debug)]
pub struct CompileResult {
    pub statements: Vec<Statement>,
    pub exported_name: String,
    pub dependencies: Vec<Dependency>,
}

impl CompileResult {
    pub fn new(exported_name: impl Into<String>) -> Self {
        Self {
            statements: Vec::new(),
            exported_name: exported_name.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn view_class(&mut self, component: TypeKey) -> Expr {
        self.depend(|placeholder| Dependency::ViewClass {
            placeholder,
            component,
        })
    }

    pub fn component_factory(&mut self, component: TypeKey) -> Expr {
        self.depend(|placeholder| Dependency::ComponentFactory {
            placeholder,
            component,
        })
    }

    pub fn directive_wrapper(&mut self, directive: TypeKey) -> Expr {
        self.depend(|placeholder| Dependency::DirectiveWrapper {
            placeholder,
            directive,
        })
    }

    pub fn stylesheet(&mut self, url: impl Into<String>) -> Expr {
        let url = url.into();
        self.depend(|placeholder| Dependency::Stylesheet { placeholder, url })
    }

    /// Concatenate results in order, exporting the last one's variable.
    pub fn concat(results: impl IntoIterator<Item = CompileResult>) -> Self {
        let mut merged = Self::new(String::new());
        for result in results {
            merged.statements.extend(result.statements);
            merged.dependencies.extend(result.dependencies);
            merged.exported_name = result.exported_name;
        }
        merged
    }

    /// Find the binding of a placeholder referenced by these statements.
    pub fn binding(&self, id: PlaceholderId) -> Result<&Binding> {
        let dependency = self
            .dependencies
            .iter()
            .find(|d| d.placeholder().id() == id)
            .ok_or_else(|| {
                CompileError::illegal_state(format!("unknown placeholder {}", id.0))
            })?;
        dependency.placeholder().binding().ok_or_else(|| {
            CompileError::illegal_state(format!("{} was never bound", dependency.describe()))
        })
    }

    fn depend(&mut self, dependency: impl FnOnce(Placeholder) -> Dependency) -> Expr {
        let placeholder = Placeholder::new();
        let id = placeholder.id();
        self.dependencies.push(dependency(placeholder));
        Expr::Placeholder(id)
    }
}

/// Compiles component styles and external stylesheets.
pub trait StyleCompiler {
    fn compile_component(&self, component: &DirectiveMeta) -> Result<CompileResult>;

    fn compile_stylesheet(&self, stylesheet: &StylesheetMeta) -> Result<CompileResult>;
}

/// Validates and compiles animation triggers.
pub trait AnimationCompiler {
    /// Trigger names declared by the component.
    fn parse(&self, component: &DirectiveMeta) -> Result<Vec<String>>;

    fn compile(&self, component: &DirectiveMeta, triggers: &[String]) -> Result<CompileResult>;
}

/// Parses a template against the directives and pipes visible to it.
pub trait TemplateParser {
    fn parse(
        &self,
        component: &DirectiveMeta,
        template: &str,
        directives: &[Rc<DirectiveMeta>],
        pipes: &[Rc<PipeMeta>],
    ) -> Result<Vec<TemplateNode>>;
}

/// Compiles a parsed template into a view class definition.
pub trait ViewCompiler {
    fn compile(
        &self,
        component: &DirectiveMeta,
        nodes: &[TemplateNode],
        styles: Expr,
        animations: &[String],
    ) -> Result<CompileResult>;
}

pub trait ModuleCompiler {
    fn compile(&self, module: &ModuleMeta) -> Result<CompileResult>;
}

pub trait DirectiveWrapperCompiler {
    fn compile(&self, directive: &DirectiveMeta) -> Result<CompileResult>;
}

/// The sub-compilers used by a [`RuntimeCompiler`](crate::RuntimeCompiler).
pub struct SubCompilers {
    pub style: Box<dyn StyleCompiler>,
    pub animation: Box<dyn AnimationCompiler>,
    pub template: Box<dyn TemplateParser>,
    pub view: Box<dyn ViewCompiler>,
    pub module: Box<dyn ModuleCompiler>,
    pub wrapper: Box<dyn DirectiveWrapperCompiler>,
}

impl Default for SubCompilers {
    fn default() -> Self {
        Self {
            style: Box::new(BuiltinStyleCompiler),
            animation: Box::new(BuiltinAnimationCompiler),
            template: Box::new(BuiltinTemplateParser),
            view: Box::new(BuiltinViewCompiler),
            module: Box::new(BuiltinModuleCompiler),
            wrapper: Box::new(BuiltinDirectiveWrapperCompiler),
        }
    }
}

/// Variable-safe form of a type name or URL (`app/main.css` becomes `app_main_css`).
pub(crate) fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
