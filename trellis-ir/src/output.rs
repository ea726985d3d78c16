//! Output statement IR.
//!
//! Sub-compilers produce a list of [`Statement`]s plus the name of the
//! variable to export. A backend either interprets the list directly or
//! renders it to source before evaluating it.

use serde::Serialize;

use crate::TypeKey;

/// Index of a placeholder cell within the compile result that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlaceholderId(pub usize);

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Literal {
    Str(String),
    Int(i64),
    Bool(bool),
}

/// An expression in the output IR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    /// Reference to a variable declared earlier in the same statement list.
    Var(String),
    Array(Vec<Expr>),
    /// Forward reference bound by the compiler before evaluation.
    Placeholder(PlaceholderId),
    /// A view class definition.
    ViewDef(Box<ViewDefExpr>),
    /// A directive wrapper class.
    DirectiveWrapper {
        directive: TypeKey,
        inputs: Vec<String>,
    },
    /// A module factory listing its entry component factories.
    ModuleFactory {
        module: TypeKey,
        components: Vec<Expr>,
    },
}

impl Expr {
    /// A string literal.
    pub fn str(value: impl Into<String>) -> Self {
        Self::Literal(Literal::Str(value.into()))
    }

    /// A variable reference.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }
}

/// Definition of a view class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewDefExpr {
    /// Class name, also used as the runtime type tag of created views.
    pub class_name: String,
    /// Styles applied to the view (usually a `Var` of the styles array).
    pub styles: Expr,
    /// Animation trigger names.
    pub animations: Vec<String>,
    /// Factories of the entry components this view can create.
    pub entry_factories: Vec<Expr>,
    /// Root nodes.
    pub nodes: Vec<NodeExpr>,
}

/// A node in a view definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeExpr {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        /// View class of the component hosted on this element.
        component: Option<Expr>,
        /// Wrappers of directives matched on this element.
        directives: Vec<Expr>,
        children: Vec<NodeExpr>,
    },
    Text {
        value: String,
    },
    /// View container anchor, with the embedded template if one was declared.
    Anchor {
        template: Option<Box<ViewDefExpr>>,
    },
}

/// A statement in the output IR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Comment(String),
    DeclareVar { name: String, value: Expr },
}

impl Statement {
    /// Declare a variable.
    pub fn declare(name: impl Into<String>, value: Expr) -> Self {
        Self::DeclareVar {
            name: name.into(),
            value,
        }
    }

    /// The declared variable name, if this is a declaration.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Self::DeclareVar { name, .. } => Some(name),
            Self::Comment(_) => None,
        }
    }
}
