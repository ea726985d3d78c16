use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;
use trellis_ir::{Expr, Literal, NodeExpr, Statement, ViewDefExpr};

use super::Value;
use crate::{
    CompileError, DirectiveWrapper, ModuleFactory, NodeDef, Result, ViewDefinition,
    compilers::{Binding, CompileResult},
};

/// Evaluates statement lists directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

impl Interpreter {
    /// Evaluate `result` and return the value of its exported variable.
    ///
    /// Every placeholder the statements reference must be bound.
    pub fn interpret(&self, result: &CompileResult) -> Result<Value> {
        let mut env = Env {
            vars: IndexMap::new(),
            result,
        };
        for statement in &result.statements {
            match statement {
                Statement::Comment(_) => {}
                Statement::DeclareVar { name, value } => {
                    let value = env.eval(value)?;
                    trace!(var = %name, kind = value.kind(), "declared");
                    env.vars.insert(name.clone(), value);
                }
            }
        }

        env.vars
            .swap_remove(&result.exported_name)
            .ok_or_else(|| {
                CompileError::illegal_state(format!(
                    "exported variable {} is never declared",
                    result.exported_name
                ))
            })
    }
}

struct Env<'a> {
    vars: IndexMap<String, Value>,
    result: &'a CompileResult,
}

impl Env<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value> {
        Ok(match expr {
            Expr::Literal(Literal::Str(s)) => Value::Str(s.clone()),
            Expr::Literal(Literal::Int(i)) => Value::Int(*i),
            Expr::Literal(Literal::Bool(b)) => Value::Bool(*b),
            Expr::Var(name) => self.vars.get(name).cloned().ok_or_else(|| {
                CompileError::illegal_state(format!("variable {name} is not declared"))
            })?,
            Expr::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<_>>()?,
            ),
            Expr::Placeholder(id) => match self.result.binding(*id)? {
                Binding::ViewClass(template) => Value::Template(Rc::clone(template)),
                Binding::ComponentFactory(factory) => Value::ComponentFactory(Rc::clone(factory)),
                Binding::DirectiveWrapper(wrapper) => Value::DirectiveWrapper(Rc::clone(wrapper)),
                Binding::Styles(styles) => {
                    Value::Array(styles.iter().cloned().map(Value::Str).collect())
                }
            },
            Expr::ViewDef(view) => Value::View(self.view(view)?),
            Expr::DirectiveWrapper { directive, inputs } => {
                Value::DirectiveWrapper(Rc::new(DirectiveWrapper {
                    directive: directive.clone(),
                    inputs: inputs.clone(),
                }))
            }
            Expr::ModuleFactory { module, components } => {
                let factories = components
                    .iter()
                    .map(|c| self.eval(c)?.into_component_factory())
                    .collect::<Result<_>>()?;
                Value::Module(Rc::new(ModuleFactory::new(module.clone(), factories)))
            }
        })
    }

    fn view(&self, view: &ViewDefExpr) -> Result<Rc<ViewDefinition>> {
        Ok(Rc::new(ViewDefinition {
            class_name: view.class_name.clone(),
            styles: self.eval(&view.styles)?.into_strings()?,
            animations: view.animations.clone(),
            entry_factories: view
                .entry_factories
                .iter()
                .map(|f| self.eval(f)?.into_component_factory())
                .collect::<Result<_>>()?,
            nodes: self.nodes(&view.nodes)?,
        }))
    }

    fn nodes(&self, nodes: &[NodeExpr]) -> Result<Vec<NodeDef>> {
        nodes.iter().map(|node| self.node(node)).collect()
    }

    fn node(&self, node: &NodeExpr) -> Result<NodeDef> {
        Ok(match node {
            NodeExpr::Text { value } => NodeDef::Text(value.clone()),
            NodeExpr::Element {
                tag,
                attrs,
                component,
                directives,
                children,
            } => NodeDef::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                component: component
                    .as_ref()
                    .map(|c| self.eval(c)?.into_template())
                    .transpose()?,
                directives: directives
                    .iter()
                    .map(|d| self.eval(d)?.into_directive_wrapper())
                    .collect::<Result<_>>()?,
                children: self.nodes(children)?,
            },
            NodeExpr::Anchor { template } => NodeDef::Anchor {
                template: template.as_deref().map(|t| self.view(t)).transpose()?,
            },
        })
    }
}
