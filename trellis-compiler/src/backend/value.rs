use std::rc::Rc;

use crate::{
    CompileError, ComponentFactory, DirectiveWrapper, ModuleFactory, Result, TemplateHandle,
    ViewDefinition,
};

/// Result of evaluating an expression.
#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Array(Vec<Value>),
    View(Rc<ViewDefinition>),
    /// A template skeleton standing in for its view class.
    Template(TemplateHandle),
    ComponentFactory(Rc<ComponentFactory>),
    DirectiveWrapper(Rc<DirectiveWrapper>),
    Module(Rc<ModuleFactory>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Array(_) => "array",
            Value::View(_) => "view class",
            Value::Template(_) => "template",
            Value::ComponentFactory(_) => "component factory",
            Value::DirectiveWrapper(_) => "directive wrapper",
            Value::Module(_) => "module factory",
        }
    }

    pub fn into_view(self) -> Result<Rc<ViewDefinition>> {
        match self {
            Value::View(view) => Ok(view),
            other => Err(mismatch("view class", &other)),
        }
    }

    pub fn into_template(self) -> Result<TemplateHandle> {
        match self {
            Value::Template(template) => Ok(template),
            other => Err(mismatch("template", &other)),
        }
    }

    pub fn into_component_factory(self) -> Result<Rc<ComponentFactory>> {
        match self {
            Value::ComponentFactory(factory) => Ok(factory),
            other => Err(mismatch("component factory", &other)),
        }
    }

    pub fn into_directive_wrapper(self) -> Result<Rc<DirectiveWrapper>> {
        match self {
            Value::DirectiveWrapper(wrapper) => Ok(wrapper),
            other => Err(mismatch("directive wrapper", &other)),
        }
    }

    pub fn into_module(self) -> Result<Rc<ModuleFactory>> {
        match self {
            Value::Module(module) => Ok(module),
            other => Err(mismatch("module factory", &other)),
        }
    }

    /// Flatten nested arrays of strings, as produced by style declarations.
    pub fn into_strings(self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        self.flatten_strings(&mut out)?;
        Ok(out)
    }

    fn flatten_strings(self, out: &mut Vec<String>) -> Result<()> {
        match self {
            Value::Str(s) => out.push(s),
            Value::Array(items) => {
                for item in items {
                    item.flatten_strings(out)?;
                }
            }
            other => return Err(mismatch("string", &other)),
        }
        Ok(())
    }
}

fn mismatch(expected: &str, found: &Value) -> CompileError {
    CompileError::illegal_state(format!("expected {expected}, found {}", found.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_strings_flattens() {
        let value = Value::Array(vec![
            Value::Str("a".into()),
            Value::Array(vec![Value::Str("b".into()), Value::Str("c".into())]),
        ]);
        assert_eq!(value.into_strings().unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_kind_mismatch() {
        let err = Value::Int(3).into_view().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Illegal state: expected view class, found integer"
        );
    }
}
