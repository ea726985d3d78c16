use trellis_ir::{DirectiveMeta, Expr, Statement};

use super::{AnimationCompiler, CompileResult, sanitize_identifier};
use crate::{CompileError, Result};

/// Animation triggers are identified by name only.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinAnimationCompiler;

impl AnimationCompiler for BuiltinAnimationCompiler {
    fn parse(&self, component: &DirectiveMeta) -> Result<Vec<String>> {
        let Some(template) = &component.template else {
            return Ok(Vec::new());
        };

        let mut triggers: Vec<String> = Vec::with_capacity(template.animations.len());
        for name in &template.animations {
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(CompileError::template_parse(
                    component.name(),
                    format!("invalid animation trigger name '{name}'"),
                ));
            }
            if triggers.iter().any(|t| t == name) {
                return Err(CompileError::template_parse(
                    component.name(),
                    format!("animation trigger '{name}' is declared more than once"),
                ));
            }
            triggers.push(name.to_string());
        }
        Ok(triggers)
    }

    fn compile(&self, component: &DirectiveMeta, triggers: &[String]) -> Result<CompileResult> {
        let mut result = CompileResult::new(format!(
            "animations_{}",
            sanitize_identifier(component.name())
        ));
        let name = result.exported_name.clone();
        result.push(Statement::declare(
            name,
            Expr::Array(triggers.iter().map(Expr::str).collect()),
        ));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use trellis_ir::{TemplateMeta, TypeKey};

    use super::*;

    fn component(animations: &[&str]) -> DirectiveMeta {
        DirectiveMeta {
            key: TypeKey::new("Panel"),
            selector: "panel".into(),
            is_component: true,
            inputs: vec![],
            template: Some(TemplateMeta {
                template: String::new(),
                template_url: None,
                styles: vec![],
                style_urls: vec![],
                animations: animations.iter().map(|a| a.to_string()).collect(),
                external_stylesheets: vec![],
            }),
            entry_components: vec![],
        }
    }

    #[test]
    fn test_parse_triggers() {
        let comp = component(&["fade", " slide "]);
        let triggers = BuiltinAnimationCompiler.parse(&comp).unwrap();
        assert_eq!(triggers, ["fade", "slide"]);

        let result = BuiltinAnimationCompiler.compile(&comp, &triggers).unwrap();
        assert_eq!(result.exported_name, "animations_Panel");
        assert_eq!(result.statements.len(), 1);
    }

    #[test]
    fn test_rejects_duplicate_trigger() {
        let err = BuiltinAnimationCompiler
            .parse(&component(&["fade", "fade"]))
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_blank_trigger() {
        assert!(BuiltinAnimationCompiler.parse(&component(&["  "])).is_err());
    }
}
