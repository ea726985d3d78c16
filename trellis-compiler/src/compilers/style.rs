use trellis_ir::{DirectiveMeta, Expr, Statement, StylesheetMeta};

use super::{CompileResult, StyleCompiler, sanitize_identifier};
use crate::{CompileError, Result};

/// Emits a `styles_<Name>` array of the inline styles, with one stylesheet
/// placeholder per external URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinStyleCompiler;

impl BuiltinStyleCompiler {
    fn compile(name: &str, styles: &[String], style_urls: &[String]) -> CompileResult {
        let mut result = CompileResult::new(format!("styles_{}", sanitize_identifier(name)));
        let mut entries: Vec<Expr> = styles.iter().map(|style| Expr::str(style.trim())).collect();
        for url in style_urls {
            entries.push(result.stylesheet(url));
        }
        let name = result.exported_name.clone();
        result.push(Statement::declare(name, Expr::Array(entries)));
        result
    }
}

impl StyleCompiler for BuiltinStyleCompiler {
    fn compile_component(&self, component: &DirectiveMeta) -> Result<CompileResult> {
        let template = component.template.as_ref().ok_or_else(|| {
            CompileError::configuration(format!("{} is not a component", component.name()))
        })?;
        Ok(Self::compile(
            component.name(),
            &template.styles,
            &template.style_urls,
        ))
    }

    fn compile_stylesheet(&self, stylesheet: &StylesheetMeta) -> Result<CompileResult> {
        Ok(Self::compile(
            &stylesheet.url,
            &stylesheet.styles,
            &stylesheet.style_urls,
        ))
    }
}

#[cfg(test)]
mod tests {
    use trellis_ir::{TemplateMeta, TypeKey};

    use super::*;
    use crate::compilers::Dependency;

    #[test]
    fn test_inline_and_external_styles() {
        let component = DirectiveMeta {
            key: TypeKey::new("Card"),
            selector: "card".into(),
            is_component: true,
            inputs: vec![],
            template: Some(TemplateMeta {
                template: String::new(),
                template_url: None,
                styles: vec![" .card { margin: 0 } ".into()],
                style_urls: vec!["card.css".into()],
                animations: vec![],
                external_stylesheets: vec![],
            }),
            entry_components: vec![],
        };

        let result = BuiltinStyleCompiler.compile_component(&component).unwrap();
        assert_eq!(result.exported_name, "styles_Card");
        assert!(matches!(
            &result.dependencies[..],
            [Dependency::Stylesheet { url, .. }] if url == "card.css"
        ));
        let Statement::DeclareVar { value: Expr::Array(entries), .. } = &result.statements[0]
        else {
            panic!("expected an array declaration");
        };
        assert_eq!(entries[0], Expr::str(".card { margin: 0 }"));
        assert!(matches!(entries[1], Expr::Placeholder(_)));
    }

    #[test]
    fn test_stylesheet_name_is_sanitized() {
        let sheet = StylesheetMeta::from_source("theme/base.css", "body { margin: 0 }");
        let result = BuiltinStyleCompiler.compile_stylesheet(&sheet).unwrap();
        assert_eq!(result.exported_name, "styles_theme_base_css");
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_directive_has_no_styles() {
        let directive = DirectiveMeta {
            key: TypeKey::new("Highlight"),
            selector: "[highlight]".into(),
            is_component: false,
            inputs: vec![],
            template: None,
            entry_components: vec![],
        };
        assert!(BuiltinStyleCompiler.compile_component(&directive).is_err());
    }
}
