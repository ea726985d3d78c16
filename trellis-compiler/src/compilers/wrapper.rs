use trellis_ir::{DirectiveMeta, Expr, Statement};

use super::{CompileResult, DirectiveWrapperCompiler, sanitize_identifier};
use crate::Result;

/// Emits the wrapper class of a directive. Wrappers never reference other
/// artifacts, so they can be compiled during the skeleton pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinDirectiveWrapperCompiler;

impl DirectiveWrapperCompiler for BuiltinDirectiveWrapperCompiler {
    fn compile(&self, directive: &DirectiveMeta) -> Result<CompileResult> {
        let mut result =
            CompileResult::new(format!("Wrapper_{}", sanitize_identifier(directive.name())));
        let name = result.exported_name.clone();
        result.push(Statement::declare(
            name,
            Expr::DirectiveWrapper {
                directive: directive.key.clone(),
                inputs: directive.inputs.clone(),
            },
        ));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use trellis_ir::TypeKey;

    use super::*;

    #[test]
    fn test_wrapper_has_no_dependencies() {
        let directive = DirectiveMeta {
            key: TypeKey::new("Highlight"),
            selector: "[highlight]".into(),
            is_component: false,
            inputs: vec!["color".into()],
            template: None,
            entry_components: vec![],
        };
        let result = BuiltinDirectiveWrapperCompiler.compile(&directive).unwrap();
        assert_eq!(result.exported_name, "Wrapper_Highlight");
        assert!(result.dependencies.is_empty());
        assert_eq!(result.statements.len(), 1);
    }
}
