use trellis_ir::{Expr, ModuleMeta, Statement};

use super::{CompileResult, ModuleCompiler, sanitize_identifier};
use crate::Result;

/// Emits the module factory, referencing the host factory of every entry
/// component (bootstrap components included).
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinModuleCompiler;

impl ModuleCompiler for BuiltinModuleCompiler {
    fn compile(&self, module: &ModuleMeta) -> Result<CompileResult> {
        let mut result =
            CompileResult::new(format!("{}Factory", sanitize_identifier(module.name())));
        let components = module
            .entry_components
            .iter()
            .map(|entry| result.component_factory(entry.clone()))
            .collect();

        let name = result.exported_name.clone();
        result.push(Statement::declare(
            name,
            Expr::ModuleFactory {
                module: module.key.clone(),
                components,
            },
        ));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use trellis_ir::{TransitiveModule, TypeKey};

    use super::*;
    use crate::compilers::Dependency;

    #[test]
    fn test_factory_per_entry_component() {
        let module = ModuleMeta {
            key: TypeKey::new("AppModule"),
            declared_directives: vec![TypeKey::new("App"), TypeKey::new("Dialog")],
            declared_pipes: vec![],
            imported_modules: vec![],
            exports: vec![],
            entry_components: vec![TypeKey::new("Dialog"), TypeKey::new("App")],
            bootstrap_components: vec![TypeKey::new("App")],
            transitive: TransitiveModule::default(),
        };

        let result = BuiltinModuleCompiler.compile(&module).unwrap();
        assert_eq!(result.exported_name, "AppModuleFactory");
        let components: Vec<&str> = result
            .dependencies
            .iter()
            .map(|d| match d {
                Dependency::ComponentFactory { component, .. } => component.name(),
                other => panic!("unexpected dependency {other:?}"),
            })
            .collect();
        assert_eq!(components, ["Dialog", "App"]);
    }
}
