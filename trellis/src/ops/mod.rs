//! Core operations.
//!
//! This module contains the business logic for trellis commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod compile;
pub mod explain;

pub use check::check;
pub use compile::{CompileOptions, compile};
use eyre::{Result, bail};
pub use explain::explain;
use trellis_ir::TypeKey;
use trellis_manifest::Manifest;

/// The module named on the command line, or the manifest's root module.
fn module_key(manifest: &Manifest, module: Option<&str>) -> Result<TypeKey> {
    match module.or_else(|| manifest.root_module()) {
        Some(name) => Ok(TypeKey::new(name)),
        None => bail!(
            "'{}' declares several modules and no app.root; pass --module",
            manifest.app.name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_key_prefers_flag() {
        let manifest: Manifest = r#"
            [app]
            name = "demo"
            root = "AppModule"

            [modules.AppModule]
            [modules.AdminModule]
        "#
        .parse()
        .unwrap();

        assert_eq!(module_key(&manifest, None).unwrap(), TypeKey::new("AppModule"));
        assert_eq!(
            module_key(&manifest, Some("AdminModule")).unwrap(),
            TypeKey::new("AdminModule")
        );
    }

    #[test]
    fn test_module_key_requires_root_for_many_modules() {
        let manifest: Manifest = r#"
            [app]
            name = "demo"

            [modules.AppModule]
            [modules.AdminModule]
        "#
        .parse()
        .unwrap();

        let err = module_key(&manifest, None).unwrap_err();
        assert!(err.to_string().contains("pass --module"));
    }
}
