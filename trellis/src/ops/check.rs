//! Check operation - manifest validation and summary.

use trellis_manifest::{TemplateSource, TrellisToml};

use crate::reports::{CheckReport, ModuleSummary};

/// Execute the check operation.
///
/// Parsing already validated the manifest; this summarizes the app graph and
/// collects warnings for things that only fail once a module is compiled.
pub fn check(file: &TrellisToml) -> CheckReport {
    let manifest = file.manifest();
    let mut warnings = Vec::new();

    if manifest.root_module().is_none() {
        warnings.push("no app.root and several modules; commands will need --module".to_string());
    }

    let declarable = manifest
        .components
        .keys()
        .map(|name| ("Component", name))
        .chain(manifest.directives.keys().map(|name| ("Directive", name)))
        .chain(manifest.pipes.keys().map(|name| ("Pipe", name)));
    for (kind, name) in declarable {
        if manifest.declaring_modules(name).next().is_none() {
            warnings.push(format!("{kind} {name} is not declared by any module"));
        }
    }

    for (name, component) in &manifest.components {
        let template = match component.template_source() {
            Some(TemplateSource::Url(url)) => Some(url),
            _ => None,
        };
        for url in template.into_iter().chain(component.style_urls.iter().map(String::as_str)) {
            if !file.base_dir().join(url).is_file() {
                warnings.push(format!("{name}: resource '{url}' not found"));
            }
        }
    }

    let modules = manifest
        .modules
        .iter()
        .map(|(name, module)| ModuleSummary {
            name: name.clone(),
            declarations: module.declarations.len(),
            imports: module.imports.clone(),
            bootstrap: module.bootstrap.clone(),
        })
        .collect();

    CheckReport {
        config_path: file.path().to_path_buf(),
        name: manifest.app.name.clone(),
        description: manifest.app.description.clone(),
        backend: manifest.compiler.backend,
        root_module: manifest.root_module().map(str::to_string),
        modules,
        components: manifest.components.len(),
        directives: manifest.directives.len(),
        pipes: manifest.pipes.len(),
        warnings,
    }
}
