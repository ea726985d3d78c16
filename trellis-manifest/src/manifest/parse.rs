//! Manifest parsing from files and strings.

use std::{path::Path, str::FromStr};

use super::{DeclKind, Manifest, TemplateSource, validate::ParseContext};
use crate::{Error, Result, error::SourceContext};

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, "trellis.toml")
    }
}

impl Manifest {
    /// Parse a trellis.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_manifest(&content, &path.display().to_string())
    }

    /// Parse a trellis.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_manifest(content, filename)
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let manifest: Manifest = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    validate_manifest(&manifest, content, filename)?;
    Ok(manifest)
}

/// Validate the manifest after parsing.
fn validate_manifest(manifest: &Manifest, src: &str, filename: &str) -> Result<()> {
    let ctx = ParseContext::new(src, filename);

    validate_names(manifest, &ctx)?;

    if let Some(root) = &manifest.app.root {
        ctx.push("app")
            .expect_kind(manifest, root, &[DeclKind::Module], "module")?;
    }

    for (name, module) in &manifest.modules {
        let module_ctx = ctx.push("modules").push(name);
        let declarable = [DeclKind::Component, DeclKind::Directive, DeclKind::Pipe];

        for decl in &module.declarations {
            module_ctx.expect_kind(manifest, decl, &declarable, "declaration")?;
        }
        for import in &module.imports {
            module_ctx.expect_kind(manifest, import, &[DeclKind::Module], "module")?;
            if import == name {
                return Err(module_ctx.source_context().validation_error(
                    format!("module '{name}' imports itself"),
                    module_ctx.find_span(import),
                ));
            }
        }
        for export in &module.exports {
            module_ctx.expect_kind(manifest, export, &declarable, "declaration")?;
        }
        for entry in module.entry_components.iter().chain(&module.bootstrap) {
            module_ctx.expect_kind(manifest, entry, &[DeclKind::Component], "component")?;
        }
    }

    for (name, component) in &manifest.components {
        let comp_ctx = ctx.push("components").push(name);
        comp_ctx.validate_selector(&component.selector)?;
        if component.template_source().is_none() {
            let message = match (&component.template, &component.template_url) {
                (Some(_), Some(_)) => {
                    format!("component '{name}' sets both template and template_url")
                }
                _ => format!("component '{name}' needs either template or template_url"),
            };
            return Err(comp_ctx
                .source_context()
                .validation_error(message, comp_ctx.find_span(name)));
        }
        if let Some(TemplateSource::Url(url)) = component.template_source()
            && url.trim().is_empty()
        {
            return Err(comp_ctx.source_context().validation_error(
                format!("component '{name}' has an empty template_url"),
                comp_ctx.find_span(name),
            ));
        }
        for entry in &component.entry_components {
            comp_ctx.expect_kind(manifest, entry, &[DeclKind::Component], "component")?;
        }
    }

    for (name, directive) in &manifest.directives {
        ctx.push("directives")
            .push(name)
            .validate_selector(&directive.selector)?;
    }

    for (name, pipe) in &manifest.pipes {
        ctx.push("pipes").push(name).validate_name(&pipe.name, "pipe")?;
    }

    Ok(())
}

/// Validate every type name and reject names shared between tables.
fn validate_names(manifest: &Manifest, ctx: &ParseContext<'_>) -> Result<()> {
    let tables = [
        (DeclKind::Module, manifest.modules.keys().collect::<Vec<_>>()),
        (DeclKind::Component, manifest.components.keys().collect()),
        (DeclKind::Directive, manifest.directives.keys().collect()),
        (DeclKind::Pipe, manifest.pipes.keys().collect()),
    ];

    let mut seen: Vec<(&str, DeclKind)> = Vec::new();
    for (kind, names) in &tables {
        for name in names {
            ctx.validate_name(name, kind.as_str())?;
            if let Some((_, first)) = seen.iter().find(|(n, _)| n == name) {
                return Err(ctx.source_context().duplicate_name_error(
                    name.as_str(),
                    first.as_str(),
                    kind.as_str(),
                    ctx.find_span(name),
                ));
            }
            seen.push((name.as_str(), *kind));
        }
    }
    Ok(())
}
