//! Compile operation - module compilation and source output.

use std::{fs, path::PathBuf};

use eyre::{Context, Result};
use futures::executor::block_on;
use tracing::info;
use trellis_compiler::{
    Backend, CompilerConfig, ModuleWithComponentFactories, RuntimeCompiler,
    resolver::ManifestResolver,
};
use trellis_manifest::TrellisToml;

use super::module_key;
use crate::reports::{CompileReport, CompiledComponent};

/// Flags of the compile command.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub module: Option<String>,
    /// Overrides the `[compiler]` table.
    pub backend: Option<Backend>,
    pub async_mode: bool,
    pub out_dir: Option<PathBuf>,
}

/// Execute the compile operation.
///
/// Compiles the module and every component of its transitive graph, then
/// writes generated sources under `out_dir` when one is given.
pub fn compile(file: &TrellisToml, options: &CompileOptions) -> Result<CompileReport> {
    let manifest = file.manifest();
    let key = module_key(manifest, options.module.as_deref())?;

    let mut config = CompilerConfig::from_manifest(manifest);
    if let Some(backend) = options.backend {
        config = config.with_backend(backend);
    }
    let backend = config.backend;
    let compiler = RuntimeCompiler::new(ManifestResolver::from_toml(file), config);

    let compiled: ModuleWithComponentFactories = if options.async_mode {
        block_on(compiler.compile_module_and_all_components_async(&key))
    } else {
        compiler.compile_module_and_all_components_sync(&key)
    }
    .wrap_err_with(|| format!("Failed to compile {key}"))?;

    let components = compiled
        .component_factories
        .iter()
        .map(|factory| CompiledComponent {
            component: factory.component().to_string(),
            selector: factory.selector().to_string(),
            compiled: factory.host_template().is_compiled(),
        })
        .collect();

    let mut warnings = Vec::new();
    let sources = compiler.generated_sources();
    let mut written = Vec::new();
    if let Some(out_dir) = &options.out_dir {
        if backend == Backend::Interpret {
            warnings.push("the interpret backend produces no sources; nothing written".to_string());
        }
        for source in &sources {
            let path = out_dir.join(source.path.trim_start_matches('/'));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, &source.source)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }
    }

    info!(module = %key, components = compiled.component_factories.len(), "compiled");

    Ok(CompileReport {
        app: manifest.app.name.clone(),
        module: key.to_string(),
        backend,
        mode: if options.async_mode { "async" } else { "sync" },
        entry_components: compiled.module.factories().len(),
        components,
        stats: compiler.cache_stats(),
        generated: sources.into_iter().map(|s| s.path).collect(),
        out_dir: options.out_dir.clone(),
        written,
        warnings,
    })
}
