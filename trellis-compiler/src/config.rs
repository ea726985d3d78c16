//! Compiler configuration.

use trellis_manifest::{Backend, Manifest};

/// Settings fixed for the lifetime of a [`RuntimeCompiler`](crate::RuntimeCompiler).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerConfig {
    /// How compiled statements become artifacts.
    pub backend: Backend,
}

impl CompilerConfig {
    /// Read the `[compiler]` table of a manifest.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            backend: manifest.compiler.backend,
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }
}
