use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use futures::{FutureExt, future::LocalBoxFuture};
use tracing::debug;

use crate::{CompileError, Result};

/// Fetches external templates and stylesheets by URL.
pub trait ResourceLoader {
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<String>>;
}

/// Reads resources from disk, relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileResourceLoader {
    base: PathBuf,
}

impl FileResourceLoader {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl ResourceLoader for FileResourceLoader {
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<String>> {
        let path = self.base.join(url.trim_start_matches('/'));
        let url = url.to_string();
        async move {
            debug!(url = %url, path = %path.display(), "reading resource");
            std::fs::read_to_string(&path).map_err(|e| CompileError::loading(url, e.to_string()))
        }
        .boxed_local()
    }
}

/// Serves resources from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticResourceLoader {
    resources: HashMap<String, String>,
}

impl StaticResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(url, content);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, content: impl Into<String>) {
        self.resources.insert(url.into(), content.into());
    }
}

impl ResourceLoader for StaticResourceLoader {
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<String>> {
        let result = self
            .resources
            .get(url)
            .cloned()
            .ok_or_else(|| CompileError::loading(url, "no such resource"));
        futures::future::ready(result).boxed_local()
    }
}
