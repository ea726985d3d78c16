use std::path::{Path, PathBuf};

use super::Manifest;
use crate::Result;

/// Represents a trellis.toml file with both raw content and parsed manifest.
pub struct TrellisToml {
    path: PathBuf,
    content: String,
    manifest: Manifest,
}

impl TrellisToml {
    /// Open and parse a trellis.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(crate::Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        let manifest = Manifest::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            manifest,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory external templates and stylesheets are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("trellis.toml");
        std::fs::write(&path, "[app]\nname = \"demo\"\n").unwrap();

        let file = TrellisToml::open(&path).unwrap();
        assert_eq!(file.manifest().app.name, "demo");
        assert_eq!(file.base_dir(), temp.path());
        assert!(file.content().contains("demo"));
    }

    #[test]
    fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = TrellisToml::open(temp.path().join("missing.toml"))
            .err()
            .unwrap();
        assert!(matches!(*err, crate::Error::Io { .. }));
    }

    #[test]
    fn test_base_dir_of_bare_filename() {
        let file = TrellisToml {
            path: PathBuf::from("trellis.toml"),
            content: String::new(),
            manifest: "[app]\nname = \"demo\"".parse().unwrap(),
        };
        assert_eq!(file.base_dir(), Path::new("."));
    }
}
