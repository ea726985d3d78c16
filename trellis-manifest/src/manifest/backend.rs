//! Code generation backend selection.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How compiled statements are turned into executable artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Evaluate statements directly; no source is produced.
    #[default]
    Interpret,
    /// Render statements to source under a synthesized path, then evaluate.
    Generate,
}

impl Backend {
    /// Returns the backend identifier as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Interpret => "interpret",
            Backend::Generate => "generate",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "interpret" | "interp" => Ok(Backend::Interpret),
            "generate" | "gen" | "jit" => Ok(Backend::Generate),
            _ => Err(format!(
                "unknown backend '{}', expected 'interpret' or 'generate'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Backend::from_str("interpret").unwrap(), Backend::Interpret);
        assert_eq!(Backend::from_str("Generate").unwrap(), Backend::Generate);
        assert_eq!(Backend::from_str("jit").unwrap(), Backend::Generate);
        assert!(Backend::from_str("llvm").is_err());
    }

    #[test]
    fn test_default_is_interpret() {
        assert_eq!(Backend::default(), Backend::Interpret);
    }

    #[test]
    fn test_deserialize() {
        let backend: Backend = serde_json::from_str(r#""generate""#).unwrap();
        assert_eq!(backend, Backend::Generate);
    }
}
