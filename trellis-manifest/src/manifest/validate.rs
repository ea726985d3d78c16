//! Validation context and utilities for manifest parsing.

use std::sync::Arc;

use miette::SourceSpan;

use super::{DeclKind, Manifest};
use crate::{Result, error::SourceContext};

/// Parsing and validation context that carries source information.
///
/// This struct encapsulates the source content, filename, and current path
/// through the manifest tables, making it easier to pass validation context
/// through nested checks.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "trellis.toml");
/// ctx.validate_name("AppComponent", "component")?;
///
/// let nested = ctx.push("modules").push("AppModule");
/// nested.expect_kind(&manifest, "Card", &[DeclKind::Component], "component")?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    /// Source context for error reporting (shared across nested contexts)
    source: Arc<SourceContext>,
    /// Path segments (e.g., ["modules", "AppModule"])
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context with the given source and filename.
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        self.source.src()
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    /// Get the source context for error creation.
    pub fn source_context(&self) -> &SourceContext {
        &self.source
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut new_path = self.path.clone();
        new_path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path: new_path,
        }
    }

    /// Get the current path as a dot-separated string.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Describe the current location for error messages, e.g. `'modules.AppModule'`.
    pub fn location(&self) -> String {
        if self.path.is_empty() {
            "the manifest".to_string()
        } else {
            format!("'{}'", self.path_string())
        }
    }

    /// Find the span of a name in the source.
    pub fn find_span(&self, name: &str) -> Option<SourceSpan> {
        find_name_span(self.source.src(), name)
    }

    /// Validate that a name is a valid type or pipe identifier.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        if let Some(reason) = validate_identifier(name) {
            let context = if self.path.is_empty() {
                kind.to_string()
            } else {
                format!("{} in {}", kind, self.location())
            };
            return Err(self.source.invalid_identifier_error(
                name,
                context,
                reason,
                self.find_span(name),
            ));
        }
        Ok(())
    }

    /// Check that `name` is declared with one of the `allowed` kinds.
    pub fn expect_kind(
        &self,
        manifest: &Manifest,
        name: &str,
        allowed: &[DeclKind],
        expected: &str,
    ) -> Result<()> {
        match manifest.kind_of(name) {
            Some(kind) if allowed.contains(&kind) => Ok(()),
            _ => Err(self.source.unknown_reference_error(
                name,
                expected,
                self.location(),
                find_reference_span(self.source.src(), name),
            )),
        }
    }

    /// Check that a selector is usable by the template matcher.
    pub fn validate_selector(&self, selector: &str) -> Result<()> {
        let trimmed = selector.trim();
        let reason = if trimmed.is_empty() {
            Some("selector cannot be empty")
        } else if trimmed.matches('[').count() != trimmed.matches(']').count() {
            Some("selector has unbalanced brackets")
        } else if trimmed.contains(char::is_whitespace) {
            Some("descendant selectors are not supported")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(self.source.validation_error(
                format!("invalid selector '{}' in {}: {}", selector, self.location(), reason),
                find_reference_span(self.source.src(), selector),
            )),
            None => Ok(()),
        }
    }
}

/// Find the span of a table name in the TOML source.
/// Searches for table headers like `[components.Name]`.
pub(crate) fn find_name_span(src: &str, name: &str) -> Option<SourceSpan> {
    let patterns = [format!(".{}]", name), format!(".{}.", name)];

    for pattern in &patterns {
        if let Some(pos) = src.find(pattern) {
            // +1 to skip the leading dot
            let start = pos + 1;
            return Some(SourceSpan::from((start, name.len())));
        }
    }

    find_reference_span(src, name)
}

/// Find the span of a quoted reference, e.g. inside `declarations = ["Name"]`.
pub(crate) fn find_reference_span(src: &str, name: &str) -> Option<SourceSpan> {
    for quote in ['"', '\''] {
        let pattern = format!("{quote}{name}{quote}");
        if let Some(pos) = src.find(&pattern) {
            return Some(SourceSpan::from((pos + 1, name.len())));
        }
    }
    None
}

/// Validate that a name is a valid identifier.
/// Returns None if valid, Some(reason) if invalid
pub(crate) fn validate_identifier(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();

    // First character must be a letter or underscore
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Some("name must start with a letter or underscore"),
        None => return Some("name cannot be empty"),
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Some("name must contain only letters, numbers, and underscores");
    }

    // Host component keys are synthesized as `<Component>_Host`
    if name.ends_with("_Host") {
        return Some("the '_Host' suffix is reserved for generated host components");
    }

    None
}
