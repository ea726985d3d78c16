//! Resolved descriptors for components, directives, pipes and modules.
//!
//! Descriptors are produced by a resolver and are immutable afterwards; the
//! compiler shares them behind `Rc`.

use serde::Serialize;

use crate::TypeKey;

/// Template data of a component, with any external template already loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMeta {
    /// Template source.
    pub template: String,
    /// URL the template was loaded from, if it was external.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_url: Option<String>,
    /// Inline styles.
    pub styles: Vec<String>,
    /// External stylesheet URLs.
    pub style_urls: Vec<String>,
    /// Animation trigger names.
    pub animations: Vec<String>,
    /// Every stylesheet reachable from `style_urls`, with its content loaded.
    pub external_stylesheets: Vec<StylesheetMeta>,
}

/// A loaded external stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StylesheetMeta {
    pub url: String,
    /// Style text with the `@import` rules removed.
    pub styles: Vec<String>,
    /// URLs pulled in through `@import`.
    pub style_urls: Vec<String>,
}

impl StylesheetMeta {
    /// Split loaded stylesheet content into its rules and its imports.
    pub fn from_source(url: impl Into<String>, source: &str) -> Self {
        let style_urls = stylesheet_imports(source).map(str::to_string).collect();
        let rules: Vec<&str> = source
            .lines()
            .filter(|line| !line.trim_start().starts_with("@import"))
            .collect();
        let rules = rules.join("\n").trim().to_string();

        Self {
            url: url.into(),
            styles: if rules.is_empty() { Vec::new() } else { vec![rules] },
            style_urls,
        }
    }
}

/// URLs referenced by `@import` rules, in source order.
///
/// Accepts `@import "a.css";`, `@import 'a.css';` and `@import url(a.css);`.
pub fn stylesheet_imports(source: &str) -> impl Iterator<Item = &str> {
    source.lines().filter_map(|line| {
        let rest = line.trim().strip_prefix("@import")?.trim();
        let rest = rest.strip_suffix(';').unwrap_or(rest).trim();
        let rest = rest
            .strip_prefix("url(")
            .and_then(|r| r.strip_suffix(')'))
            .unwrap_or(rest)
            .trim();
        let url = rest.trim_matches(|c| c == '"' || c == '\'');
        (!url.is_empty()).then_some(url)
    })
}

/// Descriptor of a directive or component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveMeta {
    /// Type identity.
    pub key: TypeKey,
    /// CSS-like selector (`app-root`, `[highlight]`, `button[primary]`).
    pub selector: String,
    /// Whether this directive is a component (has a template).
    pub is_component: bool,
    /// Declared input names.
    pub inputs: Vec<String>,
    /// Template, present for components only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateMeta>,
    /// Components this component creates dynamically.
    pub entry_components: Vec<TypeKey>,
}

impl DirectiveMeta {
    /// The display name of the directive type.
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// The element name matched by the selector, if the selector has one.
    pub fn element_name(&self) -> Option<&str> {
        let tag = self.selector.split('[').next().unwrap_or_default().trim();
        (!tag.is_empty()).then_some(tag)
    }

    /// Attribute names required by the selector (`[a][b]` yields `a`, `b`).
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.selector
            .split('[')
            .skip(1)
            .filter_map(|part| part.split(']').next())
            .map(|attr| attr.split('=').next().unwrap_or(attr).trim())
            .filter(|attr| !attr.is_empty())
    }
}

/// Summary of a pipe, as needed by the template parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipeMeta {
    /// Type identity.
    pub key: TypeKey,
    /// Name used in templates (`{{ value | name }}`).
    pub name: String,
    /// Pure pipes are only re-evaluated when their input changes.
    pub pure: bool,
}

/// Transitive closure of a module's imports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransitiveModule {
    /// All modules in the closure, imports first and the module itself last.
    pub modules: Vec<TypeKey>,
    /// Directives visible to templates declared in the module.
    pub directives: Vec<TypeKey>,
    /// Pipes visible to templates declared in the module.
    pub pipes: Vec<TypeKey>,
}

/// Descriptor of a module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleMeta {
    /// Type identity.
    pub key: TypeKey,
    /// Directives and components declared by this module.
    pub declared_directives: Vec<TypeKey>,
    /// Pipes declared by this module.
    pub declared_pipes: Vec<TypeKey>,
    /// Directly imported modules.
    pub imported_modules: Vec<TypeKey>,
    /// Declarations made visible to importing modules.
    pub exports: Vec<TypeKey>,
    /// Components created dynamically, including bootstrap components.
    pub entry_components: Vec<TypeKey>,
    /// Components bootstrapped when the module starts.
    pub bootstrap_components: Vec<TypeKey>,
    /// Computed closure of imports.
    pub transitive: TransitiveModule,
}

impl ModuleMeta {
    /// The display name of the module type.
    pub fn name(&self) -> &str {
        self.key.name()
    }
}

/// Build the descriptor of the synthetic host component for `component`.
///
/// The host template instantiates the component through an element matching
/// its selector, so that compiling the host yields a factory for the component.
pub fn create_host_component_meta(component: &DirectiveMeta) -> DirectiveMeta {
    let tag = component.element_name().unwrap_or("div");
    let attrs: String = component
        .attribute_names()
        .map(|attr| format!(" {attr}"))
        .collect();

    DirectiveMeta {
        key: TypeKey::new(format!("{}_Host", component.name())),
        selector: "*".into(),
        is_component: true,
        inputs: Vec::new(),
        template: Some(TemplateMeta {
            template: format!("<{tag}{attrs}></{tag}>"),
            template_url: None,
            styles: Vec::new(),
            style_urls: Vec::new(),
            animations: Vec::new(),
            external_stylesheets: Vec::new(),
        }),
        entry_components: Vec::new(),
    }
}
