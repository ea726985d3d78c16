//! Built-in template parser for a small HTML subset.
//!
//! Supported: elements with attributes, text with `{{ }}` interpolations,
//! comments, `<template>` anchors and void/self-closing elements. Elements
//! are matched against the selectors of the directives in scope.

use std::rc::Rc;

use trellis_ir::{DirectiveMeta, PipeMeta, TypeKey};

use super::TemplateParser;
use crate::{CompileError, Result};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// A parsed template node with its matched directives.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        /// Component whose selector matched the element.
        component: Option<TypeKey>,
        /// Non-component directives whose selectors matched.
        directives: Vec<TypeKey>,
        children: Vec<TemplateNode>,
    },
    Text {
        value: String,
    },
    /// `<template>` anchor holding an embedded view.
    Template {
        children: Vec<TemplateNode>,
    },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTemplateParser;

impl TemplateParser for BuiltinTemplateParser {
    fn parse(
        &self,
        component: &DirectiveMeta,
        template: &str,
        directives: &[Rc<DirectiveMeta>],
        pipes: &[Rc<PipeMeta>],
    ) -> Result<Vec<TemplateNode>> {
        let fail = |message: String| CompileError::template_parse(component.name(), message);

        let raw = Html::new(template).parse().map_err(fail)?;
        let scope = Scope { directives, pipes };
        raw.into_iter()
            .map(|node| scope.bind(node))
            .collect::<std::result::Result<_, _>>()
            .map_err(fail)
    }
}

/// Element tree before directive matching.
#[derive(Debug)]
enum RawNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<RawNode>,
    },
    Text(String),
}

struct Html<'a> {
    src: &'a str,
    pos: usize,
}

struct OpenElement {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<RawNode>,
}

impl<'a> Html<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn parse(mut self) -> std::result::Result<Vec<RawNode>, String> {
        let mut roots = Vec::new();
        let mut stack: Vec<OpenElement> = Vec::new();

        while self.pos < self.src.len() {
            let rest = self.rest();
            let node = if rest.starts_with("<!--") {
                let end = rest
                    .find("-->")
                    .ok_or_else(|| "Unterminated comment".to_string())?;
                self.pos += end + 3;
                None
            } else if let Some(close) = rest.strip_prefix("</") {
                let end = close
                    .find('>')
                    .ok_or_else(|| "Unterminated closing tag".to_string())?;
                let tag = close[..end].trim().to_ascii_lowercase();
                self.pos += 2 + end + 1;
                let open = match stack.pop() {
                    Some(open) if open.tag == tag => open,
                    _ => return Err(format!("Unexpected closing tag \"{tag}\"")),
                };
                Some(RawNode::Element {
                    tag: open.tag,
                    attrs: open.attrs,
                    children: open.children,
                })
            } else if rest.starts_with('<') {
                let (tag, attrs, self_closing) = self.open_tag()?;
                if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
                    Some(RawNode::Element {
                        tag,
                        attrs,
                        children: Vec::new(),
                    })
                } else {
                    stack.push(OpenElement {
                        tag,
                        attrs,
                        children: Vec::new(),
                    });
                    None
                }
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                self.pos += end;
                let text = collapse_whitespace(&rest[..end]);
                (!text.is_empty()).then_some(RawNode::Text(text))
            };

            if let Some(node) = node {
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => roots.push(node),
                }
            }
        }

        match stack.pop() {
            Some(open) => Err(format!("Unclosed element <{}>", open.tag)),
            None => Ok(roots),
        }
    }

    /// Parse `<tag attr="value" flag>` starting at `<`.
    fn open_tag(&mut self) -> std::result::Result<(String, Vec<(String, String)>, bool), String> {
        self.pos += 1;
        let tag = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if tag.is_empty() {
            return Err(format!("Unexpected character at offset {}", self.pos - 1));
        }
        let tag = tag.to_ascii_lowercase();

        let mut attrs = Vec::new();
        loop {
            self.take_while(char::is_whitespace);
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.pos += 2;
                return Ok((tag, attrs, true));
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return Ok((tag, attrs, false));
            }
            if rest.is_empty() {
                return Err(format!("Unterminated tag <{tag}>"));
            }

            let name = self.take_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'));
            if name.is_empty() {
                return Err(format!("Malformed attribute in <{tag}>"));
            }
            let name = name.to_string();
            self.take_while(char::is_whitespace);

            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.take_while(char::is_whitespace);
                self.attr_value(&tag)?
            } else {
                String::new()
            };
            attrs.push((name, value));
        }
    }

    fn attr_value(&mut self, tag: &str) -> std::result::Result<String, String> {
        let rest = self.rest();
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let end = rest[1..]
                    .find(quote)
                    .ok_or_else(|| format!("Unterminated attribute value in <{tag}>"))?;
                self.pos += end + 2;
                Ok(rest[1..=end].to_string())
            }
            _ => Ok(self
                .take_while(|c| !c.is_whitespace() && c != '>')
                .to_string()),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest.find(|c| !pred(c)).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Directives and pipes visible to the template.
struct Scope<'a> {
    directives: &'a [Rc<DirectiveMeta>],
    pipes: &'a [Rc<PipeMeta>],
}

impl Scope<'_> {
    fn bind(&self, node: RawNode) -> std::result::Result<TemplateNode, String> {
        match node {
            RawNode::Text(value) => {
                self.check_pipes(&value)?;
                Ok(TemplateNode::Text { value })
            }
            RawNode::Element {
                tag,
                attrs,
                children,
            } => {
                let children = children
                    .into_iter()
                    .map(|child| self.bind(child))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                if tag == "template" {
                    return Ok(TemplateNode::Template { children });
                }

                let matched: Vec<&Rc<DirectiveMeta>> = self
                    .directives
                    .iter()
                    .filter(|d| selector_matches(d, &tag, &attrs))
                    .collect();
                let components: Vec<&str> = matched
                    .iter()
                    .filter(|d| d.is_component)
                    .map(|d| d.name())
                    .collect();
                if components.len() > 1 {
                    return Err(format!(
                        "More than one component matched on <{tag}>: {}",
                        components.join(", ")
                    ));
                }
                let component = matched
                    .iter()
                    .find(|d| d.is_component)
                    .map(|d| d.key.clone());
                if component.is_none() && tag.contains('-') {
                    return Err(format!(
                        "'{tag}' is not a known element: declare its component in this module or import a module that exports it"
                    ));
                }

                Ok(TemplateNode::Element {
                    tag,
                    attrs,
                    component,
                    directives: matched
                        .iter()
                        .filter(|d| !d.is_component)
                        .map(|d| d.key.clone())
                        .collect(),
                    children,
                })
            }
        }
    }

    /// Every `{{ value | pipe }}` must name a pipe in scope.
    fn check_pipes(&self, text: &str) -> std::result::Result<(), String> {
        let mut rest = text;
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| format!("Unterminated interpolation in \"{text}\""))?;
            for segment in after[..end].split('|').skip(1) {
                let name = segment.split(':').next().unwrap_or_default().trim();
                if !self.pipes.iter().any(|p| p.name == name) {
                    return Err(format!("The pipe '{name}' could not be found"));
                }
            }
            rest = &after[end + 2..];
        }
        Ok(())
    }
}

fn selector_matches(directive: &DirectiveMeta, tag: &str, attrs: &[(String, String)]) -> bool {
    let element = directive.element_name();
    let mut required = directive.attribute_names().peekable();
    if element.is_none() && required.peek().is_none() {
        return false;
    }
    element.is_none_or(|el| el.eq_ignore_ascii_case(tag))
        && required.all(|attr| attrs.iter().any(|(name, _)| name == attr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(name: &str, selector: &str, is_component: bool) -> Rc<DirectiveMeta> {
        Rc::new(DirectiveMeta {
            key: TypeKey::new(name),
            selector: selector.into(),
            is_component,
            inputs: vec![],
            template: None,
            entry_components: vec![],
        })
    }

    fn pipe(name: &str) -> Rc<PipeMeta> {
        Rc::new(PipeMeta {
            key: TypeKey::new(format!("{name}Pipe")),
            name: name.into(),
            pure: true,
        })
    }

    fn parse(
        template: &str,
        directives: &[Rc<DirectiveMeta>],
        pipes: &[Rc<PipeMeta>],
    ) -> Result<Vec<TemplateNode>> {
        let owner = directive("App", "app-root", true);
        BuiltinTemplateParser.parse(&owner, template, directives, pipes)
    }

    #[test]
    fn test_elements_and_text() {
        let nodes = parse("<h1 class=\"title\">Hello   world</h1><br>", &[], &[]).unwrap();
        assert_eq!(
            nodes,
            vec![
                TemplateNode::Element {
                    tag: "h1".into(),
                    attrs: vec![("class".into(), "title".into())],
                    component: None,
                    directives: vec![],
                    children: vec![TemplateNode::Text {
                        value: "Hello world".into()
                    }],
                },
                TemplateNode::Element {
                    tag: "br".into(),
                    attrs: vec![],
                    component: None,
                    directives: vec![],
                    children: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_matches_components_and_directives() {
        let scope = [
            directive("Card", "card-view", true),
            directive("Highlight", "[highlight]", false),
            directive("Primary", "button[primary]", false),
        ];
        let nodes = parse(
            "<card-view highlight='yellow'></card-view><button primary>Go</button><div primary/>",
            &scope,
            &[],
        )
        .unwrap();

        let TemplateNode::Element {
            component,
            directives,
            attrs,
            ..
        } = &nodes[0]
        else {
            panic!("expected an element");
        };
        assert_eq!(component.as_ref().map(TypeKey::name), Some("Card"));
        assert_eq!(directives, &[TypeKey::new("Highlight")]);
        assert_eq!(attrs[0], ("highlight".to_string(), "yellow".to_string()));

        let TemplateNode::Element { directives, .. } = &nodes[1] else {
            panic!("expected an element");
        };
        assert_eq!(directives, &[TypeKey::new("Primary")]);

        let TemplateNode::Element { directives, .. } = &nodes[2] else {
            panic!("expected an element");
        };
        assert!(directives.is_empty());
    }

    #[test]
    fn test_template_anchor() {
        let nodes = parse("<ul><template><li>row</li></template></ul>", &[], &[]).unwrap();
        let TemplateNode::Element { children, .. } = &nodes[0] else {
            panic!("expected an element");
        };
        assert!(matches!(&children[0], TemplateNode::Template { children } if children.len() == 1));
    }

    #[test]
    fn test_unknown_element() {
        let err = parse("<item-list></item-list>", &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::TemplateParse { ref component, .. } if component == "App"
        ));
        assert!(err.to_string().contains("'item-list' is not a known element"));
    }

    #[test]
    fn test_conflicting_components() {
        let scope = [
            directive("A", "card-view", true),
            directive("B", "card-view", true),
        ];
        let err = parse("<card-view></card-view>", &scope, &[]).unwrap_err();
        assert!(err.to_string().contains("More than one component"));
    }

    #[test]
    fn test_pipes_must_be_in_scope() {
        let pipes = [pipe("upper")];
        assert!(parse("<p>{{ name | upper }}</p>", &[], &pipes).is_ok());
        assert!(parse("<p>{{ price | currency:'EUR' }}</p>", &[], &pipes).is_err());
        assert!(parse("<p>{{ name </p>", &[], &pipes).is_err());
    }

    #[test]
    fn test_structure_errors() {
        assert!(parse("<div><span></div>", &[], &[]).is_err());
        assert!(parse("<div>", &[], &[]).is_err());
        assert!(parse("<div class=\"x></div>", &[], &[]).is_err());
        assert!(parse("<!-- note --><p>ok</p>", &[], &[]).is_ok());
    }
}
