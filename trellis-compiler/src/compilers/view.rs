use trellis_ir::{DirectiveMeta, Expr, NodeExpr, Statement, ViewDefExpr};

use super::{CompileResult, TemplateNode, ViewCompiler, sanitize_identifier};
use crate::Result;

/// Emits a single view class declaration. Child components, directives and
/// entry component factories are referenced through placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinViewCompiler;

impl ViewCompiler for BuiltinViewCompiler {
    fn compile(
        &self,
        component: &DirectiveMeta,
        nodes: &[TemplateNode],
        styles: Expr,
        animations: &[String],
    ) -> Result<CompileResult> {
        let class_name = format!("View_{}", sanitize_identifier(component.name()));
        let mut result = CompileResult::new(class_name.clone());
        let mut builder = ViewBuilder {
            result: &mut result,
            class_name: &class_name,
            styles: &styles,
            animations,
            embedded: 0,
        };

        let nodes = builder.nodes(nodes);
        let entry_factories = component
            .entry_components
            .iter()
            .map(|entry| builder.result.component_factory(entry.clone()))
            .collect();
        let view = ViewDefExpr {
            class_name: class_name.clone(),
            styles,
            animations: animations.to_vec(),
            entry_factories,
            nodes,
        };

        result.push(Statement::Comment(format!(
            "View class of {}",
            component.name()
        )));
        result.push(Statement::declare(class_name, Expr::ViewDef(Box::new(view))));
        Ok(result)
    }
}

struct ViewBuilder<'a> {
    result: &'a mut CompileResult,
    class_name: &'a str,
    styles: &'a Expr,
    animations: &'a [String],
    embedded: usize,
}

impl ViewBuilder<'_> {
    fn nodes(&mut self, nodes: &[TemplateNode]) -> Vec<NodeExpr> {
        nodes.iter().map(|node| self.node(node)).collect()
    }

    fn node(&mut self, node: &TemplateNode) -> NodeExpr {
        match node {
            TemplateNode::Text { value } => NodeExpr::Text {
                value: value.clone(),
            },
            TemplateNode::Element {
                tag,
                attrs,
                component,
                directives,
                children,
            } => NodeExpr::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                component: component
                    .as_ref()
                    .map(|key| self.result.view_class(key.clone())),
                directives: directives
                    .iter()
                    .map(|key| self.result.directive_wrapper(key.clone()))
                    .collect(),
                children: self.nodes(children),
            },
            TemplateNode::Template { children } => {
                self.embedded += 1;
                let class_name = format!("{}{}", self.class_name, self.embedded);
                let nodes = self.nodes(children);
                NodeExpr::Anchor {
                    template: Some(Box::new(ViewDefExpr {
                        class_name,
                        styles: self.styles.clone(),
                        animations: self.animations.to_vec(),
                        entry_factories: Vec::new(),
                        nodes,
                    })),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use trellis_ir::TypeKey;

    use super::*;
    use crate::compilers::Dependency;

    fn component(entry_components: Vec<TypeKey>) -> DirectiveMeta {
        DirectiveMeta {
            key: TypeKey::new("List"),
            selector: "item-list".into(),
            is_component: true,
            inputs: vec![],
            template: None,
            entry_components,
        }
    }

    #[test]
    fn test_dependencies_in_document_order() {
        let nodes = vec![
            TemplateNode::Element {
                tag: "item-card".into(),
                attrs: vec![("highlight".into(), String::new())],
                component: Some(TypeKey::new("Card")),
                directives: vec![TypeKey::new("Highlight")],
                children: vec![],
            },
            TemplateNode::Template {
                children: vec![TemplateNode::Text {
                    value: "row".into(),
                }],
            },
        ];

        let result = BuiltinViewCompiler
            .compile(
                &component(vec![TypeKey::new("Dialog")]),
                &nodes,
                Expr::var("styles_List"),
                &[],
            )
            .unwrap();

        assert_eq!(result.exported_name, "View_List");
        let targets: Vec<String> = result.dependencies.iter().map(Dependency::describe).collect();
        assert_eq!(
            targets,
            [
                "view class of Card",
                "wrapper of Highlight",
                "factory of Dialog"
            ]
        );

        let Some(Statement::DeclareVar {
            value: Expr::ViewDef(view),
            ..
        }) = result.statements.last()
        else {
            panic!("expected a view class declaration");
        };
        let NodeExpr::Anchor {
            template: Some(embedded),
        } = &view.nodes[1]
        else {
            panic!("expected an anchor");
        };
        assert_eq!(embedded.class_name, "View_List1");
        assert_eq!(embedded.styles, Expr::var("styles_List"));
    }
}
