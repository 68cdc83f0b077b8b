use super::common::{
    anchored_location, children, compact, first_child_of_kind, named_children, node_location,
    node_text, parse_int_literal, unquote, ParseError, ParseResult, Parser,
};
use crate::graph::{
    simple_type_name, Annotation, AnnotationArgument, CallKind, CallSite, Declaration,
    DeclarationId, DeclarationKind, Expr, Import, Language,
};
use std::path::Path;
use tree_sitter::Node;

/// Java front end backed by tree-sitter-java
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for JavaParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ParseResult, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .map_err(|e| ParseError::Grammar {
                language: "java",
                message: e.to_string(),
            })?;

        let tree = parser
            .parse(contents, None)
            .ok_or_else(|| ParseError::NoTree {
                path: path.to_path_buf(),
            })?;

        let mut walker = JavaWalker {
            path,
            source: contents,
            result: ParseResult::new(path, Language::Java),
        };
        walker.visit(tree.root_node(), None);
        Ok(walker.result)
    }
}

struct JavaWalker<'a> {
    path: &'a Path,
    source: &'a str,
    result: ParseResult,
}

impl<'a> JavaWalker<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        node_text(node, self.source)
    }

    fn visit(&mut self, node: Node<'_>, parent: Option<&DeclarationId>) {
        match node.kind() {
            "package_declaration" => {
                if let Some(name) = named_children(node)
                    .into_iter()
                    .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
                {
                    self.result.file.package = Some(compact(self.text(name)));
                }
            }
            "import_declaration" => self.visit_import(node),
            "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration" => self.visit_type(node, parent),
            "field_declaration" | "constant_declaration" => self.visit_field(node, parent),
            "method_declaration" | "constructor_declaration" => self.visit_method(node, parent),
            "method_invocation" => {
                self.record_invocation(node);
                self.visit_children(node, parent);
            }
            "object_creation_expression" => {
                self.record_creation(node);
                self.visit_children(node, parent);
            }
            _ => self.visit_children(node, parent),
        }
    }

    fn visit_children(&mut self, node: Node<'_>, parent: Option<&DeclarationId>) {
        for child in named_children(node) {
            self.visit(child, parent);
        }
    }

    fn visit_import(&mut self, node: Node<'_>) {
        let Some(name) = named_children(node)
            .into_iter()
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
        else {
            return;
        };
        let wildcard = children(node).iter().any(|c| c.kind() == "asterisk");
        self.result.file.imports.push(Import {
            path: compact(self.text(name)),
            wildcard,
            alias: None,
        });
    }

    fn visit_type(&mut self, node: Node<'_>, parent: Option<&DeclarationId>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            self.visit_children(node, parent);
            return;
        };

        let kind = match node.kind() {
            "interface_declaration" | "annotation_type_declaration" => DeclarationKind::Interface,
            "enum_declaration" => DeclarationKind::Enum,
            _ => DeclarationKind::Class,
        };

        let id = DeclarationId::new(self.path.to_path_buf(), node.start_byte(), node.end_byte());
        let mut decl = Declaration::new(
            id.clone(),
            self.text(name_node).to_string(),
            kind,
            anchored_location(node, name_node, self.path),
            Language::Java,
        );
        decl.parent = parent.cloned();
        self.apply_modifiers(node, &mut decl);
        decl.super_types = self.super_types(node);
        self.result.declarations.push(decl);

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, Some(&id));
        }
    }

    fn super_types(&self, node: Node<'_>) -> Vec<String> {
        let mut supers = Vec::new();
        for child in children(node) {
            match child.kind() {
                "superclass" => {
                    if let Some(ty) = child.named_child(0) {
                        supers.push(compact(self.text(ty)));
                    }
                }
                "super_interfaces" | "extends_interfaces" => {
                    if let Some(list) = first_child_of_kind(child, "type_list") {
                        for ty in named_children(list) {
                            supers.push(compact(self.text(ty)));
                        }
                    }
                }
                _ => {}
            }
        }
        supers
    }

    fn visit_field(&mut self, node: Node<'_>, parent: Option<&DeclarationId>) {
        let type_name = node
            .child_by_field_name("type")
            .map(|t| compact(self.text(t)));

        for declarator in children(node)
            .into_iter()
            .filter(|c| c.kind() == "variable_declarator")
        {
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let mut decl = Declaration::new(
                DeclarationId::new(
                    self.path.to_path_buf(),
                    declarator.start_byte(),
                    declarator.end_byte(),
                ),
                self.text(name_node).to_string(),
                DeclarationKind::Field,
                anchored_location(node, name_node, self.path),
                Language::Java,
            );
            decl.parent = parent.cloned();
            decl.type_name = type_name.clone();
            self.apply_modifiers(node, &mut decl);

            let value = declarator.child_by_field_name("value");
            decl.initializer = value.map(|v| self.expr(v));
            self.result.declarations.push(decl);

            if let Some(value) = value {
                self.visit(value, parent);
            }
        }
    }

    fn visit_method(&mut self, node: Node<'_>, parent: Option<&DeclarationId>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            self.visit_children(node, parent);
            return;
        };

        let id = DeclarationId::new(self.path.to_path_buf(), node.start_byte(), node.end_byte());
        let mut decl = Declaration::new(
            id.clone(),
            self.text(name_node).to_string(),
            DeclarationKind::Method,
            anchored_location(node, name_node, self.path),
            Language::Java,
        );
        decl.parent = parent.cloned();
        decl.type_name = node
            .child_by_field_name("type")
            .map(|t| compact(self.text(t)));
        self.apply_modifiers(node, &mut decl);
        self.result.declarations.push(decl);

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, Some(&id));
        }
    }

    /// Collect keyword modifiers and annotations from the `modifiers` child
    fn apply_modifiers(&self, node: Node<'_>, decl: &mut Declaration) {
        let Some(modifiers) = first_child_of_kind(node, "modifiers") else {
            return;
        };
        for child in children(modifiers) {
            match child.kind() {
                "annotation" | "marker_annotation" => decl.annotations.push(self.annotation(child)),
                _ if !child.is_named() => decl.modifiers.push(self.text(child).to_string()),
                _ => {}
            }
        }
    }

    fn annotation(&self, node: Node<'_>) -> Annotation {
        let name = node
            .child_by_field_name("name")
            .map(|n| compact(self.text(n)))
            .unwrap_or_default();

        let mut arguments = Vec::new();
        if let Some(list) = node.child_by_field_name("arguments") {
            for arg in named_children(list) {
                if arg.kind() == "element_value_pair" {
                    let key = arg.child_by_field_name("key").map(|k| self.text(k).to_string());
                    let value = arg
                        .child_by_field_name("value")
                        .map(|v| self.expr(v))
                        .unwrap_or_else(|| Expr::Other(String::new()));
                    arguments.push(AnnotationArgument {
                        name: key,
                        value,
                        location: node_location(arg, self.path),
                    });
                } else if arg.kind() != "comment" {
                    arguments.push(AnnotationArgument {
                        name: None,
                        value: self.expr(arg),
                        location: node_location(arg, self.path),
                    });
                }
            }
        }

        Annotation {
            name,
            arguments,
            location: node_location(node, self.path),
        }
    }

    fn arguments(&self, node: Node<'_>) -> Vec<Expr> {
        node.child_by_field_name("arguments")
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .filter(|a| a.kind() != "comment")
                    .map(|a| self.expr(a))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record_invocation(&mut self, node: Node<'_>) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let call = CallSite {
            receiver: node
                .child_by_field_name("object")
                .map(|o| compact(self.text(o))),
            name: self.text(name).to_string(),
            arguments: self.arguments(node),
            kind: CallKind::Method,
            location: node_location(node, self.path),
            language: Language::Java,
        };
        self.result.calls.push(call);
    }

    fn record_creation(&mut self, node: Node<'_>) {
        let Some(ty) = node.child_by_field_name("type") else {
            return;
        };
        let call = CallSite {
            receiver: None,
            name: simple_type_name(&compact(self.text(ty))).to_string(),
            arguments: self.arguments(node),
            kind: CallKind::Constructor,
            location: node_location(node, self.path),
            language: Language::Java,
        };
        self.result.calls.push(call);
    }

    fn expr(&self, node: Node<'_>) -> Expr {
        let text = self.text(node);
        match node.kind() {
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => parse_int_literal(text)
                .map(Expr::Int)
                .unwrap_or_else(|| Expr::Literal(text.to_string())),
            "string_literal" => Expr::Str(unquote(text)),
            "true" => Expr::Bool(true),
            "false" => Expr::Bool(false),
            "null_literal" => Expr::Null,
            "character_literal" | "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                Expr::Literal(text.to_string())
            }
            "identifier" | "field_access" | "scoped_identifier" => Expr::Reference(compact(text)),
            "class_literal" => {
                let ty = node.named_child(0).map(|t| self.text(t)).unwrap_or(text);
                Expr::ClassLiteral(simple_type_name(&compact(ty)).to_string())
            }
            "element_value_array_initializer" | "array_initializer" => Expr::Array(
                named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() != "comment")
                    .map(|c| self.expr(c))
                    .collect(),
            ),
            "array_creation_expression" => match first_child_of_kind(node, "array_initializer") {
                Some(init) => self.expr(init),
                None => Expr::New(
                    node.child_by_field_name("type")
                        .map(|t| self.text(t).to_string())
                        .unwrap_or_default(),
                ),
            },
            "annotation" | "marker_annotation" => Expr::Annotation(Box::new(self.annotation(node))),
            "method_invocation" => Expr::Call {
                receiver: node
                    .child_by_field_name("object")
                    .map(|o| compact(self.text(o))),
                name: node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default(),
            },
            "object_creation_expression" => Expr::New(
                node.child_by_field_name("type")
                    .map(|t| simple_type_name(&compact(self.text(t))).to_string())
                    .unwrap_or_default(),
            ),
            "lambda_expression" | "method_reference" => Expr::Lambda,
            "parenthesized_expression" => node
                .named_child(0)
                .map(|inner| self.expr(inner))
                .unwrap_or_else(|| Expr::Other(text.to_string())),
            "cast_expression" => node
                .child_by_field_name("value")
                .map(|v| self.expr(v))
                .unwrap_or_else(|| Expr::Other(text.to_string())),
            "unary_expression" => {
                let operator = node.child_by_field_name("operator").map(|o| self.text(o));
                let operand = node.child_by_field_name("operand").map(|o| self.expr(o));
                match (operator, operand) {
                    (Some("-"), Some(Expr::Int(v))) => Expr::Int(-v),
                    (Some("+"), Some(Expr::Int(v))) => Expr::Int(v),
                    _ => Expr::Other(text.to_string()),
                }
            }
            "binary_expression" => {
                let operator = node.child_by_field_name("operator").map(|o| self.text(o));
                match (
                    operator,
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) {
                    (Some("+"), Some(left), Some(right)) => {
                        let mut parts = Vec::new();
                        for side in [self.expr(left), self.expr(right)] {
                            match side {
                                Expr::Concat(inner) => parts.extend(inner),
                                other => parts.push(other),
                            }
                        }
                        Expr::Concat(parts)
                    }
                    _ => Expr::Other(text.to_string()),
                }
            }
            _ => Expr::Other(text.to_string()),
        }
    }
}
