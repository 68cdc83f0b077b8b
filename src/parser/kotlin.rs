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

/// Kotlin front end backed by tree-sitter-kotlin
pub struct KotlinParser;

impl KotlinParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for KotlinParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ParseResult, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_kotlin::language())
            .map_err(|e| ParseError::Grammar {
                language: "kotlin",
                message: e.to_string(),
            })?;

        let tree = parser
            .parse(contents, None)
            .ok_or_else(|| ParseError::NoTree {
                path: path.to_path_buf(),
            })?;

        let mut walker = KotlinWalker {
            path,
            source: contents,
            result: ParseResult::new(path, Language::Kotlin),
            function_depth: 0,
        };
        walker.visit(tree.root_node(), None);
        Ok(walker.result)
    }
}

struct KotlinWalker<'a> {
    path: &'a Path,
    source: &'a str,
    result: ParseResult,
    /// Properties declared inside function bodies are locals, not fields
    function_depth: usize,
}

impl<'a> KotlinWalker<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        node_text(node, self.source)
    }

    fn visit(&mut self, node: Node<'_>, parent: Option<&DeclarationId>) {
        match node.kind() {
            "package_header" => {
                if let Some(name) = first_child_of_kind(node, "identifier") {
                    self.result.file.package = Some(compact(self.text(name)));
                }
            }
            "import_header" => self.visit_import(node),
            "class_declaration" | "object_declaration" | "companion_object" => {
                self.visit_type(node, parent)
            }
            "property_declaration" => self.visit_property(node, parent),
            "function_declaration" => self.visit_function(node, parent),
            "call_expression" => {
                self.record_call(node);
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
        let Some(name) = first_child_of_kind(node, "identifier") else {
            return;
        };
        let wildcard = children(node)
            .iter()
            .any(|c| c.kind() == "wildcard_import" || c.kind() == "*");
        let alias = first_child_of_kind(node, "import_alias")
            .and_then(|a| a.named_child(0))
            .map(|a| self.text(a).to_string());
        self.result.file.imports.push(Import {
            path: compact(self.text(name)),
            wildcard,
            alias,
        });
    }

    fn visit_type(&mut self, node: Node<'_>, parent: Option<&DeclarationId>) {
        let name_node = first_child_of_kind(node, "type_identifier");
        let all = children(node);

        let kind = match node.kind() {
            "object_declaration" => DeclarationKind::Object,
            "companion_object" => DeclarationKind::CompanionObject,
            _ if all.iter().any(|c| c.kind() == "interface") => DeclarationKind::Interface,
            _ if all.iter().any(|c| c.kind() == "enum") => DeclarationKind::Enum,
            _ => DeclarationKind::Class,
        };

        let name = match (name_node, kind) {
            (Some(n), _) => self.text(n).to_string(),
            (None, DeclarationKind::CompanionObject) => "Companion".to_string(),
            (None, _) => {
                self.visit_children(node, parent);
                return;
            }
        };

        let id = DeclarationId::new(self.path.to_path_buf(), node.start_byte(), node.end_byte());
        let mut decl = Declaration::new(
            id.clone(),
            name,
            kind,
            anchored_location(node, name_node.unwrap_or(node), self.path),
            Language::Kotlin,
        );
        decl.parent = parent.cloned();
        self.apply_modifiers(node, &mut decl);
        decl.super_types = all
            .iter()
            .filter(|c| c.kind() == "delegation_specifier")
            .filter_map(|spec| self.delegated_type(*spec))
            .collect();
        self.result.declarations.push(decl);

        if let Some(constructor) = first_child_of_kind(node, "primary_constructor") {
            self.visit_constructor_properties(constructor, &id);
        }
        // A local class has real members even inside a function body
        let depth = std::mem::take(&mut self.function_depth);
        for body in all
            .iter()
            .filter(|c| matches!(c.kind(), "class_body" | "enum_class_body"))
        {
            self.visit_children(*body, Some(&id));
        }
        self.function_depth = depth;
    }

    fn delegated_type(&self, spec: Node<'_>) -> Option<String> {
        let user_type = first_child_of_kind(spec, "user_type").or_else(|| {
            first_child_of_kind(spec, "constructor_invocation")
                .and_then(|ci| first_child_of_kind(ci, "user_type"))
        })?;
        Some(compact(self.text(user_type)))
    }

    /// `class Foo(val a: A)` declares property `a`
    fn visit_constructor_properties(&mut self, constructor: Node<'_>, owner: &DeclarationId) {
        let mut stack = vec![constructor];
        while let Some(node) = stack.pop() {
            if node.kind() != "class_parameter" {
                stack.extend(named_children(node));
                continue;
            }
            let all = children(node);
            if !all.iter().any(|c| {
                matches!(c.kind(), "val" | "var" | "binding_pattern_kind")
            }) {
                continue;
            }
            let Some(name_node) = first_child_of_kind(node, "simple_identifier") else {
                continue;
            };
            let mut decl = Declaration::new(
                DeclarationId::new(self.path.to_path_buf(), node.start_byte(), node.end_byte()),
                self.text(name_node).to_string(),
                DeclarationKind::Field,
                anchored_location(node, name_node, self.path),
                Language::Kotlin,
            );
            decl.parent = Some(owner.clone());
            decl.type_name = all
                .iter()
                .find(|c| is_type_node(c.kind()))
                .map(|t| compact(self.text(*t)));
            self.apply_modifiers(node, &mut decl);
            self.result.declarations.push(decl);
        }
    }

    fn visit_property(&mut self, node: Node<'_>, parent: Option<&DeclarationId>) {
        if self.function_depth > 0 {
            self.visit_children(node, parent);
            return;
        }
        let Some(variable) = first_child_of_kind(node, "variable_declaration") else {
            self.visit_children(node, parent);
            return;
        };
        let Some(name_node) = first_child_of_kind(variable, "simple_identifier") else {
            self.visit_children(node, parent);
            return;
        };

        let mut decl = Declaration::new(
            DeclarationId::new(self.path.to_path_buf(), node.start_byte(), node.end_byte()),
            self.text(name_node).to_string(),
            DeclarationKind::Field,
            anchored_location(node, name_node, self.path),
            Language::Kotlin,
        );
        decl.parent = parent.cloned();
        decl.type_name = named_children(variable)
            .into_iter()
            .find(|c| is_type_node(c.kind()))
            .map(|t| compact(self.text(t)));
        self.apply_modifiers(node, &mut decl);

        // The initializer is the expression following `=`; `by` delegates
        // are evaluated lazily and carry no initializer.
        let all = children(node);
        let initializer = all
            .iter()
            .position(|c| c.kind() == "=")
            .and_then(|eq| all[eq + 1..].iter().find(|c| c.is_named()).copied());
        decl.initializer = initializer.map(|v| self.expr(v, false));
        self.result.declarations.push(decl);

        if let Some(value) = initializer {
            self.visit(value, parent);
        }
        if let Some(delegate) = first_child_of_kind(node, "property_delegate") {
            self.visit_children(delegate, parent);
        }
    }

    fn visit_function(&mut self, node: Node<'_>, parent: Option<&DeclarationId>) {
        let Some(name_node) = first_child_of_kind(node, "simple_identifier") else {
            self.visit_children(node, parent);
            return;
        };

        let id = DeclarationId::new(self.path.to_path_buf(), node.start_byte(), node.end_byte());
        let mut decl = Declaration::new(
            id.clone(),
            self.text(name_node).to_string(),
            DeclarationKind::Method,
            anchored_location(node, name_node, self.path),
            Language::Kotlin,
        );
        decl.parent = parent.cloned();
        self.apply_modifiers(node, &mut decl);
        self.result.declarations.push(decl);

        if let Some(body) = first_child_of_kind(node, "function_body") {
            self.function_depth += 1;
            self.visit_children(body, Some(&id));
            self.function_depth -= 1;
        }
    }

    fn apply_modifiers(&self, node: Node<'_>, decl: &mut Declaration) {
        let Some(modifiers) = first_child_of_kind(node, "modifiers") else {
            return;
        };
        for child in named_children(modifiers) {
            if child.kind() == "annotation" {
                if let Some(annotation) = self.annotation(child) {
                    decl.annotations.push(annotation);
                }
            } else {
                decl.modifiers.push(self.text(child).trim().to_string());
            }
        }
    }

    /// `@Name` or `@Name(args)`
    fn annotation(&self, node: Node<'_>) -> Option<Annotation> {
        if let Some(invocation) = first_child_of_kind(node, "constructor_invocation") {
            let user_type = first_child_of_kind(invocation, "user_type")?;
            return Some(Annotation {
                name: compact(self.text(user_type)),
                arguments: first_child_of_kind(invocation, "value_arguments")
                    .map(|args| self.value_arguments(args))
                    .unwrap_or_default(),
                location: node_location(node, self.path),
            });
        }
        let user_type = first_child_of_kind(node, "user_type")?;
        Some(Annotation {
            name: compact(self.text(user_type)),
            arguments: Vec::new(),
            location: node_location(node, self.path),
        })
    }

    /// Arguments of an annotation or annotation-like constructor call
    fn value_arguments(&self, node: Node<'_>) -> Vec<AnnotationArgument> {
        named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "value_argument")
            .filter_map(|arg| {
                let all = children(arg);
                let named = all.iter().any(|c| c.kind() == "=");
                let value = all.iter().rev().find(|c| c.is_named())?;
                let name = if named {
                    first_child_of_kind(arg, "simple_identifier").map(|n| self.text(n).to_string())
                } else {
                    None
                };
                Some(AnnotationArgument {
                    name,
                    value: self.expr(*value, true),
                    location: node_location(arg, self.path),
                })
            })
            .collect()
    }

    /// Split a call into receiver and name
    fn callee(&self, node: Node<'_>) -> Option<(Option<String>, String)> {
        let callee = node.named_child(0)?;
        match callee.kind() {
            "simple_identifier" => Some((None, self.text(callee).to_string())),
            "navigation_expression" => {
                let receiver = callee.named_child(0)?;
                let suffix = first_child_of_kind(callee, "navigation_suffix")?;
                let name = first_child_of_kind(suffix, "simple_identifier")?;
                Some((
                    Some(compact(self.text(receiver))),
                    self.text(name).to_string(),
                ))
            }
            _ => None,
        }
    }

    fn call_arguments(&self, node: Node<'_>) -> Vec<Expr> {
        first_child_of_kind(node, "call_suffix")
            .and_then(|suffix| first_child_of_kind(suffix, "value_arguments"))
            .map(|args| {
                self.value_arguments(args)
                    .into_iter()
                    .map(|a| a.value)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record_call(&mut self, node: Node<'_>) {
        let Some((receiver, name)) = self.callee(node) else {
            return;
        };
        // Kotlin has no `new`; a capitalized callee is taken as a constructor
        let kind = if starts_uppercase(&name) {
            CallKind::Constructor
        } else {
            CallKind::Method
        };
        let (receiver, name) = match kind {
            CallKind::Constructor => match receiver {
                // `java.io.File(..)` names a type through its package
                Some(r) if !starts_uppercase(r.rsplit('.').next().unwrap_or(&r)) => (None, name),
                other => (other, name),
            },
            CallKind::Method => (receiver, name),
        };
        let call = CallSite {
            receiver,
            name,
            arguments: self.call_arguments(node),
            kind,
            location: node_location(node, self.path),
            language: Language::Kotlin,
        };
        self.result.calls.push(call);
    }

    /// Convert an expression. Inside annotation arguments a capitalized call
    /// such as `AutoMigration(from = 1, to = 2)` is a nested annotation.
    fn expr(&self, node: Node<'_>, in_annotation: bool) -> Expr {
        let text = self.text(node);
        if text.trim_end().ends_with("::class") {
            let ty = text.trim_end().trim_end_matches("::class");
            return Expr::ClassLiteral(simple_type_name(&compact(ty)).to_string());
        }

        match node.kind() {
            "integer_literal" | "hex_literal" | "bin_literal" | "long_literal"
            | "unsigned_literal" => parse_int_literal(text)
                .map(Expr::Int)
                .unwrap_or_else(|| Expr::Literal(text.to_string())),
            "string_literal" => self.string_literal(node),
            "boolean_literal" => Expr::Bool(text == "true"),
            "character_literal" | "real_literal" => Expr::Literal(text.to_string()),
            "null" | "null_literal" => Expr::Null,
            "simple_identifier" => Expr::Reference(text.to_string()),
            "navigation_expression" => Expr::Reference(compact(text)),
            "callable_reference" | "lambda_literal" | "anonymous_function" => Expr::Lambda,
            "collection_literal" => Expr::Array(
                named_children(node)
                    .into_iter()
                    .map(|c| self.expr(c, in_annotation))
                    .collect(),
            ),
            "annotation" => self
                .annotation(node)
                .map(|a| Expr::Annotation(Box::new(a)))
                .unwrap_or_else(|| Expr::Other(text.to_string())),
            "call_expression" => match self.callee(node) {
                Some((None, name)) if in_annotation && starts_uppercase(&name) => {
                    Expr::Annotation(Box::new(Annotation {
                        name,
                        arguments: first_child_of_kind(node, "call_suffix")
                            .and_then(|s| first_child_of_kind(s, "value_arguments"))
                            .map(|args| self.value_arguments(args))
                            .unwrap_or_default(),
                        location: node_location(node, self.path),
                    }))
                }
                Some((receiver, name)) if starts_uppercase(&name) => match receiver {
                    Some(r) if starts_uppercase(r.rsplit('.').next().unwrap_or(&r)) => {
                        Expr::Call {
                            receiver: Some(r),
                            name,
                        }
                    }
                    _ => Expr::New(name),
                },
                Some((receiver, name)) => Expr::Call { receiver, name },
                None => Expr::Other(text.to_string()),
            },
            "object_literal" => Expr::New("object".to_string()),
            "parenthesized_expression" => node
                .named_child(0)
                .map(|inner| self.expr(inner, in_annotation))
                .unwrap_or_else(|| Expr::Other(text.to_string())),
            "as_expression" => node
                .named_child(0)
                .map(|inner| self.expr(inner, in_annotation))
                .unwrap_or_else(|| Expr::Other(text.to_string())),
            "prefix_expression" => {
                let operator = children(node)
                    .into_iter()
                    .find(|c| !c.is_named())
                    .map(|c| self.text(c));
                let operand = node.named_child(node.named_child_count().saturating_sub(1));
                match (operator, operand.map(|o| self.expr(o, in_annotation))) {
                    (Some("-"), Some(Expr::Int(v))) => Expr::Int(-v),
                    (Some("+"), Some(Expr::Int(v))) => Expr::Int(v),
                    _ => Expr::Other(text.to_string()),
                }
            }
            "additive_expression" => {
                let is_plus = children(node).iter().any(|c| c.kind() == "+");
                let operands = named_children(node);
                if is_plus && operands.len() == 2 {
                    let mut parts = Vec::new();
                    for operand in operands {
                        match self.expr(operand, in_annotation) {
                            Expr::Concat(inner) => parts.extend(inner),
                            other => parts.push(other),
                        }
                    }
                    Expr::Concat(parts)
                } else {
                    Expr::Other(text.to_string())
                }
            }
            _ if text == "null" => Expr::Null,
            _ => Expr::Other(text.to_string()),
        }
    }

    /// Plain strings become `Str`; templates keep their literal head so that
    /// prefix checks still work.
    fn string_literal(&self, node: Node<'_>) -> Expr {
        let text = self.text(node);
        if !text.contains('$') {
            return Expr::Str(unquote(text));
        }
        let body = unquote(text);
        match body.split_once('$') {
            Some((head, _)) if !head.is_empty() => Expr::Concat(vec![
                Expr::Str(head.to_string()),
                Expr::Other(text.to_string()),
            ]),
            _ => Expr::Other(text.to_string()),
        }
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "user_type" | "nullable_type" | "function_type" | "parenthesized_type" | "not_nullable_type"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(source: &str) -> ParseResult {
        KotlinParser::new()
            .parse(&PathBuf::from("Test.kt"), source)
            .expect("parse failed")
    }

    fn find<'r>(result: &'r ParseResult, name: &str) -> &'r Declaration {
        result
            .declarations
            .iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("declaration {} not found", name))
    }

    #[test]
    fn test_package_and_imports() {
        let result = parse(
            r#"
package com.android.adservices.data

import android.os.SystemProperties
import android.provider.*
import android.provider.DeviceConfig as Config

class A
"#,
        );
        assert_eq!(result.file.package.as_deref(), Some("com.android.adservices.data"));
        assert_eq!(result.file.imports.len(), 3);
        assert_eq!(result.file.imports[0].path, "android.os.SystemProperties");
        assert!(result.file.imports[1].wildcard);
        assert_eq!(result.file.imports[2].alias.as_deref(), Some("Config"));
    }

    #[test]
    fn test_room_database_class() {
        let result = parse(
            r#"
@Database(
    entities = [Signal::class],
    version = SignalsDatabase.DATABASE_VERSION,
    autoMigrations = [AutoMigration(from = 1, to = 2)]
)
abstract class SignalsDatabase : RoomDatabase() {
    companion object {
        const val DATABASE_VERSION = 2
    }
}
"#,
        );

        let class = find(&result, "SignalsDatabase");
        assert_eq!(class.kind, DeclarationKind::Class);
        assert_eq!(class.super_types, vec!["RoomDatabase".to_string()]);
        assert!(class.has_modifier("abstract"));

        let database = class.annotation("Database").expect("annotation");
        assert_eq!(
            database.argument("version").map(|a| a.value.clone()),
            Some(Expr::Reference("SignalsDatabase.DATABASE_VERSION".to_string()))
        );
        match &database.argument("autoMigrations").expect("migrations").value {
            Expr::Array(items) => match &items[0] {
                Expr::Annotation(migration) => {
                    assert!(migration.is("AutoMigration"));
                    assert_eq!(
                        migration.argument("from").map(|a| a.value.clone()),
                        Some(Expr::Int(1))
                    );
                    assert_eq!(
                        migration.argument("to").map(|a| a.value.clone()),
                        Some(Expr::Int(2))
                    );
                }
                other => panic!("unexpected migration {:?}", other),
            },
            other => panic!("unexpected autoMigrations {:?}", other),
        }

        let companion = find(&result, "Companion");
        assert_eq!(companion.kind, DeclarationKind::CompanionObject);
        assert_eq!(companion.parent.as_ref(), Some(&class.id));

        let version = find(&result, "DATABASE_VERSION");
        assert!(version.is_constant());
        assert_eq!(version.initializer, Some(Expr::Int(2)));
        assert_eq!(version.parent.as_ref(), Some(&companion.id));
    }

    #[test]
    fn test_calls_and_constructors() {
        let result = parse(
            r#"
class Store(private val context: Context) {
    private val file = File(context.filesDir, "topics.xml")

    fun read(): String {
        return SystemProperties.get("debug.adservices", "")
    }
}
"#,
        );

        let file_call = result
            .calls
            .iter()
            .find(|c| c.name == "File")
            .expect("File constructor");
        assert_eq!(file_call.kind, CallKind::Constructor);
        assert_eq!(file_call.arguments.len(), 2);
        assert_eq!(file_call.arguments[1], Expr::Str("topics.xml".to_string()));

        let get = result
            .calls
            .iter()
            .find(|c| c.name == "get")
            .expect("SystemProperties.get");
        assert_eq!(get.kind, CallKind::Method);
        assert_eq!(get.receiver.as_deref(), Some("SystemProperties"));

        let file_field = find(&result, "file");
        assert_eq!(file_field.initializer, Some(Expr::New("File".to_string())));

        let context = find(&result, "context");
        assert_eq!(context.kind, DeclarationKind::Field);
        assert_eq!(context.type_name.as_deref(), Some("Context"));
    }

    #[test]
    fn test_lazy_delegate_has_no_initializer() {
        let result = parse(
            r#"
class TopicsJob : JobService() {
    private val worker by lazy { TopicsWorker() }
    private val retries = 3
}
"#,
        );
        let service = find(&result, "TopicsJob");
        assert_eq!(service.super_types, vec!["JobService".to_string()]);
        assert_eq!(find(&result, "worker").initializer, None);
        assert_eq!(find(&result, "retries").initializer, Some(Expr::Int(3)));
    }

    #[test]
    fn test_string_template_keeps_head() {
        let result = parse(
            r#"
val NAME = "adservices_${suffix}.db"
"#,
        );
        match &find(&result, "NAME").initializer {
            Some(Expr::Concat(parts)) => {
                assert_eq!(parts[0], Expr::Str("adservices_".to_string()))
            }
            other => panic!("unexpected initializer {:?}", other),
        }
    }
}
