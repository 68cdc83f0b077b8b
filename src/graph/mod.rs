//! Project model: declarations, call sites, imports and manifest components
//! collected from every parsed file, plus a type hierarchy for transitive
//! subtype checks.

mod builder;
mod declaration;

pub use builder::{GraphBuilder, ParallelGraphBuilder};
pub use declaration::{
    simple_type_name, Annotation, AnnotationArgument, CallKind, CallSite, Declaration,
    DeclarationId, DeclarationKind, Expr, FileContext, Import, Language, Location,
    ManifestComponent,
};

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Guards constant evaluation against reference cycles (`A = B`, `B = A`)
const MAX_CONSTANT_DEPTH: usize = 8;

/// How a symbol reference was matched to a qualified name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Fully qualified in source, or bound by an explicit import
    Exact,
    /// Matched through a wildcard import or the file's own package
    Inferred,
}

/// The analyzed project
#[derive(Debug, Default)]
pub struct Graph {
    declarations: HashMap<DeclarationId, Declaration>,
    /// Insertion order, for deterministic iteration
    order: Vec<DeclarationId>,
    children: HashMap<DeclarationId, Vec<DeclarationId>>,
    by_file: HashMap<PathBuf, Vec<DeclarationId>>,
    types_by_name: HashMap<String, Vec<DeclarationId>>,
    calls: Vec<CallSite>,
    files: HashMap<PathBuf, FileContext>,
    manifest_components: Vec<ManifestComponent>,
    /// Edges point from a type name to each of its supertype names
    hierarchy: DiGraph<String, ()>,
    hierarchy_nodes: HashMap<String, NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_declaration(&mut self, decl: Declaration) {
        let id = decl.id.clone();

        if let Some(parent) = &decl.parent {
            self.children
                .entry(parent.clone())
                .or_default()
                .push(id.clone());
        }
        self.by_file
            .entry(decl.location.file.clone())
            .or_default()
            .push(id.clone());

        if decl.kind.is_type() {
            self.types_by_name
                .entry(decl.name.clone())
                .or_default()
                .push(id.clone());

            let from = self.hierarchy_node(&decl.name);
            for super_type in &decl.super_types {
                let to = self.hierarchy_node(simple_type_name(super_type));
                if !self.hierarchy.contains_edge(from, to) {
                    self.hierarchy.add_edge(from, to, ());
                }
            }
        }

        if self.declarations.insert(id.clone(), decl).is_none() {
            self.order.push(id);
        }
    }

    fn hierarchy_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.hierarchy_nodes.get(name) {
            return idx;
        }
        let idx = self.hierarchy.add_node(name.to_string());
        self.hierarchy_nodes.insert(name.to_string(), idx);
        idx
    }

    pub fn get_declaration(&self, id: &DeclarationId) -> Option<&Declaration> {
        self.declarations.get(id)
    }

    /// All declarations in insertion order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.order.iter().filter_map(|id| self.declarations.get(id))
    }

    pub fn declaration_count(&self) -> usize {
        self.order.len()
    }

    /// Type declarations (classes, interfaces, objects, enums)
    pub fn types(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations().filter(|d| d.kind.is_type())
    }

    pub fn types_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Declaration> + 'a {
        self.types_by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.declarations.get(id))
    }

    pub fn children(&self, id: &DeclarationId) -> impl Iterator<Item = &Declaration> {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.declarations.get(id))
    }

    /// Fields of a type, including those of its companion objects
    pub fn fields_of<'a>(&'a self, owner: &Declaration) -> Vec<&'a Declaration> {
        let mut fields = Vec::new();
        for child in self.children(&owner.id) {
            match child.kind {
                DeclarationKind::Field => fields.push(child),
                DeclarationKind::CompanionObject => fields.extend(
                    self.children(&child.id)
                        .filter(|d| d.kind == DeclarationKind::Field),
                ),
                _ => {}
            }
        }
        fields
    }

    pub fn add_call(&mut self, call: CallSite) {
        self.calls.push(call);
    }

    pub fn calls(&self) -> &[CallSite] {
        &self.calls
    }

    pub fn add_file(&mut self, file: FileContext) {
        self.files.insert(file.path.clone(), file);
    }

    pub fn file(&self, path: &Path) -> Option<&FileContext> {
        self.files.get(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn add_manifest_component(&mut self, component: ManifestComponent) {
        self.manifest_components.push(component);
    }

    pub fn manifest_components(&self) -> &[ManifestComponent] {
        &self.manifest_components
    }

    /// Whether `decl` extends or implements `base` directly or through
    /// other project types. Types compare by simple name.
    pub fn is_subtype_of(&self, decl: &Declaration, base: &str) -> bool {
        let base = simple_type_name(base);
        let target = self.hierarchy_nodes.get(base);

        decl.super_types.iter().any(|super_type| {
            let super_name = simple_type_name(super_type);
            if super_name == base {
                return true;
            }
            match (self.hierarchy_nodes.get(super_name), target) {
                (Some(&from), Some(&to)) => has_path_connecting(&self.hierarchy, from, to, None),
                _ => false,
            }
        })
    }

    /// Declarations whose range contains `location`, outermost first
    pub fn enclosing_declarations(&self, location: &Location) -> Vec<&Declaration> {
        let mut found: Vec<&Declaration> = self
            .by_file
            .get(&location.file)
            .into_iter()
            .flatten()
            .filter_map(|id| self.declarations.get(id))
            .filter(|d| d.location.contains(location))
            .collect();
        found.sort_by_key(|d| std::cmp::Reverse(d.location.len()));
        found
    }

    /// Innermost type declaration containing `location`
    pub fn enclosing_type(&self, location: &Location) -> Option<&Declaration> {
        self.enclosing_declarations(location)
            .into_iter()
            .rev()
            .find(|d| d.kind.is_type())
    }

    /// Check whether a type reference written in `file` denotes `qualified_name`.
    ///
    /// Returns `None` when the reference cannot be shown to resolve there;
    /// callers treat that as "not a match".
    pub fn resolve_type_reference(
        &self,
        file: &Path,
        reference: &str,
        qualified_name: &str,
    ) -> Option<Resolution> {
        let reference: String = reference.chars().filter(|c| !c.is_whitespace()).collect();
        if reference == qualified_name {
            return Some(Resolution::Exact);
        }

        let (package, simple) = qualified_name.rsplit_once('.')?;
        if reference.contains('.') || reference != simple {
            return None;
        }

        // A type with the same name declared in this file shadows any import
        let shadowed = self
            .types_named(simple)
            .any(|d| d.location.file.as_path() == file);
        if shadowed {
            return None;
        }

        let context = self.file(file)?;
        for import in &context.imports {
            if import.bound_name() == Some(simple) {
                return (import.path == qualified_name).then_some(Resolution::Exact);
            }
        }
        if context
            .imports
            .iter()
            .any(|i| i.wildcard && i.path == package)
        {
            return Some(Resolution::Inferred);
        }
        if context.package.as_deref() == Some(package) {
            return Some(Resolution::Inferred);
        }
        None
    }

    /// Package-qualified name of a declaration, through its enclosing types.
    /// `None` for files without a package clause.
    pub fn qualified_name(&self, decl: &Declaration) -> Option<String> {
        let mut parts = vec![decl.name.as_str()];
        let mut parent = decl.parent.as_ref();
        while let Some(id) = parent {
            let outer = self.get_declaration(id)?;
            parts.push(outer.name.as_str());
            parent = outer.parent.as_ref();
        }
        parts.push(self.file(&decl.location.file)?.package.as_deref()?);
        parts.reverse();
        Some(parts.join("."))
    }

    /// Qualified name a type written in `file` refers to, when the file's own
    /// declarations, imports and package settle it. A wildcard import leaves
    /// a name not declared in the file's package unsettled.
    pub fn qualify_type(&self, file: &Path, written: &str) -> Option<String> {
        let base = written.split('<').next().unwrap_or(written);
        let base: String = base
            .trim()
            .trim_end_matches('?')
            .trim_end_matches("[]")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if base.contains('.') {
            return base.starts_with(char::is_lowercase).then_some(base);
        }

        if let Some(local) = self
            .types_named(&base)
            .find(|d| d.location.file.as_path() == file)
        {
            return self.qualified_name(local);
        }

        let context = self.file(file)?;
        if let Some(import) = context
            .imports
            .iter()
            .find(|i| i.bound_name() == Some(base.as_str()))
        {
            return Some(import.path.clone());
        }

        let package = context.package.as_deref()?;
        let in_package = self.types_named(&base).any(|d| {
            self.file(&d.location.file)
                .and_then(|c| c.package.as_deref())
                == Some(package)
        });
        let wildcard = context.imports.iter().any(|i| i.wildcard);
        (in_package || !wildcard).then(|| format!("{}.{}", package, base))
    }

    /// Check whether an unqualified call to `member` in `file` is a statically
    /// imported member of `qualified_class`.
    pub fn resolve_static_member(
        &self,
        file: &Path,
        member: &str,
        qualified_class: &str,
    ) -> Option<Resolution> {
        let context = self.file(file)?;
        let member_path = format!("{}.{}", qualified_class, member);

        for import in &context.imports {
            if import.bound_name() == Some(member) {
                return (import.path == member_path).then_some(Resolution::Exact);
            }
        }
        context
            .imports
            .iter()
            .any(|i| i.wildcard && i.path == qualified_class)
            .then_some(Resolution::Inferred)
    }

    /// Find the field a reference names, searching outwards from `scope`
    /// (enclosing types and their companions), then top-level fields of the
    /// scope's file. Qualified references (`Owner.FIELD`) look up the owner
    /// type by simple name.
    pub fn find_field(&self, scope: Option<&Declaration>, reference: &str) -> Option<&Declaration> {
        if let Some((qualifier, member)) = reference.rsplit_once('.') {
            let owner = simple_type_name(qualifier);
            return self
                .types_named(owner)
                .find_map(|t| self.member_field(t, member));
        }

        let mut current = scope;
        while let Some(decl) = current {
            if let Some(field) = self.member_field(decl, reference) {
                return Some(field);
            }
            current = decl.parent.as_ref().and_then(|p| self.get_declaration(p));
        }

        let file = &scope?.location.file;
        self.by_file
            .get(file)
            .into_iter()
            .flatten()
            .filter_map(|id| self.declarations.get(id))
            .find(|d| d.kind == DeclarationKind::Field && d.parent.is_none() && d.name == reference)
    }

    fn member_field(&self, owner: &Declaration, name: &str) -> Option<&Declaration> {
        if owner.kind.is_type() {
            self.fields_of(owner).into_iter().find(|f| f.name == name)
        } else {
            None
        }
    }

    /// Evaluate an expression to a literal (`Int`, `Str` or `Bool`) by
    /// following constant references. `None` when it cannot be determined.
    pub fn resolve_constant(&self, scope: Option<&Declaration>, expr: &Expr) -> Option<Expr> {
        self.resolve_constant_at(scope, expr, 0)
    }

    fn resolve_constant_at(
        &self,
        scope: Option<&Declaration>,
        expr: &Expr,
        depth: usize,
    ) -> Option<Expr> {
        if depth > MAX_CONSTANT_DEPTH {
            return None;
        }
        match expr {
            Expr::Int(_) | Expr::Str(_) | Expr::Bool(_) => Some(expr.clone()),
            Expr::Reference(name) => {
                let field = self.find_field(scope, name)?;
                let value = field.initializer.as_ref()?;
                let owner = field.parent.as_ref().and_then(|p| self.get_declaration(p));
                self.resolve_constant_at(owner.or(Some(field)), value, depth + 1)
            }
            Expr::Concat(parts) => {
                let mut joined = String::new();
                for part in parts {
                    match self.resolve_constant_at(scope, part, depth + 1)? {
                        Expr::Str(s) => joined.push_str(&s),
                        Expr::Int(v) => joined.push_str(&v.to_string()),
                        Expr::Bool(b) => joined.push_str(&b.to_string()),
                        _ => return None,
                    }
                }
                Some(Expr::Str(joined))
            }
            _ => None,
        }
    }

    pub fn resolve_int(&self, scope: Option<&Declaration>, expr: &Expr) -> Option<i64> {
        self.resolve_constant(scope, expr)?.as_int()
    }

    /// The known leading text of a string expression. For a concatenation
    /// only the resolvable prefix is returned, which is enough for prefix
    /// checks.
    pub fn resolve_string_prefix(&self, scope: Option<&Declaration>, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Concat(parts) => {
                let mut prefix = String::new();
                for part in parts {
                    match self.resolve_constant(scope, part) {
                        Some(Expr::Str(s)) => prefix.push_str(&s),
                        Some(Expr::Int(v)) => prefix.push_str(&v.to_string()),
                        _ => break,
                    }
                }
                (!prefix.is_empty()).then_some(prefix)
            }
            _ => match self.resolve_constant(scope, expr)? {
                Expr::Str(s) => Some(s),
                _ => None,
            },
        }
    }
}
