//! Databases listed as fields of the registration class

use crate::graph::{simple_type_name, Declaration, Graph};
use std::collections::HashMap;

/// Field types declared by the registration class(es) of a project
#[derive(Debug, Default)]
pub struct RegistrationIndex {
    pub classes: Vec<String>,
    /// Simple name -> qualified names it was registered under; `None` when
    /// the field's type did not resolve to a package
    registered: HashMap<String, Vec<Option<String>>>,
}

impl RegistrationIndex {
    /// Gather field types from every class named `class_name`. Fields of
    /// nested types and companions count too.
    pub fn collect(graph: &Graph, class_name: &str) -> Self {
        let mut index = Self::default();
        for class in graph.types().filter(|t| t.name == class_name) {
            index.classes.push(class.name.clone());
            index.add_fields(graph, class);
        }
        index
    }

    fn add_fields(&mut self, graph: &Graph, class: &Declaration) {
        for field in graph.fields_of(class) {
            if let Some(type_name) = &field.type_name {
                self.registered
                    .entry(simple_type_name(type_name).to_string())
                    .or_default()
                    .push(graph.qualify_type(&field.location.file, type_name));
            }
        }
        for nested in graph.children(&class.id).filter(|c| c.kind.is_type()) {
            self.add_fields(graph, nested);
        }
    }

    pub fn is_found(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Whether a database is registered. Names compare qualified when both
    /// sides resolve to a package, and by simple name otherwise.
    pub fn is_registered(&self, database: &str, qualified: Option<&str>) -> bool {
        let Some(entries) = self.registered.get(simple_type_name(database)) else {
            return false;
        };
        match qualified {
            Some(qualified) => entries
                .iter()
                .any(|entry| entry.as_deref().map_or(true, |e| e == qualified)),
            None => true,
        }
    }
}
