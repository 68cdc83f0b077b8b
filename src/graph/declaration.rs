use std::path::PathBuf;

/// Unique identifier for a declaration (file + byte range)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationId {
    pub file: PathBuf,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl DeclarationId {
    pub fn new(file: PathBuf, start_byte: usize, end_byte: usize) -> Self {
        Self {
            file,
            start_byte,
            end_byte,
        }
    }
}

/// Source location of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: PathBuf,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Location {
    pub fn new(
        file: PathBuf,
        line: usize,
        column: usize,
        start_byte: usize,
        end_byte: usize,
    ) -> Self {
        Self {
            file,
            line,
            column,
            start_byte,
            end_byte,
        }
    }

    /// Whether `other` lies inside this location's byte range
    pub fn contains(&self, other: &Location) -> bool {
        self.file == other.file
            && self.start_byte <= other.start_byte
            && other.end_byte <= self.end_byte
    }

    pub fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source language of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Kotlin,
    Java,
    Xml,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Kotlin => "kotlin",
            Language::Java => "java",
            Language::Xml => "xml",
        }
    }
}

/// Kinds of declarations tracked in the project model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class,
    Interface,
    Enum,
    Object,
    CompanionObject,
    Method,
    Field,
}

impl DeclarationKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Object => "object",
            DeclarationKind::CompanionObject => "companion object",
            DeclarationKind::Method => "method",
            DeclarationKind::Field => "field",
        }
    }

    /// Declarations that introduce a type
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Class
                | DeclarationKind::Interface
                | DeclarationKind::Enum
                | DeclarationKind::Object
                | DeclarationKind::CompanionObject
        )
    }
}

/// A parsed annotation usage such as `@Database(version = 2)`
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Name as written (may be qualified)
    pub name: String,
    pub arguments: Vec<AnnotationArgument>,
    pub location: Location,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Compare by simple name, so `androidx.room.Database` matches `Database`
    pub fn is(&self, name: &str) -> bool {
        self.simple_name() == simple_type_name(name)
    }

    /// Look up a named argument. A single positional argument answers to `value`.
    pub fn argument(&self, name: &str) -> Option<&AnnotationArgument> {
        self.arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .or_else(|| {
                if name == "value" {
                    self.arguments.iter().find(|a| a.name.is_none())
                } else {
                    None
                }
            })
    }

    /// Look up an argument by name, falling back to the `position`-th
    /// positional argument (`AutoMigration(1, 2)` in Kotlin)
    pub fn argument_at(&self, name: &str, position: usize) -> Option<&AnnotationArgument> {
        self.arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .or_else(|| {
                self.arguments
                    .iter()
                    .filter(|a| a.name.is_none())
                    .nth(position)
            })
    }

    /// All string literals among the arguments, with arrays flattened
    pub fn string_values(&self) -> Vec<&str> {
        let mut values = Vec::new();
        for arg in &self.arguments {
            arg.value.collect_strings(&mut values);
        }
        values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationArgument {
    /// `None` for positional arguments
    pub name: Option<String>,
    pub value: Expr,
    pub location: Location,
}

/// Simplified expression tree, enough to evaluate constants and classify
/// initializers and call arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Str(String),
    Bool(bool),
    Null,
    /// Any other literal (char, float) kept as source text
    Literal(String),
    /// Identifier or dotted path, e.g. `DATABASE_VERSION` or `Foo.BAR`
    Reference(String),
    /// `Foo.class` / `Foo::class`
    ClassLiteral(String),
    Array(Vec<Expr>),
    Annotation(Box<Annotation>),
    Call {
        receiver: Option<String>,
        name: String,
    },
    /// Object creation; holds the simple type name
    New(String),
    Lambda,
    /// String concatenation operands in source order
    Concat(Vec<Expr>),
    Other(String),
}

impl Expr {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Expr::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Expr::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str(s) => Some(s),
            _ => None,
        }
    }

    /// True when evaluating this expression cannot run code or load classes.
    ///
    /// Unknown shapes (`Other`) count as safe: without proof of a call we do
    /// not report.
    pub fn is_inert(&self) -> bool {
        match self {
            Expr::Int(_)
            | Expr::Str(_)
            | Expr::Bool(_)
            | Expr::Null
            | Expr::Literal(_)
            | Expr::Reference(_)
            | Expr::ClassLiteral(_)
            | Expr::Other(_) => true,
            Expr::Array(items) | Expr::Concat(items) => items.iter().all(Expr::is_inert),
            Expr::Annotation(_) | Expr::Call { .. } | Expr::New(_) | Expr::Lambda => false,
        }
    }

    /// Short human-readable description used in messages
    pub fn describe(&self) -> String {
        match self {
            Expr::Call {
                receiver: Some(r),
                name,
            } => format!("call to {}.{}()", r, name),
            Expr::Call {
                receiver: None,
                name,
            } => format!("call to {}()", name),
            Expr::New(ty) => format!("construction of {}", ty),
            Expr::Lambda => "lambda".to_string(),
            Expr::Annotation(a) => format!("@{}", a.name),
            Expr::Array(_) => "array".to_string(),
            Expr::Concat(_) => "string concatenation".to_string(),
            Expr::Int(v) => v.to_string(),
            Expr::Str(s) => format!("\"{}\"", s),
            Expr::Bool(b) => b.to_string(),
            Expr::Null => "null".to_string(),
            Expr::Literal(s) | Expr::Reference(s) | Expr::Other(s) => s.clone(),
            Expr::ClassLiteral(s) => format!("{}.class", s),
        }
    }

    fn collect_strings<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Str(s) => out.push(s),
            Expr::Array(items) => {
                for item in items {
                    item.collect_strings(out);
                }
            }
            _ => {}
        }
    }
}

/// A declaration in the project model
#[derive(Debug, Clone)]
pub struct Declaration {
    pub id: DeclarationId,
    pub name: String,
    pub kind: DeclarationKind,
    pub location: Location,
    pub language: Language,
    /// Enclosing declaration
    pub parent: Option<DeclarationId>,
    pub annotations: Vec<Annotation>,
    /// Keyword modifiers (`public`, `static`, `const`, `abstract`, ...)
    pub modifiers: Vec<String>,
    /// Supertypes as written in source
    pub super_types: Vec<String>,
    /// Declared type of a field, or return type of a method
    pub type_name: Option<String>,
    /// Field initializer
    pub initializer: Option<Expr>,
}

impl Declaration {
    pub fn new(
        id: DeclarationId,
        name: String,
        kind: DeclarationKind,
        location: Location,
        language: Language,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            location,
            language,
            parent: None,
            annotations: Vec::new(),
            modifiers: Vec::new(),
            super_types: Vec::new(),
            type_name: None,
            initializer: None,
        }
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is(name))
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    /// `static final` in Java or `const` in Kotlin
    pub fn is_constant(&self) -> bool {
        match self.language {
            Language::Java => self.has_modifier("static") && self.has_modifier("final"),
            Language::Kotlin => self.has_modifier("const"),
            Language::Xml => false,
        }
    }
}

/// A method call or constructor invocation
#[derive(Debug, Clone)]
pub struct CallSite {
    /// Receiver expression as written, e.g. `SystemProperties` or `context`
    pub receiver: Option<String>,
    /// Method name, or simple type name for constructors
    pub name: String,
    pub arguments: Vec<Expr>,
    pub kind: CallKind,
    pub location: Location,
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Method,
    Constructor,
}

/// An import directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    pub wildcard: bool,
    pub alias: Option<String>,
}

impl Import {
    /// Name the import binds in the file, if any
    pub fn bound_name(&self) -> Option<&str> {
        if self.wildcard {
            return None;
        }
        self.alias
            .as_deref()
            .or_else(|| self.path.rsplit('.').next())
    }
}

/// Per-file symbol context
#[derive(Debug, Clone)]
pub struct FileContext {
    pub path: PathBuf,
    pub language: Language,
    pub package: Option<String>,
    pub imports: Vec<Import>,
}

impl FileContext {
    pub fn new(path: PathBuf, language: Language) -> Self {
        Self {
            path,
            language,
            package: None,
            imports: Vec::new(),
        }
    }
}

/// An application component declared in `AndroidManifest.xml`
#[derive(Debug, Clone)]
pub struct ManifestComponent {
    /// Element tag, e.g. `service`
    pub tag: String,
    /// Fully qualified component class name (relative names are expanded)
    pub name: Option<String>,
    pub process: Option<String>,
    /// Rule ids listed in `tools:ignore`
    pub ignored: Vec<String>,
    pub location: Location,
}

/// Reduce a type as written to its simple name:
/// `androidx.room.RoomDatabase` -> `RoomDatabase`, `List<Foo>?` -> `List`
pub fn simple_type_name(written: &str) -> &str {
    let base = written.split('<').next().unwrap_or(written);
    let base = base.trim().trim_end_matches('?').trim_end_matches("[]").trim();
    base.rsplit('.').next().unwrap_or(base).trim()
}
