//! Schema model - flat, name-indexed collections built from DDL statements
//!
//! Tables, indexes, policies, and functions all live in flat collections
//! keyed or tagged by name; relationships are resolved by lookup at
//! rule-evaluation time, so no entity ever owns another by reference.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Span;

/// Qualified name (schema.table or just table)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Parse from a dotted name like "schema.table" or just "table"
    pub fn parse(s: &str) -> Self {
        if let Some((schema, name)) = s.split_once('.') {
            Self::with_schema(schema, name)
        } else {
            Self::new(s)
        }
    }

    /// Flat lookup key: lowercased, schema defaulting to `public`.
    pub fn key(&self) -> String {
        let schema = self.schema.as_deref().unwrap_or("public");
        format!(
            "{}.{}",
            schema.to_ascii_lowercase(),
            self.name.to_ascii_lowercase()
        )
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.{}", schema, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// The in-memory schema built from one validation run's statements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaModel {
    /// Table key (`schema.name`) -> Table
    pub tables: IndexMap<String, Table>,
    pub indexes: Vec<Index>,
    pub policies: Vec<Policy>,
    pub functions: IndexMap<String, FunctionDef>,
    /// Unrecognized statements, stored verbatim and never inspected.
    pub ignored: Vec<IgnoredStatement>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &QualifiedName) -> Option<&Table> {
        self.tables.get(&name.key())
    }

    pub fn table_exists(&self, name: &QualifiedName) -> bool {
        self.tables.contains_key(&name.key())
    }

    /// All indexes declared on the table with the given key
    pub fn indexes_on<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Index> + 'a {
        self.indexes.iter().filter(move |ix| ix.table.key() == key)
    }

    /// All policies declared on the table with the given key
    pub fn policies_on<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Policy> + 'a {
        self.policies.iter().filter(move |p| p.table.key() == key)
    }
}

/// Table definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: QualifiedName,
    pub span: Span,
    /// False for placeholders created by an out-of-order ALTER TABLE or
    /// CREATE POLICY; a later CREATE TABLE merges into the placeholder.
    pub declared: bool,
    pub rls_enabled: bool,
    pub columns: IndexMap<String, Column>,
    pub constraints: Vec<Constraint>,
}

impl Table {
    pub fn new(name: QualifiedName, span: Span) -> Self {
        Self {
            name,
            span,
            declared: true,
            rls_enabled: false,
            columns: IndexMap::new(),
            constraints: Vec::new(),
        }
    }

    pub fn placeholder(name: QualifiedName, span: Span) -> Self {
        Self {
            declared: false,
            ..Self::new(name, span)
        }
    }

    /// Get a column by name (case-insensitive, as PostgreSQL folds
    /// unquoted identifiers)
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.kind == ConstraintKind::PrimaryKey)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.kind == ConstraintKind::ForeignKey)
    }
}

/// Column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Declared type, kept as opaque source text.
    pub data_type: String,
    pub nullable: bool,
    /// Default expression, kept as opaque source text.
    pub default: Option<String>,
    pub span: Span,
}

/// Constraint kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Unique,
    Check,
    NotNull,
}

impl ConstraintKind {
    /// Naming-convention prefix for explicitly named constraints of this
    /// kind; None where no convention applies.
    pub fn name_prefix(&self) -> Option<&'static str> {
        match self {
            ConstraintKind::PrimaryKey => Some("pk_"),
            ConstraintKind::ForeignKey => Some("fk_"),
            ConstraintKind::Unique => Some("uq_"),
            ConstraintKind::Check => Some("ck_"),
            ConstraintKind::NotNull => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::ForeignKey => "FOREIGN KEY",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::Check => "CHECK",
            ConstraintKind::NotNull => "NOT NULL",
        }
    }
}

/// Foreign-key target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignRef {
    pub table: QualifiedName,
    pub columns: Vec<String>,
}

/// Table constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// Explicit name; absence is itself a finding.
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub references: Option<ForeignRef>,
    /// CHECK expression, kept as opaque source text.
    pub expression: Option<String>,
    pub span: Span,
}

impl Constraint {
    pub fn primary_key(name: Option<String>, columns: Vec<String>, span: Span) -> Self {
        Self {
            kind: ConstraintKind::PrimaryKey,
            name,
            columns,
            references: None,
            expression: None,
            span,
        }
    }

    pub fn foreign_key(
        name: Option<String>,
        columns: Vec<String>,
        references: Option<ForeignRef>,
        span: Span,
    ) -> Self {
        Self {
            kind: ConstraintKind::ForeignKey,
            name,
            columns,
            references,
            expression: None,
            span,
        }
    }

    pub fn unique(name: Option<String>, columns: Vec<String>, span: Span) -> Self {
        Self {
            kind: ConstraintKind::Unique,
            name,
            columns,
            references: None,
            expression: None,
            span,
        }
    }

    pub fn check(name: Option<String>, expression: String, span: Span) -> Self {
        Self {
            kind: ConstraintKind::Check,
            name,
            columns: Vec::new(),
            references: None,
            expression: Some(expression),
            span,
        }
    }
}

/// Index definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    /// PostgreSQL allows anonymous `CREATE INDEX ON ...`.
    pub name: Option<String>,
    pub table: QualifiedName,
    /// Ordered indexed columns; expression entries keep their source text.
    pub columns: Vec<String>,
    pub unique: bool,
    /// Index method (btree/gin/hnsw/...), kept as opaque text.
    pub method: String,
    pub span: Span,
}

impl Index {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

/// Policy command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyCommand {
    Select,
    Insert,
    Update,
    Delete,
    All,
}

impl PolicyCommand {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "select" => Some(PolicyCommand::Select),
            "insert" => Some(PolicyCommand::Insert),
            "update" => Some(PolicyCommand::Update),
            "delete" => Some(PolicyCommand::Delete),
            "all" => Some(PolicyCommand::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyCommand::Select => "SELECT",
            PolicyCommand::Insert => "INSERT",
            PolicyCommand::Update => "UPDATE",
            PolicyCommand::Delete => "DELETE",
            PolicyCommand::All => "ALL",
        }
    }
}

/// Row-level-security policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub table: QualifiedName,
    pub command: PolicyCommand,
    /// Target roles from the TO clause; empty when the clause is absent.
    pub roles: Vec<String>,
    /// USING expression, kept as opaque source text.
    pub using_expr: Option<String>,
    /// WITH CHECK expression, kept as opaque source text.
    pub check_expr: Option<String>,
    pub span: Span,
}

/// Function definition; bodies are opaque dollar-quoted blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: QualifiedName,
    pub language: Option<String>,
    pub span: Span,
}

/// A statement the builder did not recognize, stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoredStatement {
    pub sql: String,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_parse() {
        let name = QualifiedName::parse("users");
        assert_eq!(name.schema, None);
        assert_eq!(name.name, "users");

        let name = QualifiedName::parse("public.users");
        assert_eq!(name.schema, Some("public".to_string()));
        assert_eq!(name.name, "users");
    }

    #[test]
    fn test_key_defaults_schema_and_folds_case() {
        assert_eq!(QualifiedName::new("Users").key(), "public.users");
        assert_eq!(
            QualifiedName::with_schema("Auth", "users").key(),
            "auth.users"
        );
        assert_eq!(
            QualifiedName::new("users").key(),
            QualifiedName::with_schema("public", "USERS").key()
        );
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let mut table = Table::new(QualifiedName::new("users"), Span::new(0, 0, 1, 1));
        table.columns.insert(
            "id".to_string(),
            Column {
                name: "id".to_string(),
                data_type: "uuid".to_string(),
                nullable: false,
                default: None,
                span: Span::new(0, 0, 1, 1),
            },
        );
        assert!(table.has_column("ID"));
        assert!(!table.has_column("missing"));
    }
}
