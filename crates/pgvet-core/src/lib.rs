//! pgvet-core: PostgreSQL DDL schema validation library
//!
//! This library provides the core functionality for validating PostgreSQL/
//! Supabase DDL against naming, constraint, index, and row-level-security
//! rules without requiring a database connection.

pub mod error;
pub mod lexer;
pub mod report;
pub mod rules;
pub mod schema;
pub mod validator;

pub use error::{Category, EngineError, Finding, FindingKind, Severity, Span};
pub use lexer::{Statement, StatementKind};
pub use report::{Report, Summary};
pub use rules::RuleEngine;
pub use schema::{ModelBuilder, QualifiedName, SchemaModel, Table};
pub use validator::{validate_bytes, validate_source, validate_sources, SourceFile};
