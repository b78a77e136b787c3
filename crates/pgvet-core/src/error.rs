//! Finding and severity types

use miette::SourceSpan;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset from start of source
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Span {
    pub fn new(offset: usize, length: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            length,
            line,
            column,
        }
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.offset.into(), span.length)
    }
}

/// Finding severity level
///
/// Ordered so that sorting puts errors before warnings before info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Rule category a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Syntax,
    Naming,
    Constraints,
    Indexes,
    Rls,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Syntax,
        Category::Naming,
        Category::Constraints,
        Category::Indexes,
        Category::Rls,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Syntax => "syntax",
            Category::Naming => "naming",
            Category::Constraints => "constraints",
            Category::Indexes => "indexes",
            Category::Rls => "rls",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single validation result
///
/// Findings are pure values; they carry no behavior and are only ever
/// collected, sorted, and counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    /// Stamped by the report builder once the owning file is known.
    pub file: String,
    pub span: Option<Span>,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            category: kind.category(),
            message: message.into(),
            file: String::new(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Get the rule code string (e.g., "RL001")
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn line(&self) -> usize {
        self.span.map_or(0, |s| s.line)
    }
}

/// Types of findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    /// SY001: unterminated string or dollar-quoted literal
    UnterminatedLiteral,
    /// SY002: reserved keyword used as an identifier
    ReservedIdentifier,
    /// SY003: duplicate CREATE TABLE for the same name
    DuplicateTable,
    /// NM001: table name not lowercase snake_case
    TableNameCase,
    /// NM002: table name does not look plural
    TableNameNotPlural,
    /// NM003: column name not snake_case
    ColumnNameCase,
    /// NM004: constraint name missing its kind prefix
    ConstraintNamePrefix,
    /// NM005: constraint has no explicit name
    ConstraintUnnamed,
    /// NM006: index name missing idx_/uidx_ prefix
    IndexNamePrefix,
    /// NM007: index has no explicit name
    IndexUnnamed,
    /// CN001: table has no primary key
    MissingPrimaryKey,
    /// CN002: table has more than one primary key constraint
    MultiplePrimaryKeys,
    /// CN003: foreign key references a table never seen
    ForeignKeyTargetUnknown,
    /// CN004: CHECK constraint with empty expression
    EmptyCheckExpression,
    /// IX001: foreign-key column has no covering index
    ForeignKeyUnindexed,
    /// IX002: policy-referenced column has no covering index
    PolicyColumnUnindexed,
    /// IX003: two indexes with identical column lists
    RedundantIndex,
    /// IX004: CREATE INDEX targets a table never seen
    IndexTargetUnknown,
    /// RL001: RLS enabled but no policies defined
    RlsNoPolicies,
    /// RL002: policies defined but RLS not enabled
    PoliciesWithoutRls,
    /// RL003: policy has no target role
    PolicyNoRoles,
    /// RL004: INSERT/UPDATE policy without WITH CHECK
    PolicyMissingWithCheck,
}

impl FindingKind {
    pub fn code(&self) -> &'static str {
        match self {
            FindingKind::UnterminatedLiteral => "SY001",
            FindingKind::ReservedIdentifier => "SY002",
            FindingKind::DuplicateTable => "SY003",
            FindingKind::TableNameCase => "NM001",
            FindingKind::TableNameNotPlural => "NM002",
            FindingKind::ColumnNameCase => "NM003",
            FindingKind::ConstraintNamePrefix => "NM004",
            FindingKind::ConstraintUnnamed => "NM005",
            FindingKind::IndexNamePrefix => "NM006",
            FindingKind::IndexUnnamed => "NM007",
            FindingKind::MissingPrimaryKey => "CN001",
            FindingKind::MultiplePrimaryKeys => "CN002",
            FindingKind::ForeignKeyTargetUnknown => "CN003",
            FindingKind::EmptyCheckExpression => "CN004",
            FindingKind::ForeignKeyUnindexed => "IX001",
            FindingKind::PolicyColumnUnindexed => "IX002",
            FindingKind::RedundantIndex => "IX003",
            FindingKind::IndexTargetUnknown => "IX004",
            FindingKind::RlsNoPolicies => "RL001",
            FindingKind::PoliciesWithoutRls => "RL002",
            FindingKind::PolicyNoRoles => "RL003",
            FindingKind::PolicyMissingWithCheck => "RL004",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FindingKind::UnterminatedLiteral => "unterminated-literal",
            FindingKind::ReservedIdentifier => "reserved-identifier",
            FindingKind::DuplicateTable => "duplicate-table",
            FindingKind::TableNameCase => "table-name-case",
            FindingKind::TableNameNotPlural => "table-name-not-plural",
            FindingKind::ColumnNameCase => "column-name-case",
            FindingKind::ConstraintNamePrefix => "constraint-name-prefix",
            FindingKind::ConstraintUnnamed => "constraint-unnamed",
            FindingKind::IndexNamePrefix => "index-name-prefix",
            FindingKind::IndexUnnamed => "index-unnamed",
            FindingKind::MissingPrimaryKey => "missing-primary-key",
            FindingKind::MultiplePrimaryKeys => "multiple-primary-keys",
            FindingKind::ForeignKeyTargetUnknown => "foreign-key-target-unknown",
            FindingKind::EmptyCheckExpression => "empty-check-expression",
            FindingKind::ForeignKeyUnindexed => "foreign-key-unindexed",
            FindingKind::PolicyColumnUnindexed => "policy-column-unindexed",
            FindingKind::RedundantIndex => "redundant-index",
            FindingKind::IndexTargetUnknown => "index-target-unknown",
            FindingKind::RlsNoPolicies => "rls-no-policies",
            FindingKind::PoliciesWithoutRls => "policies-without-rls",
            FindingKind::PolicyNoRoles => "policy-no-roles",
            FindingKind::PolicyMissingWithCheck => "policy-missing-with-check",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            FindingKind::UnterminatedLiteral
            | FindingKind::ReservedIdentifier
            | FindingKind::DuplicateTable => Category::Syntax,
            FindingKind::TableNameCase
            | FindingKind::TableNameNotPlural
            | FindingKind::ColumnNameCase
            | FindingKind::ConstraintNamePrefix
            | FindingKind::ConstraintUnnamed
            | FindingKind::IndexNamePrefix
            | FindingKind::IndexUnnamed => Category::Naming,
            FindingKind::MissingPrimaryKey
            | FindingKind::MultiplePrimaryKeys
            | FindingKind::ForeignKeyTargetUnknown
            | FindingKind::EmptyCheckExpression => Category::Constraints,
            FindingKind::ForeignKeyUnindexed
            | FindingKind::PolicyColumnUnindexed
            | FindingKind::RedundantIndex
            | FindingKind::IndexTargetUnknown => Category::Indexes,
            FindingKind::RlsNoPolicies
            | FindingKind::PoliciesWithoutRls
            | FindingKind::PolicyNoRoles
            | FindingKind::PolicyMissingWithCheck => Category::Rls,
        }
    }

    /// Each rule code carries a fixed severity.
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::UnterminatedLiteral
            | FindingKind::DuplicateTable
            | FindingKind::MissingPrimaryKey
            | FindingKind::EmptyCheckExpression
            | FindingKind::RlsNoPolicies => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// Engine-internal faults, kept strictly distinct from findings: a fault
/// aborts the run for one input, a finding is ordinary report data.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{file}: input is not valid UTF-8 (invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { file: String, valid_up_to: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_metadata_is_consistent() {
        let kinds = [
            FindingKind::UnterminatedLiteral,
            FindingKind::MissingPrimaryKey,
            FindingKind::RlsNoPolicies,
            FindingKind::PolicyMissingWithCheck,
        ];
        for kind in kinds {
            let finding = Finding::new(kind, "x");
            assert_eq!(finding.severity, kind.severity());
            assert_eq!(finding.category, kind.category());
            assert_eq!(finding.code(), kind.code());
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
    }
}
