//! Syntax rules: reserved-keyword identifiers
//!
//! Unterminated-literal and duplicate-table errors are raised by the
//! splitter and builder themselves and flow into the same report.

use crate::error::{Finding, FindingKind};
use crate::schema::SchemaModel;

/// PostgreSQL reserved key words. Using one as a table or column name is
/// legal when quoted but a reliable source of downstream friction.
const RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both", "case",
    "cast", "check", "collate", "column", "constraint", "create", "current_date", "current_role",
    "current_time", "current_timestamp", "current_user", "default", "deferrable", "desc",
    "distinct", "do", "else", "end", "except", "false", "fetch", "for", "foreign", "from", "grant",
    "group", "having", "in", "initially", "intersect", "into", "leading", "limit", "localtime",
    "localtimestamp", "not", "null", "offset", "on", "only", "or", "order", "placing", "primary",
    "references", "returning", "select", "session_user", "some", "symmetric", "table", "then",
    "to", "trailing", "true", "union", "unique", "user", "using", "variadic", "when", "where",
    "window", "with",
];

fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name.to_ascii_lowercase().as_str())
}

pub(crate) fn check(model: &SchemaModel) -> Vec<Finding> {
    let mut findings = Vec::new();
    for table in model.tables.values().filter(|t| t.declared) {
        if is_reserved(&table.name.name) {
            findings.push(
                Finding::new(
                    FindingKind::ReservedIdentifier,
                    format!(
                        "table name '{}' is a reserved SQL keyword",
                        table.name.name
                    ),
                )
                .with_span(table.span),
            );
        }
        for column in table.columns.values() {
            if is_reserved(&column.name) {
                findings.push(
                    Finding::new(
                        FindingKind::ReservedIdentifier,
                        format!(
                            "column name '{}' on table '{}' is a reserved SQL keyword",
                            column.name, table.name
                        ),
                    )
                    .with_span(column.span),
                );
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved("user"));
        assert!(is_reserved("ORDER"));
        assert!(is_reserved("select"));
        assert!(!is_reserved("users"));
        assert!(!is_reserved("email"));
    }
}
