//! Index rules: foreign-key and policy-column coverage, redundant indexes
//!
//! Coverage findings are performance heuristics, not correctness, and stay
//! at Warning severity.

use std::collections::HashSet;

use crate::error::{Finding, FindingKind};
use crate::schema::{ConstraintKind, SchemaModel, Table};

/// A column counts as covered when it leads some index on the table, or
/// leads a primary-key or unique constraint (both are backed by an index).
fn covered(model: &SchemaModel, key: &str, table: &Table, column: &str) -> bool {
    model.indexes_on(key).any(|ix| {
        ix.columns
            .first()
            .is_some_and(|leading| leading.eq_ignore_ascii_case(column))
    }) || table.constraints.iter().any(|c| {
        matches!(c.kind, ConstraintKind::PrimaryKey | ConstraintKind::Unique)
            && c.columns
                .first()
                .is_some_and(|leading| leading.eq_ignore_ascii_case(column))
    })
}

/// Identifier-shaped words from an opaque expression text.
fn expr_words(expr: &str) -> impl Iterator<Item = &str> {
    expr.split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty() && !w.starts_with(|c: char| c.is_ascii_digit()))
}

pub(crate) fn check(model: &SchemaModel) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (key, table) in &model.tables {
        for constraint in table.foreign_keys() {
            for column in &constraint.columns {
                if !covered(model, key, table, column) {
                    findings.push(
                        Finding::new(
                            FindingKind::ForeignKeyUnindexed,
                            format!(
                                "foreign key column '{}' on table '{}' has no covering index",
                                column, table.name
                            ),
                        )
                        .with_span(constraint.span),
                    );
                }
            }
        }

        // One finding per (table, column) regardless of how many policies
        // mention it.
        let mut reported: HashSet<String> = HashSet::new();
        for policy in model.policies_on(key) {
            for expr in [&policy.using_expr, &policy.check_expr].into_iter().flatten() {
                for word in expr_words(expr) {
                    if !table.has_column(word) {
                        continue;
                    }
                    let folded = word.to_ascii_lowercase();
                    if reported.contains(&folded) || covered(model, key, table, word) {
                        continue;
                    }
                    reported.insert(folded);
                    findings.push(
                        Finding::new(
                            FindingKind::PolicyColumnUnindexed,
                            format!(
                                "column '{}' on table '{}' is referenced by policy '{}' but has no covering index",
                                word, table.name, policy.name
                            ),
                        )
                        .with_span(policy.span),
                    );
                }
            }
        }
    }

    for (i, index) in model.indexes.iter().enumerate() {
        let duplicate = model.indexes[..i].iter().find(|earlier| {
            earlier.table.key() == index.table.key()
                && earlier.columns.len() == index.columns.len()
                && earlier
                    .columns
                    .iter()
                    .zip(&index.columns)
                    .all(|(a, b)| a.eq_ignore_ascii_case(b))
        });
        if let Some(earlier) = duplicate {
            findings.push(
                Finding::new(
                    FindingKind::RedundantIndex,
                    format!(
                        "index '{}' on table '{}' duplicates index '{}' (identical column list)",
                        index.label(),
                        index.table,
                        earlier.label()
                    ),
                )
                .with_span(index.span),
            );
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_words_extracts_identifiers() {
        let words: Vec<_> = expr_words("owner_id = auth.uid() AND status <> 'x'").collect();
        assert!(words.contains(&"owner_id"));
        assert!(words.contains(&"status"));
        assert!(!words.contains(&"'x'"));
    }
}
