//! Constraint rules: primary-key presence, foreign-key targets, CHECK bodies

use crate::error::{Finding, FindingKind};
use crate::schema::{ConstraintKind, SchemaModel};

pub(crate) fn check(model: &SchemaModel) -> Vec<Finding> {
    let mut findings = Vec::new();

    for table in model.tables.values() {
        if table.declared {
            let pk_count = table.primary_keys().count();
            if pk_count == 0 {
                findings.push(
                    Finding::new(
                        FindingKind::MissingPrimaryKey,
                        format!("table '{}' has no primary key", table.name),
                    )
                    .with_span(table.span),
                );
            } else if pk_count > 1 {
                findings.push(
                    Finding::new(
                        FindingKind::MultiplePrimaryKeys,
                        format!(
                            "table '{}' declares {} primary key constraints",
                            table.name, pk_count
                        ),
                    )
                    .with_span(table.span),
                );
            }
        }

        for constraint in &table.constraints {
            match constraint.kind {
                ConstraintKind::ForeignKey => {
                    let Some(target) = &constraint.references else {
                        continue;
                    };
                    if !model.tables.contains_key(&target.table.key()) {
                        findings.push(
                            Finding::new(
                                FindingKind::ForeignKeyTargetUnknown,
                                format!(
                                    "foreign key on table '{}' references table '{}' which was not seen in this input; it may be defined in another file",
                                    table.name, target.table
                                ),
                            )
                            .with_span(constraint.span),
                        );
                    }
                }
                ConstraintKind::Check => {
                    let empty = constraint
                        .expression
                        .as_deref()
                        .map_or(true, |e| e.trim().is_empty());
                    if empty {
                        findings.push(
                            Finding::new(
                                FindingKind::EmptyCheckExpression,
                                format!(
                                    "CHECK constraint on table '{}' has an empty expression",
                                    table.name
                                ),
                            )
                            .with_span(constraint.span),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    findings
}
