//! Naming rules: snake_case, plural tables, constraint and index prefixes

use crate::error::{Finding, FindingKind};
use crate::schema::SchemaModel;

fn is_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Uncountable-ish last segments that read fine without a plural `s`.
const PLURAL_EXEMPT: &[&str] = &["data", "metadata", "media", "info", "history"];

/// Heuristic only: no deterministic pluralization rule is reliable, so this
/// stays a Warning and errs toward accepting.
fn looks_plural(name: &str) -> bool {
    let last = name.rsplit('_').next().unwrap_or(name);
    last.ends_with('s') || PLURAL_EXEMPT.contains(&last)
}

pub(crate) fn check(model: &SchemaModel) -> Vec<Finding> {
    let mut findings = Vec::new();

    for table in model.tables.values() {
        if table.declared {
            let name = &table.name.name;
            if !is_snake_case(name) {
                findings.push(
                    Finding::new(
                        FindingKind::TableNameCase,
                        format!("table name '{name}' is not lowercase snake_case"),
                    )
                    .with_span(table.span),
                );
            } else if !looks_plural(name) {
                findings.push(
                    Finding::new(
                        FindingKind::TableNameNotPlural,
                        format!(
                            "table name '{name}' does not look plural; tables are conventionally named after the set of rows they hold"
                        ),
                    )
                    .with_span(table.span),
                );
            }
            for column in table.columns.values() {
                if !is_snake_case(&column.name) {
                    findings.push(
                        Finding::new(
                            FindingKind::ColumnNameCase,
                            format!(
                                "column name '{}' on table '{}' is not snake_case",
                                column.name, table.name
                            ),
                        )
                        .with_span(column.span),
                    );
                }
            }
        }

        for constraint in &table.constraints {
            let Some(prefix) = constraint.kind.name_prefix() else {
                continue;
            };
            match &constraint.name {
                Some(name) if !name.starts_with(prefix) => findings.push(
                    Finding::new(
                        FindingKind::ConstraintNamePrefix,
                        format!(
                            "{} constraint '{}' on table '{}' should be prefixed '{}'",
                            constraint.kind.label(),
                            name,
                            table.name,
                            prefix
                        ),
                    )
                    .with_span(constraint.span),
                ),
                None => findings.push(
                    Finding::new(
                        FindingKind::ConstraintUnnamed,
                        format!(
                            "{} constraint on table '{}' has no explicit name; PostgreSQL will auto-generate one",
                            constraint.kind.label(),
                            table.name
                        ),
                    )
                    .with_span(constraint.span),
                ),
                _ => {}
            }
        }
    }

    for index in &model.indexes {
        match &index.name {
            Some(name) => {
                let prefix = if index.unique { "uidx_" } else { "idx_" };
                if !name.starts_with(prefix) {
                    findings.push(
                        Finding::new(
                            FindingKind::IndexNamePrefix,
                            format!(
                                "index '{}' on table '{}' should be prefixed '{}'",
                                name, index.table, prefix
                            ),
                        )
                        .with_span(index.span),
                    );
                }
            }
            None => findings.push(
                Finding::new(
                    FindingKind::IndexUnnamed,
                    format!(
                        "index on table '{}' has no explicit name; PostgreSQL will auto-generate one",
                        index.table
                    ),
                )
                .with_span(index.span),
            ),
        }
    }

    findings
}
