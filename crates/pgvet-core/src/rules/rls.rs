//! Row-level-security rules

use crate::error::{Finding, FindingKind};
use crate::schema::{PolicyCommand, SchemaModel};

pub(crate) fn check(model: &SchemaModel) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (key, table) in &model.tables {
        let policy_count = model.policies_on(key).count();
        if table.rls_enabled && policy_count == 0 {
            findings.push(
                Finding::new(
                    FindingKind::RlsNoPolicies,
                    format!(
                        "row level security is enabled on table '{}' but no policies are defined; all access will be blocked",
                        table.name
                    ),
                )
                .with_span(table.span),
            );
        }
        // Placeholders are skipped here: whether RLS is enabled for a table
        // declared in another file is unknowable from this input.
        if table.declared && !table.rls_enabled && policy_count > 0 {
            findings.push(
                Finding::new(
                    FindingKind::PoliciesWithoutRls,
                    format!(
                        "table '{}' has {} {} but row level security is not enabled; policies have no effect until it is",
                        table.name,
                        policy_count,
                        if policy_count == 1 { "policy" } else { "policies" }
                    ),
                )
                .with_span(table.span),
            );
        }
    }

    for policy in &model.policies {
        if policy.roles.is_empty() {
            findings.push(
                Finding::new(
                    FindingKind::PolicyNoRoles,
                    format!(
                        "policy '{}' on table '{}' has no TO clause and applies to the public role",
                        policy.name, policy.table
                    ),
                )
                .with_span(policy.span),
            );
        }
        if matches!(policy.command, PolicyCommand::Insert | PolicyCommand::Update)
            && policy.check_expr.is_none()
        {
            findings.push(
                Finding::new(
                    FindingKind::PolicyMissingWithCheck,
                    format!(
                        "{} policy '{}' on table '{}' has no WITH CHECK clause; written rows are not validated",
                        policy.command.as_str(),
                        policy.name,
                        policy.table
                    ),
                )
                .with_span(policy.span),
            );
        }
    }

    findings
}
