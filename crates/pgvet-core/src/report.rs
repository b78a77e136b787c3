//! Report aggregation
//!
//! A Report is built once, at the end of a run, by reducing over all
//! findings; rules never write into a shared report. Merging is associative,
//! so batch validation equals concatenating per-file reports.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Category, Finding, Severity};

/// The sole externally visible artifact of a validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub findings: Vec<Finding>,
    pub summary: Summary,
}

/// Derived counts per severity and per category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub per_category: IndexMap<Category, usize>,
}

impl Report {
    /// Build a report from raw findings: sort by (file, line, severity)
    /// with stable tie-breakers, then compute the summary counts.
    pub fn from_findings(mut findings: Vec<Finding>) -> Self {
        findings.sort_by(|a, b| {
            (a.file.as_str(), a.line(), a.severity, a.code(), a.message.as_str()).cmp(&(
                b.file.as_str(),
                b.line(),
                b.severity,
                b.code(),
                b.message.as_str(),
            ))
        });

        let mut summary = Summary::default();
        for category in Category::ALL {
            summary.per_category.insert(category, 0);
        }
        for finding in &findings {
            match finding.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
            *summary.per_category.entry(finding.category).or_insert(0) += 1;
        }

        Self { findings, summary }
    }

    /// Build a per-file report, stamping the file onto every finding.
    pub fn for_file(file: &str, mut findings: Vec<Finding>) -> Self {
        for finding in &mut findings {
            finding.file = file.to_string();
        }
        Self::from_findings(findings)
    }

    /// Merge partial reports in order. Associative: merging merged reports
    /// yields the same result as merging all their findings at once.
    pub fn merge<I: IntoIterator<Item = Report>>(reports: I) -> Self {
        let findings = reports
            .into_iter()
            .flat_map(|report| report.findings)
            .collect();
        Self::from_findings(findings)
    }

    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FindingKind;
    use pretty_assertions::assert_eq;

    fn finding(kind: FindingKind, file: &str, line: usize) -> Finding {
        let mut f = Finding::new(kind, "message").with_span(crate::error::Span::new(0, 1, line, 1));
        f.file = file.to_string();
        f
    }

    #[test]
    fn test_sorted_by_file_line_severity() {
        let report = Report::from_findings(vec![
            finding(FindingKind::TableNameNotPlural, "b.sql", 2),
            finding(FindingKind::MissingPrimaryKey, "b.sql", 2),
            finding(FindingKind::RlsNoPolicies, "a.sql", 9),
        ]);
        let order: Vec<_> = report
            .findings
            .iter()
            .map(|f| (f.file.as_str(), f.line(), f.severity))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.sql", 9, Severity::Error),
                ("b.sql", 2, Severity::Error),
                ("b.sql", 2, Severity::Warning),
            ]
        );
    }

    #[test]
    fn test_summary_counts() {
        let report = Report::from_findings(vec![
            finding(FindingKind::MissingPrimaryKey, "a.sql", 1),
            finding(FindingKind::TableNameNotPlural, "a.sql", 1),
            finding(FindingKind::RedundantIndex, "a.sql", 3),
        ]);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 2);
        assert_eq!(report.summary.infos, 0);
        assert_eq!(report.summary.per_category[&Category::Constraints], 1);
        assert_eq!(report.summary.per_category[&Category::Naming], 1);
        assert_eq!(report.summary.per_category[&Category::Indexes], 1);
        assert_eq!(report.summary.per_category[&Category::Syntax], 0);
        assert!(report.has_errors());
    }

    #[test]
    fn test_merge_is_associative() {
        let a = Report::from_findings(vec![finding(FindingKind::MissingPrimaryKey, "a.sql", 1)]);
        let b = Report::from_findings(vec![finding(FindingKind::RlsNoPolicies, "b.sql", 1)]);
        let c = Report::from_findings(vec![finding(FindingKind::RedundantIndex, "c.sql", 1)]);

        let left = Report::merge([Report::merge([a.clone(), b.clone()]), c.clone()]);
        let right = Report::merge([a, Report::merge([b, c])]);
        assert_eq!(left, right);
    }
}
