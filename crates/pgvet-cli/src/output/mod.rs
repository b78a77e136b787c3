//! Output formatting

use pgvet_core::{Category, Finding, Report, Severity};

use crate::args::OutputFormat;

/// Output formatter for validation reports
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a merged report in the configured format
    pub fn print_report(&self, report: &Report) {
        match self.format {
            OutputFormat::Human => self.print_human(report),
            OutputFormat::Json => self.print_json(report),
            OutputFormat::Markdown => self.print_markdown(report),
            OutputFormat::Sarif => self.print_sarif(report),
        }
    }

    fn print_human(&self, report: &Report) {
        for finding in &report.findings {
            println!(
                "{}:{}: [{}] {} — {}",
                finding.file,
                finding.line(),
                severity_str(finding.severity),
                finding.category,
                finding.message
            );
        }

        eprintln!();
        eprintln!(
            "{} error(s), {} warning(s), {} info",
            report.summary.errors, report.summary.warnings, report.summary.infos
        );
        for (category, count) in &report.summary.per_category {
            if *count > 0 {
                eprintln!("  {category}: {count}");
            }
        }
    }

    fn print_json(&self, report: &Report) {
        let output = serde_json::json!({
            "findings": report.findings.iter().map(finding_json).collect::<Vec<_>>(),
            "summary": report.summary,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    }

    fn print_markdown(&self, report: &Report) {
        println!("# Schema validation report");
        println!();
        println!("| severity | count |");
        println!("|----------|-------|");
        println!("| errors   | {} |", report.summary.errors);
        println!("| warnings | {} |", report.summary.warnings);
        println!("| info     | {} |", report.summary.infos);

        for category in Category::ALL {
            println!();
            println!("## {}", category_title(category));

            let errors: Vec<&Finding> = report
                .findings
                .iter()
                .filter(|f| f.category == category && f.severity == Severity::Error)
                .collect();
            let warnings: Vec<&Finding> = report
                .findings
                .iter()
                .filter(|f| f.category == category && f.severity == Severity::Warning)
                .collect();

            if errors.is_empty() && warnings.is_empty() {
                println!();
                println!("No findings.");
                continue;
            }
            if !errors.is_empty() {
                println!();
                println!("### Errors");
                println!();
                for finding in errors {
                    println!("- `{}:{}` {}", finding.file, finding.line(), finding.message);
                }
            }
            if !warnings.is_empty() {
                println!();
                println!("### Warnings");
                println!();
                for finding in warnings {
                    println!("- `{}:{}` {}", finding.file, finding.line(), finding.message);
                }
            }
        }
    }

    fn print_sarif(&self, report: &Report) {
        let results: Vec<serde_json::Value> = report
            .findings
            .iter()
            .map(|f| {
                serde_json::json!({
                    "ruleId": f.code(),
                    "level": match f.severity {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                        Severity::Info => "note",
                    },
                    "message": {
                        "text": f.message
                    },
                    "locations": [{
                        "physicalLocation": {
                            "artifactLocation": {
                                "uri": f.file
                            },
                            "region": {
                                "startLine": f.line().max(1)
                            }
                        }
                    }]
                })
            })
            .collect();

        let sarif = serde_json::json!({
            "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "pgvet",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                },
                "results": results
            }]
        });

        println!("{}", serde_json::to_string_pretty(&sarif).unwrap());
    }
}

fn severity_str(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    }
}

fn category_title(category: Category) -> &'static str {
    match category {
        Category::Syntax => "Syntax",
        Category::Naming => "Naming",
        Category::Constraints => "Constraints",
        Category::Indexes => "Indexes",
        Category::Rls => "Row-Level Security",
    }
}

fn finding_json(finding: &Finding) -> serde_json::Value {
    serde_json::json!({
        "code": finding.code(),
        "rule": finding.kind.name(),
        "severity": finding.severity,
        "category": finding.category,
        "message": finding.message,
        "file": finding.file,
        "line": finding.line(),
    })
}
