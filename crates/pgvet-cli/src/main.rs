//! pgvet CLI - PostgreSQL DDL schema validation tool

mod args;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use pgvet_core::lexer::split_statements;
use pgvet_core::{validate_bytes, ModelBuilder, Report};

use crate::args::{Args, Command, OutputFormat};
use crate::config::Config;
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    match args.command {
        Command::Check {
            paths,
            format,
            disable,
            config: config_path,
        } => {
            // Load configuration
            let config = if let Some(path) = config_path {
                Config::from_file(&path)?
            } else {
                Config::find_and_load()?.unwrap_or_default()
            };

            // Merge CLI args with config (CLI takes precedence)
            let config = config.merge_with_args(&paths, &format, &disable);

            let files = collect_sql_files(&config.paths)?;
            if files.is_empty() {
                miette::bail!(
                    "No SQL files specified. Pass files or directories, or configure paths in pgvet.toml"
                );
            }

            let output_format = match config.format.as_deref() {
                Some("json") => OutputFormat::Json,
                Some("markdown") => OutputFormat::Markdown,
                Some("sarif") => OutputFormat::Sarif,
                _ => OutputFormat::Human,
            };

            // Validate each file independently, then merge in enumeration
            // order.
            let mut reports = Vec::new();
            for file in &files {
                let bytes = fs::read(file).into_diagnostic()?;
                let report =
                    validate_bytes(&file.display().to_string(), &bytes).into_diagnostic()?;
                reports.push(report);
            }
            let mut report = Report::merge(reports);

            // Filter out disabled rules
            let disabled: std::collections::HashSet<String> = config
                .disable
                .iter()
                .map(|code| code.to_ascii_uppercase())
                .collect();
            if !disabled.is_empty() {
                report = Report::from_findings(
                    report
                        .findings
                        .into_iter()
                        .filter(|f| !disabled.contains(f.code()))
                        .collect(),
                );
            }

            OutputFormatter::new(output_format).print_report(&report);
            Ok(report.has_errors())
        }

        Command::Schema { files } => {
            // Build and display the schema model
            let mut builder = ModelBuilder::new();
            for file in &files {
                let contents = fs::read_to_string(file).into_diagnostic()?;
                let (statements, _) = split_statements(&contents);
                for statement in &statements {
                    builder.ingest(statement);
                }
            }
            let (model, _) = builder.build();

            println!("Schema Information:");
            println!("==================");
            for table in model.tables.values() {
                let rls = if table.rls_enabled {
                    " (RLS enabled)"
                } else {
                    ""
                };
                println!("\nTable: {}{}", table.name, rls);
                for column in table.columns.values() {
                    let nullable = if column.nullable { "NULL" } else { "NOT NULL" };
                    println!("  - {} {} {}", column.name, column.data_type, nullable);
                }
                let key = table.name.key();
                for index in model.indexes_on(&key) {
                    println!("  index {} ({})", index.label(), index.columns.join(", "));
                }
                for policy in model.policies_on(&key) {
                    println!("  policy {} FOR {}", policy.name, policy.command.as_str());
                }
            }

            Ok(false)
        }

        Command::Statements { file } => {
            // Split and display classified statements (for debugging)
            let contents = fs::read_to_string(&file).into_diagnostic()?;
            let (statements, findings) = split_statements(&contents);
            for (i, statement) in statements.iter().enumerate() {
                println!(
                    "Statement {} [{}] at line {}:",
                    i + 1,
                    statement.kind.name(),
                    statement.line
                );
                println!("{}", statement.sql);
                println!();
            }
            for finding in &findings {
                eprintln!("{}: {}", finding.code(), finding.message);
            }

            Ok(false)
        }
    }
}

/// Expand paths into .sql files: directories are searched recursively, glob
/// patterns expanded, plain files passed through. Enumeration order is the
/// sorted order `glob` yields, so batch runs are reproducible.
fn collect_sql_files(paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let as_path = PathBuf::from(path);
        if as_path.is_dir() {
            let pattern = format!("{}/**/*.sql", as_path.display());
            for entry in glob::glob(&pattern).into_diagnostic()?.flatten() {
                files.push(entry);
            }
        } else if path.contains('*') {
            for entry in glob::glob(path).into_diagnostic()?.flatten() {
                files.push(entry);
            }
        } else {
            files.push(as_path);
        }
    }
    Ok(files)
}
