//! Validation pipeline facade
//!
//! One synchronous, pure pass per input buffer: split into statements, fold
//! into a schema model, run the rules, reduce into a Report. The engine
//! never opens files; hosts pass named buffers in.

use crate::error::EngineError;
use crate::lexer;
use crate::report::Report;
use crate::rules::RuleEngine;
use crate::schema::ModelBuilder;

/// A named input buffer
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub contents: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Validate a single named buffer.
pub fn validate_source(file: &str, sql: &str) -> Report {
    let (statements, mut findings) = lexer::split_statements(sql);
    tracing::debug!(file, statements = statements.len(), "validating source");

    let mut builder = ModelBuilder::new();
    for statement in &statements {
        builder.ingest(statement);
    }
    let (model, model_findings) = builder.build();
    findings.extend(model_findings);
    findings.extend(RuleEngine::new(&model).run());

    Report::for_file(file, findings)
}

/// Validate raw bytes. Input that is not valid UTF-8 is the one condition
/// that surfaces as an engine fault instead of a finding.
pub fn validate_bytes(file: &str, bytes: &[u8]) -> Result<Report, EngineError> {
    let sql = std::str::from_utf8(bytes).map_err(|e| EngineError::InvalidUtf8 {
        file: file.to_string(),
        valid_up_to: e.valid_up_to(),
    })?;
    Ok(validate_source(file, sql))
}

/// Validate a batch of buffers, merging per-file reports in input order.
/// Files are independent; each gets its own model and rule pass.
pub fn validate_sources(files: &[SourceFile]) -> Report {
    Report::merge(
        files
            .iter()
            .map(|file| validate_source(&file.name, &file.contents)),
    )
}
