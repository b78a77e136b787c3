//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "pgvet")]
#[command(author, version, about = "PostgreSQL DDL schema validation tool")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate DDL files or migration directories
    Check {
        /// SQL files or directories to validate (directories are searched
        /// recursively for .sql files)
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Rule codes to disable (e.g. NM005)
        #[arg(long = "disable", value_name = "CODE")]
        disable: Vec<String>,

        /// Configuration file path
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Display the schema model built from DDL files
    Schema {
        /// Schema definition files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Split a DDL file and display classified statements (for debugging)
    Statements {
        /// SQL file to split
        file: PathBuf,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable one-line-per-finding output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Markdown report document with per-category sections
    Markdown,
    /// SARIF output (for GitHub Code Scanning)
    Sarif,
}
