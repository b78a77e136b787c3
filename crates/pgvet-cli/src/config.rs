//! Configuration file handling

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for pgvet
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// File or directory paths to validate
    #[serde(default)]
    pub paths: Vec<String>,

    /// Output format (human, json, markdown, sarif)
    #[serde(default)]
    pub format: Option<String>,

    /// Rule codes to disable (e.g. ["NM005"])
    #[serde(default)]
    pub disable: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        let config: Config = toml::from_str(&contents).into_diagnostic()?;
        Ok(config)
    }

    /// Try to find and load pgvet.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join("pgvet.toml");
            if config_path.exists() {
                return Ok(Some(Self::from_file(&config_path)?));
            }

            // Try parent directory
            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        paths: &[PathBuf],
        format: &Option<crate::args::OutputFormat>,
        disable: &[String],
    ) -> Self {
        if !paths.is_empty() {
            self.paths = paths.iter().map(|p| p.display().to_string()).collect();
        }

        if let Some(format) = format {
            self.format = Some(format!("{format:?}").to_lowercase());
        }

        if !disable.is_empty() {
            self.disable = disable.to_vec();
        }

        self
    }
}
