use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::nugget::{
    NuggetError,
    NuggetTokens,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "includePatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// One line per error, for the `ConfigError` message.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nSettings {
    /// Directory holding `messages.pot` and `<culture>/messages.po`,
    /// relative to the project root.
    pub locale_directory: String,

    /// Directories walked when extracting nuggets, relative to the project root.
    pub directories_to_scan: Vec<String>,

    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,

    pub nugget_tokens: NuggetTokens,

    /// Cultures that always get a translation file, even before one exists on disk.
    pub languages: Vec<String>,

    pub indexing: IndexingConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexingConfig {
    /// Parallel thread count for scanning.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

impl IndexingConfig {
    /// Resolves the configured thread count, falling back to 80% of the CPUs.
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| num_cpus::get() * 4 / 5).max(1)
    }
}

impl I18nSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Invalid nugget tokens
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.locale_directory.trim().is_empty() {
            errors.push(ValidationError::new(
                "localeDirectory",
                "The locale directory cannot be empty. Example: \"locale\"",
            ));
        }

        if self.directories_to_scan.is_empty() {
            errors.push(ValidationError::new(
                "directoriesToScan",
                "At least one directory is required. Example: [\".\"]",
            ));
        }

        if self.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "includePatterns",
                "At least one pattern is required. Example: [\"**/*.{html,cshtml}\"]",
            ));
        }

        for (index, pattern) in self.include_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("includePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if let Err(e) = self.nugget_tokens.check() {
            let field = match &e {
                NuggetError::EmptyToken { name } => format!("nuggetTokens.{name}"),
                _ => "nuggetTokens".to_string(),
            };
            errors.push(ValidationError::new(field, e.to_string()));
        }

        for (index, language) in self.languages.iter().enumerate() {
            if !crate::culture::is_known_culture(language) {
                errors.push(ValidationError::new(
                    format!("languages[{index}]"),
                    format!("Unknown culture '{language}'. Example: \"fr\" or \"pt-BR\""),
                ));
            }
        }

        if self.indexing.num_threads == Some(0) {
            errors.push(ValidationError::new(
                "indexing.numThreads",
                "The thread count must be at least 1, or removed to use the default",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            locale_directory: "locale".to_string(),
            directories_to_scan: vec![".".to_string()],
            include_patterns: vec!["**/*.{html,cshtml,razor,js,ts}".to_string()],
            exclude_patterns: vec![
                "**/node_modules/**".to_string(),
                "**/bin/**".to_string(),
                "**/obj/**".to_string(),
            ],
            nugget_tokens: NuggetTokens::default(),
            languages: Vec::new(),
            indexing: IndexingConfig::default(),
        }
    }
}
