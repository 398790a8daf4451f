//! Engine presentation defaults.
//!
//! # Responsibility
//! - Hold the sentinel strings and formatting defaults every transformer uses.
//! - Load overrides from YAML (standalone or document front-matter).
//!
//! # Invariants
//! - Every field has a default, so an empty document yields a usable config.
//! - A loaded config is validated before it is returned.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display token for empty values.
pub const DEFAULT_EMPTY_DISPLAY: &str = "—";
/// Bucket label for list items lacking the grouping field.
pub const DEFAULT_UNGROUPED_LABEL: &str = "Ungrouped";
/// Group label for gallery items with no category.
pub const DEFAULT_UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// ISO code used when a currency field declares none.
pub const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_MASONRY_COLUMNS: usize = 3;
/// Widest masonry layout a config may request.
pub const MAX_MASONRY_COLUMNS: usize = 12;

/// Errors from config decoding and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Source text is not valid YAML for the config shape.
    Yaml(String),
    /// Decoded value violates a config invariant.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml(message) => write!(f, "invalid engine config yaml: {message}"),
            Self::Invalid(message) => write!(f, "invalid engine config: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Presentation defaults consumed by the resolver and transformers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    pub empty_display: String,
    pub ungrouped_label: String,
    pub uncategorized_label: String,
    pub default_currency: String,
    pub masonry_columns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            empty_display: DEFAULT_EMPTY_DISPLAY.to_string(),
            ungrouped_label: DEFAULT_UNGROUPED_LABEL.to_string(),
            uncategorized_label: DEFAULT_UNCATEGORIZED_LABEL.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            masonry_columns: DEFAULT_MASONRY_COLUMNS,
        }
    }
}

impl EngineConfig {
    /// Decodes and validates a config from YAML text.
    ///
    /// Blank input returns the default config.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(source).map_err(|err| ConfigError::Yaml(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field-level invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let currency = self.default_currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid(format!(
                "default_currency must be a 3-letter ISO code, got `{}`",
                self.default_currency
            )));
        }
        if !(1..=MAX_MASONRY_COLUMNS).contains(&self.masonry_columns) {
            return Err(ConfigError::Invalid(format!(
                "masonry_columns must be between 1 and {MAX_MASONRY_COLUMNS}, got {}",
                self.masonry_columns
            )));
        }
        Ok(())
    }
}
