//! Search Configuration
//!
//! Page size bounds, the target dialect and counting behaviour.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        "SIFT_CONFIG_INVALID"
    }

    pub fn is_fatal(&self) -> bool {
        true
    }
}

/// How totals are obtained for offset-paged dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Always issue a separate count query
    Separate,
    /// Add a windowed count column to the main query
    Windowed,
    /// Windowed where the dialect prefers it, separate elsewhere
    Auto,
}

/// Search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound for any requested page size (default: 1000)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Page size used when a request gives none (default: 20)
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Target dialect name (default: "postgres")
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Use case-insensitive pattern operators where the dialect has them (default: true)
    #[serde(default = "default_true")]
    pub case_insensitive: bool,

    /// Counting behaviour (default: auto)
    #[serde(default = "default_count_mode")]
    pub count_mode: CountMode,

    /// Render unknown dialects as generic SQL instead of failing (default: true)
    #[serde(default = "default_true")]
    pub fallback_to_generic_sql: bool,
}

fn default_max_page_size() -> u64 {
    1000
}

fn default_page_size() -> u64 {
    20
}

fn default_dialect() -> String {
    "postgres".to_string()
}

fn default_true() -> bool {
    true
}

fn default_count_mode() -> CountMode {
    CountMode::Auto
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            default_page_size: default_page_size(),
            dialect: default_dialect(),
            case_insensitive: default_true(),
            count_mode: default_count_mode(),
            fallback_to_generic_sql: default_true(),
        }
    }
}

impl SearchConfig {
    /// Default config targeting `dialect`
    pub fn for_dialect(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            ..Default::default()
        }
    }

    pub fn with_count_mode(mut self, count_mode: CountMode) -> Self {
        self.count_mode = count_mode;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: SearchConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable page sizes.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid("max_page_size must be at least 1".into()));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.dialect.trim().is_empty() {
            return Err(ConfigError::Invalid("dialect must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.max_page_size, 1000);
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.dialect, "postgres");
        assert!(config.case_insensitive);
        assert_eq!(config.count_mode, CountMode::Auto);
        assert!(config.fallback_to_generic_sql);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"dialect": "oracle", "count_mode": "separate"}"#).unwrap();
        assert_eq!(config.dialect, "oracle");
        assert_eq!(config.count_mode, CountMode::Separate);
        assert_eq!(config.max_page_size, 1000);
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        assert!(SearchConfig::default().with_max_page_size(0).validate().is_err());

        let config = SearchConfig {
            default_page_size: 50,
            ..SearchConfig::default().with_max_page_size(10)
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"dialect": "mysql", "max_page_size": 200}}"#).unwrap();

        let config = SearchConfig::load(file.path()).unwrap();
        assert_eq!(config.dialect, "mysql");
        assert_eq!(config.max_page_size, 200);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SearchConfig::load("/nonexistent/sift.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(err.code(), "SIFT_CONFIG_INVALID");
    }
}
