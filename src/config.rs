//! Configuration file parser for ~/.config/postgrid/config.toml.
//!
//! The config file is optional. A missing or empty file yields
//! `Config::default()`; unknown keys are accepted and logged as warnings.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::card::DateStyle;
use crate::feed::{BatchPolicy, PageMode};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for `{key}`: {value}")]
    InvalidValue { key: &'static str, value: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// Every field has a default so any subset of keys can be given. Command-line
/// flags override whatever is set here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path or URL of the article index. Derived from `base_url` when unset.
    pub index: Option<String>,

    /// Site root that card and topic links are built against.
    pub base_url: String,

    /// `"listing"` or `"summary"`.
    pub page_mode: PageMode,

    /// `"auto"`, `"mdy"`, `"dmy"` or `"iso"`.
    pub date_style: String,

    /// Theme used when no preference has been saved yet.
    pub theme: String,

    /// Batch sizing and scroll trigger constants.
    pub layout: BatchPolicy,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: None,
            base_url: "/".to_string(),
            page_mode: PageMode::FullListing,
            date_style: "auto".to_string(),
            theme: "light".to_string(),
            layout: BatchPolicy::default(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "index",
        "base_url",
        "page_mode",
        "date_style",
        "theme",
        "layout",
        "keybindings",
    ];

    const KNOWN_LAYOUT_KEYS: [&'static str; 8] = [
        "fallback_card_height",
        "wide_breakpoint",
        "medium_breakpoint",
        "buffer_rows",
        "min_batch",
        "default_batch",
        "load_margin",
        "load_ratio",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            warn_unknown_keys(&raw);
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        tracing::info!(
            base_url = %config.base_url,
            page_mode = ?config.page_mode,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Resolved date style. `"auto"` consults the locale environment.
    pub fn date_style(&self) -> Result<DateStyle, ConfigError> {
        DateStyle::from_setting(&self.date_style).ok_or_else(|| ConfigError::InvalidValue {
            key: "date_style",
            value: self.date_style.clone(),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.date_style()?;
        let ratio = self.layout.load_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::InvalidValue {
                key: "layout.load_ratio",
                value: ratio.to_string(),
            });
        }
        if self.layout.fallback_card_height <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "layout.fallback_card_height",
                value: self.layout.fallback_card_height.to_string(),
            });
        }
        Ok(())
    }
}

fn warn_unknown_keys(raw: &toml::Table) {
    for key in raw.keys() {
        if !Config::KNOWN_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Unknown key in config file, ignoring");
        }
    }
    if let Some(toml::Value::Table(layout)) = raw.get("layout") {
        for key in layout.keys() {
            if !Config::KNOWN_LAYOUT_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "Unknown key in [layout], ignoring");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("postgrid_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, "light");
        assert_eq!(config.base_url, "/");
        assert_eq!(config.page_mode, PageMode::FullListing);
        assert!(config.index.is_none());
        assert_eq!(config.layout, BatchPolicy::default());
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/postgrid_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.theme, "light");
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "/");
        cleanup(&path);
    }

    #[test]
    fn test_partial_layout_keeps_other_defaults() {
        let path = write_config("partial_layout", "[layout]\nmin_batch = 6\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.layout.min_batch, 6);
        assert_eq!(config.layout.default_batch, 10);
        assert_eq!(config.layout.load_margin, 300.0);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
index = "https://example.com/content/index.json"
base_url = "https://example.com"
page_mode = "summary"
date_style = "iso"
theme = "dark"

[layout]
fallback_card_height = 200.0
buffer_rows = 1
load_ratio = 0.5

[keybindings]
quit = "Ctrl+q"
toggle_theme = "F2"
"#;
        let path = write_config("full", content);
        let config = Config::load(&path).unwrap();

        assert_eq!(
            config.index.as_deref(),
            Some("https://example.com/content/index.json")
        );
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.page_mode, PageMode::Summary);
        assert_eq!(config.date_style().unwrap(), DateStyle::Iso);
        assert_eq!(config.theme, "dark");
        assert_eq!(config.layout.fallback_card_height, 200.0);
        assert_eq!(config.layout.buffer_rows, 1);
        assert_eq!(config.layout.load_ratio, 0.5);
        assert_eq!(
            config.keybindings.get("toggle_theme").map(String::as_str),
            Some("F2")
        );
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = r#"
theme = "dark"
totally_fake_key = "should not fail"

[layout]
columns = 4
"#;
        let path = write_config("unknown", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");
        cleanup(&path);
    }

    #[test]
    fn test_unknown_page_mode_rejected() {
        let err = Config::parse("page_mode = \"grid\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_bad_date_style_rejected() {
        let err = Config::parse("date_style = \"julian\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "date_style",
                ..
            }
        ));
    }

    #[test]
    fn test_load_ratio_out_of_range_rejected() {
        let err = Config::parse("[layout]\nload_ratio = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("layout.load_ratio"));
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }
}
