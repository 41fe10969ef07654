//! Stream host configuration system.
//!
//! TOML-based configuration with validation. All sections use sensible
//! defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stream_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config.widget_url());
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{StreamConfig, CONFIG_SCHEMA_VERSION};
pub use toml_loader::{load_default, load_from_path};

use std::path::Path;

use stream_common::ConfigError;

/// Load and validate config from the platform default path.
pub fn load_config() -> Result<StreamConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load and validate config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<StreamConfig, ConfigError> {
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &StreamConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let json = config_to_json(&StreamConfig::default());
        assert!(json.contains("\"content\""));
        assert!(json.contains("\"viewport\""));
        assert!(json.contains("\"lifecycle\""));
        assert!(json.contains("\"webview\""));
        assert!(json.contains("\"logging\""));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn load_config_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[viewport]\ninitial_width = 0\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let json = config_to_json(&StreamConfig::default());
        let parsed: StreamConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.viewport.initial_width, 600);
        assert_eq!(parsed.content.widget_page, "StreamWidget.html");
    }
}
