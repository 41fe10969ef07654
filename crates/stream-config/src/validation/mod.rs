//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::StreamConfig;
use stream_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &StreamConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_content(&mut errors, config);
    sections::validate_viewport(&mut errors, config);
    sections::validate_lifecycle(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
