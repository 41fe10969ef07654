//! Per-section validators.

use crate::schema::StreamConfig;

use super::helpers::{validate_non_empty, validate_range};

/// Validate widget page location.
pub(crate) fn validate_content(errors: &mut Vec<String>, config: &StreamConfig) {
    validate_non_empty(errors, "content.widget_page", &config.content.widget_page);
    validate_non_empty(errors, "content.base_url", &config.content.base_url);
    if !config.content.base_url.is_empty() && !config.content.base_url.ends_with('/') {
        errors.push(format!(
            "content.base_url = {:?} must end with '/'",
            config.content.base_url
        ));
    }
    if let Some(dir) = &config.content.asset_dir {
        if !dir.is_dir() {
            errors.push(format!(
                "content.asset_dir = {} is not a directory",
                dir.display()
            ));
        }
    }
}

/// Validate initial container geometry.
pub(crate) fn validate_viewport(errors: &mut Vec<String>, config: &StreamConfig) {
    validate_range(
        errors,
        "viewport.initial_width",
        config.viewport.initial_width.into(),
        1,
        16384,
    );
    validate_range(
        errors,
        "viewport.initial_height",
        config.viewport.initial_height.into(),
        1,
        16384,
    );
}

/// Validate the lifecycle barrier bound.
pub(crate) fn validate_lifecycle(errors: &mut Vec<String>, config: &StreamConfig) {
    validate_range(
        errors,
        "lifecycle.detach_timeout_ms",
        config.lifecycle.detach_timeout_ms,
        1,
        60_000,
    );
}
