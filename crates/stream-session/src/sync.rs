//! Marshalling between the host's launch-data map and the session.
//!
//! The host hands over a loosely typed key/value map. Recognized keys:
//! `flowchart`, `readonly`, `pasAanH`, `noTitle`, `hasWidth`, `width`.
//! Everything else is ignored.

use std::path::Path;

use serde_json::{Map, Value};
use stream_common::{StreamError, FLOW_KEY};
use stream_webview::ContentOptions;
use tracing::{debug, warn};

use crate::viewport::ViewportParams;

/// Built-in flow used when the host has none.
pub const DEFAULT_FLOW: &str = include_str!("../assets/flow.json");

pub const READONLY_KEY: &str = "readonly";
pub const AUTO_HEIGHT_KEY: &str = "pasAanH";
pub const NO_TITLE_KEY: &str = "noTitle";
pub const HAS_WIDTH_KEY: &str = "hasWidth";
pub const WIDTH_KEY: &str = "width";

/// Per-load presentation and sizing flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub read_only: bool,
    pub hide_title: bool,
    pub auto_height: bool,
    /// Baseline width supplied by the host (`hasWidth` + `width`).
    pub explicit_width: Option<u32>,
}

impl SessionConfig {
    pub fn content_options(&self) -> ContentOptions {
        ContentOptions {
            read_only: self.read_only,
            hide_title: self.hide_title,
        }
    }

    pub fn viewport_params(&self) -> ViewportParams {
        ViewportParams {
            explicit_width: self.explicit_width,
            auto_height: self.auto_height,
        }
    }
}

/// Result of reading one launch-data map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchData {
    /// Flow to load: from the map, or the default.
    pub flow: String,
    /// Whether `flow` came from the map.
    pub from_host: bool,
    pub config: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct StateSync {
    default_flow: String,
}

impl Default for StateSync {
    fn default() -> Self {
        Self::new(DEFAULT_FLOW.trim_end())
    }
}

impl StateSync {
    pub fn new(default_flow: impl Into<String>) -> Self {
        Self {
            default_flow: default_flow.into(),
        }
    }

    /// Use the flow stored in `path` as the default.
    pub fn with_default_flow_file(path: &Path) -> Result<Self, StreamError> {
        let flow = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), len = flow.len(), "default flow loaded");
        Ok(Self::new(flow))
    }

    pub fn default_flow(&self) -> &str {
        &self.default_flow
    }

    /// Read the host map into a flow and session configuration.
    pub fn read(&self, map: &Map<String, Value>) -> LaunchData {
        let host_flow = map.get(FLOW_KEY).and_then(flow_from_value);
        let from_host = host_flow.is_some();
        let flow = host_flow.unwrap_or_else(|| self.default_flow.clone());

        let explicit_width = if get_bool(map, HAS_WIDTH_KEY) {
            match map.get(WIDTH_KEY).and_then(value_to_u32).filter(|w| *w > 0) {
                Some(width) => Some(width),
                None => {
                    warn!("hasWidth set without a usable width, measuring content instead");
                    None
                }
            }
        } else {
            None
        };

        let config = SessionConfig {
            read_only: get_bool(map, READONLY_KEY),
            hide_title: get_bool(map, NO_TITLE_KEY),
            auto_height: get_bool(map, AUTO_HEIGHT_KEY),
            explicit_width,
        };
        debug!(?config, from_host, flow_len = flow.len(), "launch data read");

        LaunchData {
            flow,
            from_host,
            config,
        }
    }

    /// Parse a launch-data JSON document. Must be an object.
    pub fn read_json(&self, raw: &str) -> Result<LaunchData, StreamError> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => Ok(self.read(&map)),
            other => Err(StreamError::LaunchData(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// The state map the host persists: the current flow only.
    pub fn state(&self, flow: &str) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert(FLOW_KEY.to_string(), Value::String(flow.to_string()));
        state
    }
}

// =============================================================================
// VALUE HELPERS
// =============================================================================

fn flow_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        // Some hosts store the flow already parsed.
        other => Some(other.to_string()),
    }
}

fn get_bool(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).map(value_to_bool).unwrap_or(false)
}

fn value_to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        _ => false,
    }
}

fn value_to_u32(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    if let Some(f) = value.as_f64() {
        return (f.is_finite() && f >= 0.0 && f <= u32::MAX as f64).then_some(f as u32);
    }
    value.as_str().and_then(|s| s.trim().parse().ok())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// TESTS
// =============================================================================
