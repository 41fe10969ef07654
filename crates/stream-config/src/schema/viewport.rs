//! Host container sizing and lifecycle barrier settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Host container geometry before the first resize notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Initial container width in pixels.
    pub initial_width: u32,
    /// Initial container height; doubles as the baseline height.
    pub initial_height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            initial_width: 600,
            initial_height: 400,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Upper bound on waiting for the content to detach (valid range: 1-60000).
    pub detach_timeout_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            detach_timeout_ms: 1000,
        }
    }
}

impl LifecycleConfig {
    pub fn detach_timeout(&self) -> Duration {
        Duration::from_millis(self.detach_timeout_ms)
    }
}
