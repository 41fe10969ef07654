//! Configuration schema types for the stream host.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod content;
mod system;
mod viewport;

pub use content::*;
pub use system::*;
pub use viewport::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StreamConfig {
    pub content: ContentConfig,
    pub viewport: ViewportConfig,
    pub lifecycle: LifecycleConfig,
    pub webview: WebViewSettings,
    pub logging: LoggingConfig,
}

impl StreamConfig {
    /// Full URL of the widget page.
    pub fn widget_url(&self) -> String {
        self.content.widget_url()
    }
}
