//! Where the widget page and its starting flow come from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Origin used when the widget is served from a local asset directory.
pub const LOCAL_CONTENT_ORIGIN: &str = "stream://localhost/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Base URL the widget page is resolved against. Must end in `/`.
    pub base_url: String,
    /// File name of the widget page.
    pub widget_page: String,
    /// Serve the widget from this directory via `stream://` instead of `base_url`.
    pub asset_dir: Option<PathBuf>,
    /// Replaces the built-in default flow.
    pub default_flow_path: Option<PathBuf>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8082/apps/".into(),
            widget_page: "StreamWidget.html".into(),
            asset_dir: None,
            default_flow_path: None,
        }
    }
}

impl ContentConfig {
    /// The base the widget page is actually loaded from.
    pub fn effective_base(&self) -> &str {
        if self.asset_dir.is_some() {
            LOCAL_CONTENT_ORIGIN
        } else {
            &self.base_url
        }
    }

    pub fn widget_url(&self) -> String {
        let base = self.effective_base();
        let page = self.widget_page.trim_start_matches('/');
        if base.ends_with('/') {
            format!("{base}{page}")
        } else {
            format!("{base}/{page}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_url_uses_local_origin_with_asset_dir() {
        let content = ContentConfig {
            asset_dir: Some(PathBuf::from("/opt/widget")),
            ..Default::default()
        };
        assert_eq!(content.widget_url(), "stream://localhost/StreamWidget.html");
    }

    #[test]
    fn widget_url_tolerates_missing_slashes() {
        let content = ContentConfig {
            base_url: "https://example.org/apps".into(),
            widget_page: "/Flow.html".into(),
            ..Default::default()
        };
        assert_eq!(content.widget_url(), "https://example.org/apps/Flow.html");
    }
}
