//! Local content serving via custom protocol.
//!
//! Registers a `stream://` custom protocol so the widget page and its
//! scripts can be loaded from a local directory without an HTTP server.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Serves local files from a base directory via custom protocol.
///
/// A request for `stream://localhost/StreamWidget.html` resolves to
/// `{base_dir}/StreamWidget.html`.
#[derive(Debug)]
pub struct ContentProvider {
    base_dir: PathBuf,
    /// In-memory overrides (for generated content).
    overrides: HashMap<String, (String, Vec<u8>)>, // path -> (mime, data)
}

impl ContentProvider {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            overrides: HashMap::new(),
        }
    }

    /// Register an in-memory asset override.
    pub fn add_override(
        &mut self,
        path: impl Into<String>,
        mime: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) {
        self.overrides
            .insert(path.into(), (mime.into(), data.into()));
    }

    /// Resolve a request path to content bytes and MIME type.
    pub fn resolve(&self, path: &str) -> Option<(Cow<'_, str>, Cow<'_, [u8]>)> {
        let clean = path.trim_start_matches('/');

        if let Some((mime, data)) = self.overrides.get(clean) {
            return Some((Cow::Borrowed(mime.as_str()), Cow::Borrowed(data.as_slice())));
        }

        let file_path = self.base_dir.join(clean);

        // Canonicalize both sides so `..` and symlinks cannot escape the base.
        let canonical_base = std::fs::canonicalize(&self.base_dir).ok()?;
        let canonical_file = std::fs::canonicalize(&file_path).ok()?;
        if !canonical_file.starts_with(&canonical_base) || !canonical_file.is_file() {
            return None;
        }

        let data = std::fs::read(&canonical_file).ok()?;
        let mime = mime_from_extension(&file_path);
        Some((Cow::Owned(mime.to_string()), Cow::Owned(data)))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Strip the `stream://` origin (in its platform spellings) from a request URI.
pub fn request_path(uri: &str) -> &str {
    uri.strip_prefix("stream://localhost/")
        .or_else(|| uri.strip_prefix("stream://localhost"))
        // WebView2 rewrites custom protocols: stream://localhost/… → http://stream.localhost/…
        .or_else(|| uri.strip_prefix("http://stream.localhost/"))
        .or_else(|| uri.strip_prefix("stream:///"))
        .or_else(|| uri.strip_prefix("stream://"))
        .unwrap_or("")
}

/// Guess MIME type from file extension.
fn mime_from_extension(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("wasm") => "application/wasm",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        Some("xml") => "application/xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("StreamWidget.html"),
            "<html><body><div id=\"outer\"></div></body></html>",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("js")).unwrap();
        std::fs::write(dir.path().join("js").join("flow.js"), "window.install = function() {};")
            .unwrap();
        dir
    }

    // -----------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------

    #[test]
    fn resolves_widget_page() {
        let dir = widget_dir();
        let cp = ContentProvider::new(dir.path());
        let (mime, data) = cp.resolve("StreamWidget.html").unwrap();
        assert_eq!(mime.as_ref(), "text/html");
        assert!(String::from_utf8_lossy(&data).contains("id=\"outer\""));
    }

    #[test]
    fn resolves_nested_script_with_leading_slash() {
        let dir = widget_dir();
        let cp = ContentProvider::new(dir.path());
        let (mime, _) = cp.resolve("/js/flow.js").unwrap();
        assert_eq!(mime.as_ref(), "application/javascript");
    }

    #[test]
    fn nonexistent_file_returns_none() {
        let dir = widget_dir();
        let cp = ContentProvider::new(dir.path());
        assert!(cp.resolve("missing.html").is_none());
    }

    #[test]
    fn directory_is_not_served() {
        let dir = widget_dir();
        let cp = ContentProvider::new(dir.path());
        assert!(cp.resolve("js").is_none());
    }

    // -----------------------------------------------------------------
    // Security: directory traversal
    // -----------------------------------------------------------------

    #[test]
    fn traversal_is_blocked() {
        let dir = widget_dir();
        let secret = dir.path().parent().unwrap().join("stream_secret_probe.txt");
        std::fs::write(&secret, "secret").ok();
        let cp = ContentProvider::new(dir.path());
        assert!(cp.resolve("../stream_secret_probe.txt").is_none());
        assert!(cp.resolve("js/../../stream_secret_probe.txt").is_none());
        assert!(cp.resolve("/etc/passwd").is_none());
        std::fs::remove_file(&secret).ok();
    }

    // -----------------------------------------------------------------
    // Overrides and URIs
    // -----------------------------------------------------------------

    #[test]
    fn override_takes_precedence() {
        let dir = widget_dir();
        let mut cp = ContentProvider::new(dir.path());
        cp.add_override("StreamWidget.html", "text/html", b"<html>override</html>".to_vec());
        let (_, data) = cp.resolve("StreamWidget.html").unwrap();
        assert_eq!(data.as_ref(), b"<html>override</html>");
    }

    #[test]
    fn request_path_strips_origin() {
        assert_eq!(
            request_path("stream://localhost/StreamWidget.html"),
            "StreamWidget.html"
        );
        assert_eq!(
            request_path("http://stream.localhost/js/flow.js"),
            "js/flow.js"
        );
        assert_eq!(request_path("stream://flow.json"), "flow.json");
        assert_eq!(request_path("https://example.org/x"), "");
    }

    #[test]
    fn mime_types() {
        assert_eq!(mime_from_extension(Path::new("a.html")), "text/html");
        assert_eq!(mime_from_extension(Path::new("a.json")), "application/json");
        assert_eq!(mime_from_extension(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(
            mime_from_extension(Path::new("a.xyz")),
            "application/octet-stream"
        );
    }
}
