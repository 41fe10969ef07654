use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, warn};
use wry::http::Response;
use wry::WebViewBuilder;

use crate::content::{request_path, ContentProvider};
use crate::events::{BrowserEventKind, EventSink, PageLoadState};

// =============================================================================
// NAVIGATION ALLOWLIST
// =============================================================================

/// Prefixes every allowlist permits regardless of where content is hosted.
pub const BUILTIN_NAV_PREFIXES: &[&str] = &[
    "stream://",
    // On Windows, WebView2 rewrites custom protocols: stream://localhost/… → http://stream.localhost/…
    "http://stream.localhost",
    "about:blank",
];

/// URL prefixes the embedded content may navigate to.
#[derive(Debug, Clone)]
pub struct NavigationAllowlist {
    prefixes: Vec<String>,
}

impl NavigationAllowlist {
    /// Allow the built-in origins plus the content base URL.
    pub fn new(content_base: &str) -> Self {
        let mut prefixes: Vec<String> = BUILTIN_NAV_PREFIXES.iter().map(|p| p.to_string()).collect();
        if !content_base.is_empty() && !prefixes.iter().any(|p| p == content_base) {
            prefixes.push(content_base.to_string());
        }
        Self { prefixes }
    }

    pub fn allow(&mut self, prefix: impl Into<String>) {
        self.prefixes.push(prefix.into());
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.prefixes.iter().any(|prefix| url.starts_with(prefix.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

// =============================================================================
// HANDLER ATTACHMENTS
// =============================================================================

pub(super) fn attach_ipc_handler<'a>(builder: WebViewBuilder<'a>, sink: EventSink) -> WebViewBuilder<'a> {
    builder.with_ipc_handler(move |request| {
        let body = request.body().to_string();

        // Validate that the IPC body is valid JSON before forwarding
        if serde_json::from_str::<serde_json::Value>(&body).is_err() {
            warn!(
                generation = sink.generation(),
                body_len = body.len(),
                "IPC message rejected: invalid JSON"
            );
            return;
        }

        debug!(generation = sink.generation(), body_len = body.len(), "IPC message from JS");
        sink.push_ipc(body);
    })
}

pub(super) fn attach_page_load_handler<'a>(
    builder: WebViewBuilder<'a>,
    sink: EventSink,
) -> WebViewBuilder<'a> {
    builder.with_on_page_load_handler(move |event, url| {
        let state = PageLoadState::from(event);
        sink.push(BrowserEventKind::PageLoad { state, url });
    })
}

pub(super) fn attach_navigation_handler<'a>(
    builder: WebViewBuilder<'a>,
    sink: EventSink,
    allowlist: Arc<NavigationAllowlist>,
) -> WebViewBuilder<'a> {
    builder.with_navigation_handler(move |url| {
        if !allowlist.is_allowed(&url) {
            warn!(url = %url, "navigation blocked: URL not in allowlist");
            sink.push(BrowserEventKind::NavigationBlocked { url });
            return false;
        }
        debug!(url = %url, "navigation allowed");
        true
    })
}

pub(super) fn attach_custom_protocol<'a>(
    builder: WebViewBuilder<'a>,
    provider: Arc<ContentProvider>,
) -> WebViewBuilder<'a> {
    builder.with_custom_protocol("stream".to_string(), move |_wv_id, request| {
        let uri = request.uri().to_string();
        let path = request_path(&uri);

        let response = match provider.resolve(path) {
            Some((mime, data)) => Response::builder()
                .status(200)
                .header("Content-Type", mime.as_ref())
                .header("Access-Control-Allow-Origin", "stream://localhost")
                .body(Cow::from(data.into_owned())),
            None => {
                warn!(path = %path, "custom protocol: asset not found");
                Response::builder()
                    .status(404)
                    .body(Cow::from(b"Not Found".to_vec()))
            }
        };
        response.unwrap_or_else(|e| {
            warn!(error = %e, "custom protocol: failed to build response");
            Response::new(Cow::from(Vec::new()))
        })
    })
}

// =============================================================================
// TESTS
// =============================================================================
