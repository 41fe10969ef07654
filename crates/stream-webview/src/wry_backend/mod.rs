//! `BrowserFactory` backed by a native `wry` child web view.
//!
//! Every attach builds a brand new child `WebView` inside the host
//! window; detaching drops it, which releases the native view before the
//! notifier fires.

mod handlers;

use std::sync::Arc;

use serde_json::Value;
use stream_common::{BridgeError, Size};
use tracing::debug;
use wry::raw_window_handle::HasWindowHandle;
use wry::{WebView, WebViewBuilder};

use crate::backend::{AttachRequest, BrowserBackend, BrowserFactory, DetachNotifier};
use crate::content::ContentProvider;
use crate::ipc::{bootstrap_script, js_dispatch_message, IPC_INIT_SCRIPT};

pub use handlers::NavigationAllowlist;

/// Builder options for every web view this factory creates.
#[derive(Debug, Clone)]
pub struct WryOptions {
    pub devtools: bool,
    pub transparent: bool,
    pub user_agent: Option<String>,
}

impl Default for WryOptions {
    fn default() -> Self {
        Self {
            devtools: cfg!(debug_assertions),
            transparent: false,
            user_agent: None,
        }
    }
}

pub struct WryBrowserFactory<W> {
    window: Arc<W>,
    options: WryOptions,
    allowlist: Arc<NavigationAllowlist>,
    content_provider: Option<Arc<ContentProvider>>,
}

impl<W: HasWindowHandle> WryBrowserFactory<W> {
    pub fn new(window: Arc<W>, options: WryOptions, allowlist: NavigationAllowlist) -> Self {
        Self {
            window,
            options,
            allowlist: Arc::new(allowlist),
            content_provider: None,
        }
    }

    /// Serve local assets through the `stream://` protocol.
    pub fn set_content_provider(&mut self, provider: ContentProvider) {
        debug!(base = %provider.base_dir().display(), "content provider installed");
        self.content_provider = Some(Arc::new(provider));
    }
}

impl<W: HasWindowHandle> BrowserFactory for WryBrowserFactory<W> {
    fn attach(&mut self, request: AttachRequest) -> Result<Box<dyn BrowserBackend>, BridgeError> {
        let bootstrap = bootstrap_script(&request.flow, &request.options);

        let mut builder = WebViewBuilder::new()
            .with_bounds(to_wry_rect(request.bounds))
            .with_transparent(self.options.transparent)
            .with_devtools(self.options.devtools)
            .with_focused(true)
            .with_initialization_script(&bootstrap)
            .with_initialization_script(IPC_INIT_SCRIPT);

        if let Some(ua) = &self.options.user_agent {
            builder = builder.with_user_agent(ua);
        }

        builder = handlers::attach_ipc_handler(builder, request.sink.clone());
        builder = handlers::attach_page_load_handler(builder, request.sink.clone());
        builder = handlers::attach_navigation_handler(
            builder,
            request.sink.clone(),
            Arc::clone(&self.allowlist),
        );
        if let Some(provider) = &self.content_provider {
            builder = handlers::attach_custom_protocol(builder, Arc::clone(provider));
        }

        let webview = builder
            .with_url(&request.url)
            .build_as_child(self.window.as_ref())
            .map_err(|e| BridgeError::Backend(e.to_string()))?;

        debug!(generation = request.generation, url = %request.url, "web view created");

        Ok(Box::new(WryBackend {
            webview,
            url: request.url,
            generation: request.generation,
        }))
    }
}

struct WryBackend {
    webview: WebView,
    url: String,
    generation: u64,
}

impl BrowserBackend for WryBackend {
    fn url(&self) -> &str {
        &self.url
    }

    fn post(&self, kind: &str, payload: &Value) -> Result<(), BridgeError> {
        let script = js_dispatch_message(kind, payload);
        self.webview
            .evaluate_script(&script)
            .map_err(|e| BridgeError::Backend(e.to_string()))
    }

    fn set_bounds(&self, bounds: Size) -> Result<(), BridgeError> {
        self.webview
            .set_bounds(to_wry_rect(bounds))
            .map_err(|e| BridgeError::Backend(e.to_string()))
    }

    fn detach(self: Box<Self>, done: DetachNotifier) {
        let generation = self.generation;
        // Dropping the web view tears down the native child synchronously.
        drop(self.webview);
        debug!(generation, "web view released");
        done.notify();
    }
}

/// Convert a host-sized area into a wry Rect anchored at the window origin.
pub fn to_wry_rect(size: Size) -> wry::Rect {
    wry::Rect {
        position: wry::dpi::Position::Logical(wry::dpi::LogicalPosition::new(0.0, 0.0)),
        size: wry::dpi::Size::Logical(wry::dpi::LogicalSize::new(
            size.width as f64,
            size.height as f64,
        )),
    }
}
