//! Window creation and session setup.

use std::sync::Arc;

use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use stream_common::EventBus;
use stream_session::StreamSession;
use stream_webview::{ContentProvider, NavigationAllowlist, WryBrowserFactory, WryOptions};

use crate::launch;

use super::core::StreamHost;

// =============================================================================
// INITIALIZATION
// =============================================================================

impl StreamHost {
    /// Create the window and attach the widget session.
    /// Returns `false` if initialization failed and the event loop should exit.
    pub(super) fn initialize_window(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let viewport = &self.config.viewport;
        let attrs = WindowAttributes::default()
            .with_title("Stream")
            .with_inner_size(winit::dpi::LogicalSize::new(
                viewport.initial_width as f64,
                viewport.initial_height as f64,
            ));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("Failed to create window: {e}");
                return false;
            }
        };

        let factory = self.browser_factory(Arc::clone(&window));
        let bus = EventBus::default();
        let mut session = match StreamSession::from_config(Box::new(factory), &self.config, bus) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to create session: {e}");
                return false;
            }
        };
        self.host_events = Some(session.subscribe());

        self.load_document(&mut session);

        self.session = Some(session);
        self.window = Some(window);
        tracing::info!("Window created and widget session started");
        true
    }

    fn browser_factory(&self, window: Arc<Window>) -> WryBrowserFactory<Window> {
        let settings = &self.config.webview;
        let options = WryOptions {
            devtools: settings.devtools,
            transparent: settings.transparent,
            user_agent: settings.user_agent.clone(),
        };
        let allowlist = NavigationAllowlist::new(self.config.content.effective_base());
        let mut factory = WryBrowserFactory::new(window, options, allowlist);

        if let Some(dir) = &self.config.content.asset_dir {
            if !dir.is_dir() {
                tracing::warn!(path = %dir.display(), "Asset directory not found");
            }
            factory.set_content_provider(ContentProvider::new(dir));
        }
        factory
    }

    /// Apply the launch-data file, then the optional flow import.
    fn load_document(&self, session: &mut StreamSession) {
        let map = match launch::read_launch_data(&self.paths.launch_data) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "Launch data unreadable, using defaults");
                Default::default()
            }
        };
        if let Err(e) = session.set_launch_data(&map) {
            tracing::error!(error = %e, "Failed to load widget");
            return;
        }
        if let Some(path) = &self.paths.import_flow {
            if let Err(e) = session.import_flow(path) {
                tracing::warn!(path = %path.display(), error = %e, "Flow import failed");
            }
        }
    }
}
