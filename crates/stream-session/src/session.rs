//! `StreamSession`: the host-facing side of the bridge.
//!
//! Owns the browser handle, the viewport reconciler and the launch-data
//! adapter, and publishes `HostEvent`s on the event bus. All methods are
//! meant to be called from the host's UI thread; `pump` must be called
//! regularly (once per event-loop turn) to process content signals.

use std::path::Path;
use std::time::Duration;

use serde_json::{Map, Value};
use stream_common::{
    DetachWait, EventBus, FlowDocument, HostEvent, HostEventReceiver, SharedFlow, Size, StreamError,
};
use stream_config::StreamConfig;
use stream_webview::{BrowserFactory, BrowserHandle, ContentSignal, DEFAULT_DETACH_TIMEOUT};
use tracing::{debug, info, warn};

use crate::sync::{LaunchData, SessionConfig, StateSync};
use crate::viewport::{ViewportReconciler, ViewportState};

/// Fixed inputs of a session, usually derived from `StreamConfig`.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub widget_url: String,
    /// Host container size before the first resize notification.
    pub initial_size: Size,
    pub detach_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&StreamConfig::default())
    }
}

impl SessionSettings {
    pub fn from_config(config: &StreamConfig) -> Self {
        Self {
            widget_url: config.widget_url(),
            initial_size: Size::new(config.viewport.initial_width, config.viewport.initial_height),
            detach_timeout: config.lifecycle.detach_timeout(),
        }
    }
}

pub struct StreamSession {
    browser: BrowserHandle,
    sync: StateSync,
    viewport: ViewportReconciler,
    config: SessionConfig,
    settings: SessionSettings,
    bus: EventBus,
    host_size: Size,
}

impl StreamSession {
    pub fn new(
        factory: Box<dyn BrowserFactory>,
        sync: StateSync,
        settings: SessionSettings,
        bus: EventBus,
    ) -> Self {
        let flow = SharedFlow::new(FlowDocument::new(sync.default_flow()));
        let config = SessionConfig::default();
        let mut browser = BrowserHandle::new(factory, flow, config.content_options());
        browser.set_bounds(settings.initial_size);
        let viewport = ViewportReconciler::new(settings.initial_size, config.viewport_params());
        Self {
            browser,
            sync,
            viewport,
            config,
            host_size: settings.initial_size,
            settings,
            bus,
        }
    }

    /// Build a session from configuration, honouring `default_flow_path`.
    pub fn from_config(
        factory: Box<dyn BrowserFactory>,
        config: &StreamConfig,
        bus: EventBus,
    ) -> Result<Self, StreamError> {
        let sync = match &config.content.default_flow_path {
            Some(path) => StateSync::with_default_flow_file(path)?,
            None => StateSync::default(),
        };
        Ok(Self::new(factory, sync, SessionSettings::from_config(config), bus))
    }

    // -----------------------------------------------------------------
    // Host contract
    // -----------------------------------------------------------------

    /// Load a new document from the host's launch data.
    ///
    /// Detaches the current content, waits (bounded) for the detach, then
    /// attaches the widget with the map's flow or the default flow.
    pub fn set_launch_data(&mut self, map: &Map<String, Value>) -> Result<(), StreamError> {
        let launch = self.sync.read(map);
        self.apply(launch)
    }

    /// Same as `set_launch_data` with an already parsed document.
    pub fn apply(&mut self, launch: LaunchData) -> Result<(), StreamError> {
        self.reload(launch.flow, launch.config)
    }

    /// Attach the widget with the current flow if nothing is attached.
    pub fn start(&mut self) -> Result<(), StreamError> {
        if self.browser.is_attached() {
            debug!("session already started");
            return Ok(());
        }
        info!("starting session");
        let flow = self.browser.get_flow();
        self.reload(flow, self.config)
    }

    /// Detach the content. The flow mirror keeps the last edit.
    pub fn stop(&mut self) -> Result<(), StreamError> {
        info!("stopping session");
        self.browser.load(None)?;
        Ok(())
    }

    pub fn destroy(&mut self) {
        self.browser.destroy();
    }

    /// The state map the host should persist.
    pub fn state(&self) -> Map<String, Value> {
        self.sync.state(&self.browser.get_flow())
    }

    /// The host container changed size.
    pub fn on_host_resize(&mut self, size: Size) {
        if size.is_degenerate() {
            debug!(%size, "ignoring degenerate host size");
            return;
        }
        self.host_size = size;
        self.browser.set_bounds(size);
        if let Some(zoom) = self.viewport.on_host_resize(size) {
            self.post_zoom(zoom);
        }
    }

    /// Process everything the content reported since the last call.
    /// Returns the host events that were published.
    pub fn pump(&mut self) -> Vec<HostEvent> {
        let mut published = Vec::new();
        for signal in self.browser.poll() {
            match signal {
                ContentSignal::PageLoaded { url } => {
                    debug!(url = %url, "widget loaded");
                    self.post_zoom(self.viewport.zoom());
                }
                ContentSignal::FlowEdited(flow) => {
                    debug!(len = flow.len(), "flow edited");
                }
                ContentSignal::Measured(measurement) => {
                    let effects = self.viewport.on_content_measured(measurement);
                    if let Some(zoom) = effects.zoom {
                        self.post_zoom(zoom);
                    }
                    if let Some(height) = effects.resize_request {
                        let event = HostEvent::Resize { height };
                        let receivers = self.bus.publish(event.clone());
                        debug!(height, receivers, "resize request published");
                        published.push(event);
                    }
                }
                ContentSignal::Terminated => {
                    info!("content terminated its session");
                }
            }
        }
        published
    }

    // -----------------------------------------------------------------
    // Flow files
    // -----------------------------------------------------------------

    /// Replace the document with the flow stored in `path` and reload.
    pub fn import_flow(&mut self, path: &Path) -> Result<(), StreamError> {
        let flow = std::fs::read_to_string(path)?;
        info!(path = %path.display(), len = flow.len(), "importing flow");
        self.reload(flow, self.config)
    }

    /// Write the current flow to `path` as UTF-8.
    pub fn export_flow(&self, path: &Path) -> Result<(), StreamError> {
        let flow = self.browser.get_flow();
        std::fs::write(path, flow.as_bytes())?;
        info!(path = %path.display(), len = flow.len(), "flow exported");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn flow(&self) -> String {
        self.browser.get_flow()
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        self.viewport.state()
    }

    pub fn browser(&self) -> &BrowserHandle {
        &self.browser
    }

    pub fn subscribe(&self) -> HostEventReceiver {
        self.bus.subscribe()
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn reload(&mut self, flow: String, config: SessionConfig) -> Result<(), StreamError> {
        self.browser.load(None)?;
        match self.browser.wait_detached(self.detach_timeout()) {
            DetachWait::TimedOut => warn!("previous content still detaching, loading anyway"),
            outcome => debug!(?outcome, "previous content released"),
        }

        self.config = config;
        self.browser.set_flow(flow);
        self.browser.set_options(config.content_options());
        self.viewport.begin_session(self.host_size, config.viewport_params());
        self.browser.load(Some(&self.settings.widget_url))?;
        info!(url = %self.settings.widget_url, ?config, "widget attached");
        Ok(())
    }

    fn detach_timeout(&self) -> Duration {
        if self.settings.detach_timeout.is_zero() {
            DEFAULT_DETACH_TIMEOUT
        } else {
            self.settings.detach_timeout
        }
    }

    fn post_zoom(&self, zoom: f64) {
        if let Err(e) = self.browser.post("zoom", &Value::from(zoom)) {
            warn!(error = %e, zoom, "failed to apply zoom");
        }
    }
}

#[cfg(test)]
mod tests;
