//! `BrowserHandle`: owner of one embedded content instance.
//!
//! Every `load` starts a new attachment generation. Events from older
//! generations are dropped when drained, so callbacks registered before
//! the most recent `load` can never reach the session.

use std::sync::Arc;
use std::time::Duration;

use stream_common::{BridgeError, ContentSize, DetachWait, SharedFlow, Size};
use tracing::{debug, error, info, warn};

use crate::backend::{AttachRequest, BrowserBackend, BrowserFactory, ContentOptions, DetachNotifier};
use crate::events::{self, BrowserEventKind, EventQueue, EventSink, PageLoadState};
use crate::ipc::{is_ipc_kind_allowed, ContentMessage, IpcMessage, ScormCall};
use crate::lifecycle::LifecycleBridge;

/// What the content did since the last `poll`, already filtered to the
/// current attachment.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSignal {
    /// The page finished loading.
    PageLoaded { url: String },
    /// The edit callback fired; the flow mirror already holds this value.
    FlowEdited(String),
    /// The content re-rendered and reported (or failed to report) its size.
    Measured(Result<ContentSize, BridgeError>),
    /// The content called Terminate on its own.
    Terminated,
}

pub struct BrowserHandle {
    factory: Box<dyn BrowserFactory>,
    backend: Option<Box<dyn BrowserBackend>>,
    flow: SharedFlow,
    options: ContentOptions,
    bounds: Size,
    lifecycle: LifecycleBridge,
    /// Lifecycle of the most recent detach, until the next attach.
    detaching: Option<LifecycleBridge>,
    events: EventQueue,
    generation: u64,
    destroyed: bool,
}

impl BrowserHandle {
    pub fn new(factory: Box<dyn BrowserFactory>, flow: SharedFlow, options: ContentOptions) -> Self {
        let lifecycle = LifecycleBridge::new(flow.clone());
        Self {
            factory,
            backend: None,
            flow,
            options,
            bounds: Size::default(),
            lifecycle,
            detaching: None,
            events: Arc::default(),
            generation: 0,
            destroyed: false,
        }
    }

    /// Attach to `url`, or detach the current content when `url` is `None`.
    ///
    /// Attaching always creates a fresh content instance with a fresh
    /// lifecycle; any previous instance is detached first without waiting.
    pub fn load(&mut self, url: Option<&str>) -> Result<(), BridgeError> {
        if self.destroyed {
            return Err(BridgeError::UseAfterDestroy("load"));
        }
        match url {
            Some(url) => self.attach(url),
            None => {
                self.generation += 1;
                self.detach_current();
                Ok(())
            }
        }
    }

    fn attach(&mut self, url: &str) -> Result<(), BridgeError> {
        self.detach_current();
        self.generation += 1;
        self.detaching = None;
        self.lifecycle = LifecycleBridge::new(self.flow.clone());
        // Anything still queued belongs to an older generation.
        events::drain(&self.events);

        let request = AttachRequest {
            url: url.to_string(),
            generation: self.generation,
            flow: self.flow.get(),
            options: self.options,
            bounds: self.bounds,
            sink: EventSink::new(Arc::clone(&self.events), self.generation),
        };

        match self.factory.attach(request) {
            Ok(backend) => {
                info!(generation = self.generation, url, "content attached");
                self.backend = Some(backend);
                Ok(())
            }
            Err(e) => {
                warn!(generation = self.generation, url, error = %e, "content attach failed");
                Err(e)
            }
        }
    }

    fn detach_current(&mut self) {
        let Some(backend) = self.backend.take() else {
            return;
        };
        debug!(url = backend.url(), generation = self.generation, "detaching content");
        self.lifecycle.begin_termination();
        self.detaching = Some(self.lifecycle.clone());
        backend.detach(DetachNotifier::new(self.lifecycle.clone()));
    }

    /// Replace the flow mirror. Takes effect in the content on the next attach.
    pub fn set_flow(&self, content: impl Into<String>) {
        if self.destroyed {
            debug!("set_flow on destroyed handle ignored");
            return;
        }
        self.flow.set(content);
    }

    pub fn get_flow(&self) -> String {
        self.flow.get()
    }

    /// Block until the most recent `load(None)` finished tearing down, or
    /// until `timeout` elapses. A timeout is not an error.
    pub fn wait_detached(&self, timeout: Duration) -> DetachWait {
        match &self.detaching {
            Some(lifecycle) => lifecycle.wait_for_termination(timeout),
            None => DetachWait::Idle,
        }
    }

    /// Barrier for the most recent detach, for waiting from another thread.
    pub fn detach_barrier(&self) -> Option<LifecycleBridge> {
        self.detaching.clone()
    }

    /// Send a message to the attached content. A no-op when detached.
    pub fn post(&self, kind: &str, payload: &serde_json::Value) -> Result<(), BridgeError> {
        if self.destroyed {
            return Err(BridgeError::UseAfterDestroy("post"));
        }
        match &self.backend {
            Some(backend) => backend.post(kind, payload),
            None => {
                debug!(kind, "no content attached, message dropped");
                Ok(())
            }
        }
    }

    /// Resize the native view; remembered for future attachments.
    pub fn set_bounds(&mut self, bounds: Size) {
        self.bounds = bounds;
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.set_bounds(bounds) {
                warn!(error = %e, %bounds, "failed to resize content");
            }
        }
    }

    /// Options used for the next attach.
    pub fn set_options(&mut self, options: ContentOptions) {
        self.options = options;
    }

    pub fn options(&self) -> ContentOptions {
        self.options
    }

    /// Drain content events for the current attachment.
    pub fn poll(&mut self) -> Vec<ContentSignal> {
        let mut signals = Vec::new();
        for event in events::drain(&self.events) {
            if event.generation != self.generation {
                debug!(
                    stale = event.generation,
                    current = self.generation,
                    "dropping event from previous content"
                );
                continue;
            }
            match event.kind {
                BrowserEventKind::PageLoad { state, url } => {
                    debug!(?state, url = %url, "page load");
                    if state == PageLoadState::Finished {
                        signals.push(ContentSignal::PageLoaded { url });
                    }
                }
                BrowserEventKind::NavigationBlocked { url } => {
                    warn!(url = %url, "content navigation blocked");
                }
                BrowserEventKind::Ipc { body } => {
                    if let Some(signal) = self.handle_ipc(&body) {
                        signals.push(signal);
                    }
                }
            }
        }
        signals
    }

    fn handle_ipc(&self, body: &str) -> Option<ContentSignal> {
        let Some(msg) = IpcMessage::from_json(body) else {
            warn!(body_len = body.len(), "IPC message rejected: failed to parse");
            return None;
        };
        if !is_ipc_kind_allowed(&msg.kind) {
            warn!(kind = %msg.kind, "IPC message rejected: unknown kind");
            return None;
        }
        let Some(decoded) = ContentMessage::decode(&msg) else {
            warn!(kind = %msg.kind, "IPC message rejected: malformed payload");
            return None;
        };

        match decoded {
            ContentMessage::Scorm(call) => {
                let answer = self.lifecycle.call(&call);
                debug!(?call, answer = %answer, "scorm call");
                match call {
                    ScormCall::Terminate => Some(ContentSignal::Terminated),
                    ScormCall::SetValue(key, value) if key == stream_common::FLOW_KEY => {
                        Some(ContentSignal::FlowEdited(value))
                    }
                    _ => None,
                }
            }
            ContentMessage::FlowChanged(content) => {
                self.flow.set(content.as_str());
                debug!(len = content.len(), "flow edited in content");
                Some(ContentSignal::FlowEdited(content))
            }
            ContentMessage::Measured(measurement) => Some(ContentSignal::Measured(measurement)),
            ContentMessage::Console { level, message } => {
                match level.as_str() {
                    "error" => error!(target: "stream_webview::console", "{message}"),
                    "warn" => warn!(target: "stream_webview::console", "{message}"),
                    _ => info!(target: "stream_webview::console", "{message}"),
                }
                None
            }
        }
    }

    pub fn lifecycle(&self) -> &LifecycleBridge {
        &self.lifecycle
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_attached(&self) -> bool {
        self.backend.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Release the native resource and terminate the session.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.generation += 1;
        self.detach_current();
        self.lifecycle.terminate();
        events::drain(&self.events);
        self.destroyed = true;
        debug!("browser handle destroyed");
    }
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}
