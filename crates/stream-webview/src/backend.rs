//! Capability traits between `BrowserHandle` and the native web view.
//!
//! The handle never reaches for a global browser provider: a
//! `BrowserFactory` is injected at construction and asked for a fresh
//! `BrowserBackend` on every attach.

use serde::{Deserialize, Serialize};
use stream_common::{BridgeError, Size};

use crate::events::EventSink;
use crate::lifecycle::LifecycleBridge;

/// Presentation flags handed to the content on attach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentOptions {
    #[serde(rename = "readonly")]
    pub read_only: bool,
    #[serde(rename = "noTitle")]
    pub hide_title: bool,
}

/// Everything a backend needs to attach one content instance.
#[derive(Debug, Clone)]
pub struct AttachRequest {
    pub url: String,
    pub generation: u64,
    /// Snapshot of the flow at attach time, exposed to the page before it runs.
    pub flow: String,
    pub options: ContentOptions,
    pub bounds: Size,
    /// Sink for every callback installed for this attachment.
    pub sink: EventSink,
}

/// Completion signal for an asynchronous detach.
///
/// The backend calls `notify` once its native resources are released;
/// that wakes anyone blocked on the lifecycle barrier.
#[derive(Debug, Clone)]
pub struct DetachNotifier {
    lifecycle: LifecycleBridge,
}

impl DetachNotifier {
    pub(crate) fn new(lifecycle: LifecycleBridge) -> Self {
        Self { lifecycle }
    }

    pub fn notify(self) {
        self.lifecycle.terminate();
    }
}

/// One attached content instance.
pub trait BrowserBackend {
    /// URL this instance was attached to.
    fn url(&self) -> &str;

    /// Dispatch a message into the content's handler table.
    fn post(&self, kind: &str, payload: &serde_json::Value) -> Result<(), BridgeError>;

    /// Resize the native view to the host container.
    fn set_bounds(&self, _bounds: Size) -> Result<(), BridgeError> {
        Ok(())
    }

    /// Begin releasing native resources. `done` must be notified when the
    /// release has completed, from whatever thread finishes it.
    fn detach(self: Box<Self>, done: DetachNotifier);
}

/// Creates backends. Injected into `BrowserHandle`.
pub trait BrowserFactory {
    fn attach(&mut self, request: AttachRequest) -> Result<Box<dyn BrowserBackend>, BridgeError>;
}
