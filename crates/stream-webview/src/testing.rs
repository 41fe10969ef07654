//! In-memory browser backend for tests and headless hosts.
//!
//! `FakeBrowser` records every attach, message and detach, and lets the
//! caller play the content side by pushing IPC bodies into the most
//! recent attachment's sink.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use stream_common::{BridgeError, Size};

use crate::backend::{AttachRequest, BrowserBackend, BrowserFactory, DetachNotifier};
use crate::events::{BrowserEventKind, EventSink, PageLoadState};

/// How a fake backend completes `detach`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachMode {
    /// Release synchronously inside `detach`.
    Immediate,
    /// Release on another thread after the delay.
    Delayed(Duration),
    /// Never confirm the release.
    Never,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub generation: u64,
    pub kind: String,
    pub payload: Value,
}

#[derive(Debug)]
struct FakeState {
    mode: DetachMode,
    fail_next_attach: bool,
    attaches: Vec<AttachRequest>,
    posts: Vec<PostedMessage>,
    bounds: Vec<Size>,
    detached: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new(mode: DetachMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                mode,
                fail_next_attach: false,
                attaches: Vec::new(),
                posts: Vec::new(),
                bounds: Vec::new(),
                detached: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A factory producing backends that report into this recorder.
    pub fn factory(&self) -> Box<dyn BrowserFactory> {
        Box::new(FakeFactory {
            browser: self.clone(),
        })
    }

    pub fn set_detach_mode(&self, mode: DetachMode) {
        self.lock().mode = mode;
    }

    pub fn fail_next_attach(&self) {
        self.lock().fail_next_attach = true;
    }

    pub fn attaches(&self) -> Vec<AttachRequest> {
        self.lock().attaches.clone()
    }

    pub fn posts(&self) -> Vec<PostedMessage> {
        self.lock().posts.clone()
    }

    pub fn bounds(&self) -> Vec<Size> {
        self.lock().bounds.clone()
    }

    /// Generations whose native resources have been released.
    pub fn detached(&self) -> Vec<u64> {
        self.lock().detached.clone()
    }

    /// Sink of the most recent attachment.
    pub fn last_sink(&self) -> Option<EventSink> {
        self.lock().attaches.last().map(|a| a.sink.clone())
    }

    /// Post an IPC message from the most recent content instance.
    pub fn content_sends(&self, kind: &str, payload: Value) {
        if let Some(sink) = self.last_sink() {
            let body = serde_json::json!({ "kind": kind, "payload": payload }).to_string();
            sink.push_ipc(body);
        }
    }

    /// Report the most recent content instance as fully loaded.
    pub fn content_loaded(&self) {
        let Some(request) = self.lock().attaches.last().cloned() else {
            return;
        };
        request.sink.push(BrowserEventKind::PageLoad {
            state: PageLoadState::Finished,
            url: request.url,
        });
    }
}

struct FakeFactory {
    browser: FakeBrowser,
}

impl BrowserFactory for FakeFactory {
    fn attach(&mut self, request: AttachRequest) -> Result<Box<dyn BrowserBackend>, BridgeError> {
        let mut state = self.browser.lock();
        if std::mem::take(&mut state.fail_next_attach) {
            return Err(BridgeError::Backend("attach refused".into()));
        }
        let backend = FakeBackend {
            browser: self.browser.clone(),
            url: request.url.clone(),
            generation: request.generation,
        };
        state.attaches.push(request);
        Ok(Box::new(backend))
    }
}

struct FakeBackend {
    browser: FakeBrowser,
    url: String,
    generation: u64,
}

impl BrowserBackend for FakeBackend {
    fn url(&self) -> &str {
        &self.url
    }

    fn post(&self, kind: &str, payload: &Value) -> Result<(), BridgeError> {
        self.browser.lock().posts.push(PostedMessage {
            generation: self.generation,
            kind: kind.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }

    fn set_bounds(&self, bounds: Size) -> Result<(), BridgeError> {
        self.browser.lock().bounds.push(bounds);
        Ok(())
    }

    fn detach(self: Box<Self>, done: DetachNotifier) {
        let mode = self.browser.lock().mode;
        match mode {
            DetachMode::Immediate => {
                self.browser.lock().detached.push(self.generation);
                done.notify();
            }
            DetachMode::Delayed(delay) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    self.browser.lock().detached.push(self.generation);
                    done.notify();
                });
            }
            DetachMode::Never => {}
        }
    }
}
