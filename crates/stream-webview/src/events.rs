//! Events produced by an attached browser backend.
//!
//! Backends run their callbacks on the UI thread and push events into a
//! shared sink; the owning `BrowserHandle` drains the sink and drops any
//! event whose generation is not the current attachment.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// State of a page load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLoadState {
    /// Navigation has started.
    Started,
    /// Page has fully loaded (DOMContentLoaded + resources).
    Finished,
}

impl From<wry::PageLoadEvent> for PageLoadState {
    fn from(e: wry::PageLoadEvent) -> Self {
        match e {
            wry::PageLoadEvent::Started => Self::Started,
            wry::PageLoadEvent::Finished => Self::Finished,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEventKind {
    /// Page load state changed. Carries the URL.
    PageLoad { state: PageLoadState, url: String },
    /// Raw IPC body posted by the content.
    Ipc { body: String },
    /// A navigation was blocked by the allowlist.
    NavigationBlocked { url: String },
}

/// An event tagged with the attachment generation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserEvent {
    pub generation: u64,
    pub kind: BrowserEventKind,
}

pub(crate) type EventQueue = Arc<Mutex<Vec<BrowserEvent>>>;

/// Write side of the event queue, bound to one attachment generation.
///
/// Cloned into every callback a backend installs for that attachment.
#[derive(Debug, Clone)]
pub struct EventSink {
    queue: EventQueue,
    generation: u64,
}

impl EventSink {
    pub(crate) fn new(queue: EventQueue, generation: u64) -> Self {
        Self { queue, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn push(&self, kind: BrowserEventKind) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.push(BrowserEvent {
            generation: self.generation,
            kind,
        });
    }

    /// Convenience for backends forwarding an IPC body.
    pub fn push_ipc(&self, body: impl Into<String>) {
        self.push(BrowserEventKind::Ipc { body: body.into() });
    }
}

pub(crate) fn drain(queue: &EventQueue) -> Vec<BrowserEvent> {
    let mut events = queue.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::take(&mut *events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_tags_events_with_generation() {
        let queue: EventQueue = Arc::default();
        let sink = EventSink::new(Arc::clone(&queue), 7);
        sink.push_ipc("{}");
        sink.push(BrowserEventKind::PageLoad {
            state: PageLoadState::Finished,
            url: "about:blank".into(),
        });

        let events = drain(&queue);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.generation == 7));
        assert!(drain(&queue).is_empty());
    }

    #[test]
    fn page_load_state_from_wry() {
        assert_eq!(
            PageLoadState::from(wry::PageLoadEvent::Started),
            PageLoadState::Started
        );
        assert_eq!(
            PageLoadState::from(wry::PageLoadEvent::Finished),
            PageLoadState::Finished
        );
    }
}
