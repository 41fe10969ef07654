//! The serialized diagram edited inside the embedded content.

use std::sync::{Arc, PoisonError, RwLock};

/// Key under which the flow is stored in host state maps and exposed
/// through the SCORM-like accessor surface.
pub const FLOW_KEY: &str = "flowchart";

/// Serialized flow content. Treated as opaque text (JSON by convention).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowDocument {
    content: String,
}

impl FlowDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the whole document. Content is always swapped in one piece.
    pub fn replace(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A `FlowDocument` shared between the browser handle, the lifecycle
/// bridge and the session for the duration of a session.
#[derive(Debug, Clone, Default)]
pub struct SharedFlow {
    inner: Arc<RwLock<FlowDocument>>,
}

impl SharedFlow {
    pub fn new(doc: FlowDocument) -> Self {
        Self {
            inner: Arc::new(RwLock::new(doc)),
        }
    }

    /// Snapshot of the current content.
    pub fn get(&self) -> String {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .content()
            .to_string()
    }

    pub fn set(&self, content: impl Into<String>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(content);
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .content()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
