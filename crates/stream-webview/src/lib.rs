//! Browser bridge for hosting the flow widget in a native web view.
//!
//! Provides:
//! - `BrowserHandle`, the owner of one content instance at a time
//! - A lifecycle barrier for asynchronous detach
//! - Bidirectional IPC (Rust <-> JavaScript) with a SCORM-style shim
//! - A `wry` backend, plus an in-memory fake for tests
//! - Custom protocol for serving widget assets from disk

pub mod backend;
pub mod content;
pub mod events;
pub mod handle;
pub mod ipc;
pub mod lifecycle;
pub mod testing;
pub mod wry_backend;

pub use backend::{AttachRequest, BrowserBackend, BrowserFactory, ContentOptions, DetachNotifier};
pub use content::ContentProvider;
pub use events::{BrowserEvent, BrowserEventKind, EventSink, PageLoadState};
pub use handle::{BrowserHandle, ContentSignal};
pub use ipc::{ContentMessage, IpcMessage, IpcPayload, ScormCall};
pub use lifecycle::{LifecycleBridge, DEFAULT_DETACH_TIMEOUT};
pub use wry_backend::{NavigationAllowlist, WryBrowserFactory, WryOptions};
