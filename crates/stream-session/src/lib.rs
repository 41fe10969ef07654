//! Host-facing session for the embedded flow widget.
//!
//! Ties a `BrowserHandle` to the host container: launch-data marshalling
//! (`StateSync`), zoom and height reconciliation (`ViewportReconciler`)
//! and the resize requests published on the `EventBus`.

pub mod session;
pub mod sync;
pub mod viewport;

pub use session::{SessionSettings, StreamSession};
pub use sync::{LaunchData, SessionConfig, StateSync, DEFAULT_FLOW};
pub use viewport::{ViewportEffects, ViewportParams, ViewportReconciler, ViewportState};
