//! Graceful shutdown: persist state, destroy the session, drop the window.

use crate::launch;

use super::core::StreamHost;

// =============================================================================
// SHUTDOWN
// =============================================================================

impl StreamHost {
    /// Perform graceful shutdown.
    ///
    /// Order matters:
    /// 1. Save the flow (launch data, optional export) while the mirror is current
    /// 2. Destroy the session (detaches the web view)
    /// 3. Drop the window
    pub(super) fn shutdown(&mut self) {
        tracing::info!("Initiating graceful shutdown");

        if let Some(mut session) = self.session.take() {
            // Pick up edits that arrived since the last poll.
            session.pump();

            if let Err(e) = launch::write_state(&self.paths.launch_data, &session.state()) {
                tracing::error!(error = %e, "Failed to save session state");
            }
            if let Some(path) = &self.paths.export_flow {
                if let Err(e) = session.export_flow(path) {
                    tracing::warn!(path = %path.display(), error = %e, "Flow export failed");
                }
            }
            session.destroy();
        }

        self.host_events = None;
        self.window = None;
        self.should_exit = true;

        tracing::info!("Graceful shutdown complete");
    }
}

// =============================================================================
// TESTS
// =============================================================================
