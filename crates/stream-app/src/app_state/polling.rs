//! Content polling and host event handling.

use std::time::Instant;

use tokio::sync::broadcast::error::TryRecvError;
use winit::event_loop::{ActiveEventLoop, ControlFlow};

use stream_common::HostEvent;

use super::core::{StreamHost, POLL_INTERVAL};

impl StreamHost {
    /// Drain content signals and host events, then schedule the next wake-up.
    pub(super) fn poll_and_schedule(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();

        if now.duration_since(self.last_poll) >= POLL_INTERVAL {
            self.last_poll = now;
            if let Some(session) = &mut self.session {
                session.pump();
            }
            self.poll_host_events();
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL));
    }

    fn poll_host_events(&mut self) {
        let Some(rx) = &mut self.host_events else {
            return;
        };
        let mut pending = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => pending.push(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Host event receiver lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        for event in pending {
            self.apply_host_event(event);
        }
    }

    fn apply_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Resize { height } => {
                let Some(window) = &self.window else {
                    return;
                };
                let current = window.inner_size().to_logical::<f64>(window.scale_factor());
                tracing::info!(height, width = current.width, "Resizing window for content");
                // The Resized event that follows is forwarded to the session.
                let _ = window.request_inner_size(winit::dpi::LogicalSize::new(
                    current.width,
                    height as f64,
                ));
            }
        }
    }
}
