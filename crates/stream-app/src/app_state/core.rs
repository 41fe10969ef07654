//! StreamHost struct definition and constructor.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::window::Window;

use stream_common::HostEventReceiver;
use stream_config::StreamConfig;
use stream_session::StreamSession;

/// How often content events are drained when nothing else wakes the loop.
pub(super) const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Files the host reads at start-up and writes on close.
#[derive(Debug, Clone)]
pub struct HostPaths {
    pub launch_data: PathBuf,
    pub import_flow: Option<PathBuf>,
    pub export_flow: Option<PathBuf>,
}

/// Top-level application state.
pub struct StreamHost {
    pub(super) config: StreamConfig,
    pub(super) paths: HostPaths,

    // Windowing
    pub(super) window: Option<Arc<Window>>,

    // Widget session and its outgoing events
    pub(super) session: Option<StreamSession>,
    pub(super) host_events: Option<HostEventReceiver>,

    pub(super) last_poll: Instant,
    pub(super) should_exit: bool,
}

impl StreamHost {
    pub fn new(config: StreamConfig, paths: HostPaths) -> Self {
        Self {
            config,
            paths,
            window: None,
            session: None,
            host_events: None,
            last_poll: Instant::now(),
            should_exit: false,
        }
    }
}
