//! Zoom and height reconciliation between the host container and the
//! content's intrinsic size.
//!
//! The content is always drawn at its baseline width and scaled to the
//! host width with a CSS zoom. When auto height is on and the zoomed
//! content outgrows the baseline height, the host is asked once for the
//! new height. Heights at or below the baseline are never requested.

use stream_common::{BridgeError, ContentSize, Size};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportState {
    pub outer_width: u32,
    pub outer_height: u32,
    pub baseline_width: u32,
    pub baseline_height: u32,
    pub rendered_height: u32,
    pub zoom: f64,
}

impl ViewportState {
    fn zoom_for(&self, width: u32) -> f64 {
        if self.baseline_width == 0 {
            return self.zoom;
        }
        width as f64 / self.baseline_width as f64
    }

    /// Rendered height scaled to the current outer width, rounded up.
    pub fn zoomed_height(&self) -> u32 {
        if self.baseline_width == 0 {
            return self.rendered_height;
        }
        let scaled = self.rendered_height as u64 * self.outer_width as u64;
        let zoomed = scaled.div_ceil(self.baseline_width as u64);
        u32::try_from(zoomed).unwrap_or(u32::MAX)
    }
}

/// Per-session sizing parameters taken from the launch data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportParams {
    /// Fixed baseline width; otherwise the first measured width is used.
    pub explicit_width: Option<u32>,
    /// Ask the host for more height when the content grows.
    pub auto_height: bool,
}

/// What the caller has to apply after a reconciler update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportEffects {
    /// New zoom factor to push into the content.
    pub zoom: Option<f64>,
    /// Height to request from the host.
    pub resize_request: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ViewportReconciler {
    state: ViewportState,
    params: ViewportParams,
    baseline_captured: bool,
    last_requested: Option<u32>,
}

impl ViewportReconciler {
    pub fn new(outer: Size, params: ViewportParams) -> Self {
        let mut reconciler = Self {
            state: ViewportState::default(),
            params,
            baseline_captured: false,
            last_requested: None,
        };
        reconciler.begin_session(outer, params);
        reconciler
    }

    /// Reset for a newly loaded document. The host's current size becomes
    /// the baseline height and, unless configured, the provisional
    /// baseline width.
    pub fn begin_session(&mut self, outer: Size, params: ViewportParams) {
        let baseline_width = params.explicit_width.unwrap_or(outer.width);
        self.params = params;
        self.baseline_captured = params.explicit_width.is_some();
        self.last_requested = None;
        self.state = ViewportState {
            outer_width: outer.width,
            outer_height: outer.height,
            baseline_width,
            baseline_height: outer.height,
            rendered_height: outer.height,
            zoom: 1.0,
        };
        self.state.zoom = self.state.zoom_for(outer.width);
        debug!(
            %outer,
            baseline_width,
            auto_height = params.auto_height,
            "viewport session started"
        );
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn params(&self) -> ViewportParams {
        self.params
    }

    /// Host container changed size. Returns the new zoom when the event
    /// was accepted.
    pub fn on_host_resize(&mut self, outer: Size) -> Option<f64> {
        if outer.is_degenerate() {
            debug!(%outer, "ignoring degenerate host resize");
            return None;
        }
        if outer.width == self.state.outer_width && outer.height == self.state.outer_height {
            return None;
        }
        self.state.zoom = self.state.zoom_for(outer.width);
        self.state.outer_width = outer.width;
        self.state.outer_height = outer.height;
        debug!(%outer, zoom = self.state.zoom, "host resize accepted");
        Some(self.state.zoom)
    }

    /// The content re-rendered and reported its intrinsic size.
    pub fn on_content_measured(
        &mut self,
        measurement: Result<ContentSize, BridgeError>,
    ) -> ViewportEffects {
        let size = match measurement {
            Ok(size) => size,
            Err(e) => {
                debug!(error = %e, rendered_height = self.state.rendered_height, "keeping previous measurement");
                return ViewportEffects::default();
            }
        };

        let mut effects = ViewportEffects::default();

        if !self.baseline_captured {
            let width = size.width.trunc();
            if width >= 1.0 {
                self.state.baseline_width = width.min(u32::MAX as f64) as u32;
                self.baseline_captured = true;
                self.state.zoom = self.state.zoom_for(self.state.outer_width);
                debug!(baseline_width = self.state.baseline_width, zoom = self.state.zoom, "baseline width captured");
                effects.zoom = Some(self.state.zoom);
            }
        }

        self.state.rendered_height = size.height.ceil().min(u32::MAX as f64) as u32;

        if self.params.auto_height {
            effects.resize_request = self.check_height();
        }
        effects
    }

    fn check_height(&mut self) -> Option<u32> {
        let zoomed = self.state.zoomed_height();
        if zoomed <= self.state.baseline_height || zoomed == self.state.outer_height {
            return None;
        }
        if self.last_requested == Some(zoomed) {
            debug!(height = zoomed, "resize already requested");
            return None;
        }
        self.last_requested = Some(zoomed);
        info!(
            height = zoomed,
            rendered = self.state.rendered_height,
            outer_height = self.state.outer_height,
            "requesting host resize"
        );
        Some(zoomed)
    }
}

// =============================================================================
// TESTS
// =============================================================================
