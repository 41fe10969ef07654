use serde::{Deserialize, Serialize};
use std::fmt;

/// Outer size of the host container, in logical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A size with a zero dimension is a transient layout artifact.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Intrinsic size of the rendered content (e.g. the native SVG size).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionLifecycleState {
    #[default]
    Uninitialized,
    Active,
    Terminating,
    Terminated,
}

impl SessionLifecycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// Outcome of a bounded wait on the lifecycle barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachWait {
    /// Teardown completed within the bound.
    Detached,
    /// The bound elapsed first. Callers proceed anyway.
    TimedOut,
    /// Nothing was being torn down.
    Idle,
}
