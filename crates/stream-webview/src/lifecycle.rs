//! Session lifecycle and the SCORM-style accessor surface.
//!
//! A `LifecycleBridge` lives exactly as long as one browser attachment.
//! `terminate()` may be called from any thread; it wakes every context
//! blocked in `wait_for_termination`.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use stream_common::{BridgeError, DetachWait, SessionLifecycleState, SharedFlow, FLOW_KEY};
use tracing::{debug, warn};

use crate::ipc::ScormCall;

/// Default ceiling for the lifecycle barrier.
pub const DEFAULT_DETACH_TIMEOUT: Duration = Duration::from_millis(1000);

const SCORM_TRUE: &str = "true";
const SCORM_NO_ERROR_CODE: &str = "0";
const SCORM_NO_ERROR: &str = "No Error";

#[derive(Debug, Clone)]
pub struct LifecycleBridge {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<SessionLifecycleState>,
    changed: Condvar,
    flow: SharedFlow,
}

impl LifecycleBridge {
    pub fn new(flow: SharedFlow) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionLifecycleState::Uninitialized),
                changed: Condvar::new(),
                flow,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionLifecycleState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SessionLifecycleState {
        *self.lock()
    }

    /// Uninitialized -> Active. Idempotent while Active.
    pub fn initialize(&self) -> Result<(), BridgeError> {
        let mut state = self.lock();
        match *state {
            SessionLifecycleState::Uninitialized => {
                *state = SessionLifecycleState::Active;
                debug!("session initialized");
                Ok(())
            }
            SessionLifecycleState::Active => Ok(()),
            SessionLifecycleState::Terminating | SessionLifecycleState::Terminated => {
                Err(BridgeError::AlreadyTerminated)
            }
        }
    }

    /// Mark a teardown as started without completing it.
    ///
    /// Returns `false` when the session had already terminated.
    pub fn begin_termination(&self) -> bool {
        let mut state = self.lock();
        match *state {
            SessionLifecycleState::Terminated => false,
            _ => {
                *state = SessionLifecycleState::Terminating;
                true
            }
        }
    }

    /// Move to Terminated and wake all waiters. No-op once terminated.
    pub fn terminate(&self) {
        let mut state = self.lock();
        let previous = *state;
        if previous == SessionLifecycleState::Terminated {
            return;
        }
        *state = SessionLifecycleState::Terminated;
        self.inner.changed.notify_all();
        debug!(?previous, "session terminated");
    }

    /// Block until the session is Terminated or `timeout` elapses.
    ///
    /// Only an Active or Terminating session is waited on; a session that
    /// never initialized returns `Idle` immediately.
    pub fn wait_for_termination(&self, timeout: Duration) -> DetachWait {
        let guard = self.lock();
        match *guard {
            SessionLifecycleState::Uninitialized => return DetachWait::Idle,
            SessionLifecycleState::Terminated => return DetachWait::Detached,
            SessionLifecycleState::Active | SessionLifecycleState::Terminating => {}
        }

        let start = Instant::now();
        let (guard, result) = self
            .inner
            .changed
            .wait_timeout_while(guard, timeout, |s| !s.is_terminal())
            .unwrap_or_else(PoisonError::into_inner);

        if guard.is_terminal() {
            debug!(elapsed_ms = start.elapsed().as_millis() as u64, "detach confirmed");
            DetachWait::Detached
        } else {
            debug_assert!(result.timed_out());
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "content did not confirm detach in time, proceeding"
            );
            DetachWait::TimedOut
        }
    }

    /// Read a value by key. Unknown keys yield an empty string.
    pub fn get_value(&self, key: &str) -> String {
        if key == FLOW_KEY {
            self.inner.flow.get()
        } else {
            String::new()
        }
    }

    /// Write a value by key. Unknown keys are ignored.
    pub fn set_value(&self, key: &str, value: &str) {
        if key == FLOW_KEY {
            self.inner.flow.set(value);
        } else {
            debug!(key, "ignoring SetValue for unknown key");
        }
    }

    /// Answer one call on the string surface. Every call succeeds.
    pub fn call(&self, call: &ScormCall) -> String {
        match call {
            ScormCall::Initialize => {
                if let Err(e) = self.initialize() {
                    warn!(error = %e, "Initialize after terminate");
                }
                SCORM_TRUE.to_string()
            }
            ScormCall::Terminate => {
                self.terminate();
                SCORM_TRUE.to_string()
            }
            ScormCall::Commit => SCORM_TRUE.to_string(),
            ScormCall::GetValue(key) => self.get_value(key),
            ScormCall::SetValue(key, value) => {
                self.set_value(key, value);
                SCORM_TRUE.to_string()
            }
            ScormCall::GetLastError => SCORM_NO_ERROR_CODE.to_string(),
            ScormCall::GetErrorString(_) | ScormCall::GetDiagnostic(_) => {
                SCORM_NO_ERROR.to_string()
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
