//! Controller shared between the tailing reader and the UI.
//!
//! The UI (or any other thread) requests restarts, toggles auto-restart and
//! asks the reader to shut down; the reader checks these once per loop
//! iteration and waits on the controller while polling for new data, so a
//! request wakes it immediately instead of after the next poll interval.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Handle to the state shared with a running [`Tailer`](crate::tail::Tailer).
#[derive(Clone, Default)]
pub struct TailController {
    inner: Arc<TailCtrlShared>,
}

#[derive(Default)]
struct TailCtrlShared {
    state: Mutex<TailCtrlInner>,
    wakeup: Condvar,
}

#[derive(Default)]
struct TailCtrlInner {
    restart_requested: bool,
    auto_restart: bool,
    shutdown: bool,
    /// Source length seen at the previous truncation check of this session.
    last_len: u64,
}

impl TailController {
    /// Create a fresh controller. `auto_restart` enables restart on truncation.
    pub fn new(auto_restart: bool) -> Self {
        let ctrl = Self::default();
        ctrl.lock().auto_restart = auto_restart;
        ctrl
    }

    fn lock(&self) -> MutexGuard<'_, TailCtrlInner> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the reader to start over from the beginning of the source.
    /// Requests made while one is already pending have no further effect.
    pub fn request_restart(&self) {
        self.lock().restart_requested = true;
        self.inner.wakeup.notify_all();
    }

    pub fn restart_pending(&self) -> bool {
        self.lock().restart_requested
    }

    pub fn auto_restart(&self) -> bool {
        self.lock().auto_restart
    }

    pub fn set_auto_restart(&self, enabled: bool) {
        self.lock().auto_restart = enabled;
    }

    /// Stop the reader at its next loop iteration.
    pub fn shutdown(&self) {
        self.lock().shutdown = true;
        self.inner.wakeup.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }

    // ── Reader side ──────────────────────────────────────────────────────────

    /// Consume a pending restart request.
    pub fn take_restart(&self) -> bool {
        std::mem::take(&mut self.lock().restart_requested)
    }

    /// Record the current source length. If it shrank since the previous call
    /// and auto-restart is on, a restart is requested and `true` is returned.
    pub fn observe_len(&self, len: u64) -> bool {
        let mut inner = self.lock();
        let shrank = len < inner.last_len;
        inner.last_len = len;
        if shrank && inner.auto_restart {
            inner.restart_requested = true;
            return true;
        }
        false
    }

    /// Forget the last observed length (new session).
    pub fn reset_len(&self) {
        self.lock().last_len = 0;
    }

    /// Block for up to `timeout`, returning early on a restart request or shutdown.
    pub fn wait(&self, timeout: Duration) {
        let inner = self.lock();
        if inner.restart_requested || inner.shutdown {
            return;
        }
        let _ = self
            .inner
            .wakeup
            .wait_timeout_while(inner, timeout, |s| !s.restart_requested && !s.shutdown)
            .unwrap_or_else(PoisonError::into_inner);
    }
}
