//! Process-wide call context
//!
//! A call started on one screen stays observable and controllable from
//! every other screen: the context mirrors the in-call flag, the connected
//! flag, and the ticking duration for as long as a call is in progress.
//! Constructed once at startup, torn down with the process.

pub mod indicator;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::warn;

pub use indicator::{FloatingIndicator, IndicatorView};

#[derive(Debug, Default)]
struct ContextState {
    in_call: bool,
    connected: bool,
    duration_secs: u64,
}

/// Point-in-time view of the shared call context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallContextSnapshot {
    pub is_in_call: bool,
    pub is_connected: bool,
    pub duration_secs: u64,
}

/// Shared call-state handle
///
/// Mutated only by the session controller and the explicit
/// `start_call`/`end_call` actions. Invariant: `is_connected` implies
/// `is_in_call`.
#[derive(Clone, Default)]
pub struct CallContext {
    inner: Arc<RwLock<ContextState>>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContextState> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ContextState> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Mark a call as started. Does not imply connected.
    pub fn start_call(&self) {
        self.write().in_call = true;
    }

    /// Reset the whole context in one step
    pub fn end_call(&self) {
        let mut state = self.write();
        state.in_call = false;
        state.connected = false;
        state.duration_secs = 0;
    }

    /// Mirror the session's connected flag.
    ///
    /// Calling this outside a call is a controller logic error; the write
    /// is dropped so a stale caller cannot resurrect an ended call.
    pub fn set_connected(&self, connected: bool) {
        let mut state = self.write();
        if !state.in_call {
            warn!("set_connected({}) outside a call, ignoring", connected);
            return;
        }
        state.connected = connected;
    }

    /// Mirror the session's duration counter. Dropped outside a call.
    pub fn set_duration(&self, duration_secs: u64) {
        let mut state = self.write();
        if !state.in_call {
            warn!("set_duration({}) outside a call, ignoring", duration_secs);
            return;
        }
        state.duration_secs = duration_secs;
    }

    pub fn is_in_call(&self) -> bool {
        self.read().in_call
    }

    pub fn is_connected(&self) -> bool {
        self.read().connected
    }

    pub fn duration_secs(&self) -> u64 {
        self.read().duration_secs
    }

    pub fn snapshot(&self) -> CallContextSnapshot {
        let state = self.read();
        CallContextSnapshot {
            is_in_call: state.in_call,
            is_connected: state.connected,
            duration_secs: state.duration_secs,
        }
    }
}
