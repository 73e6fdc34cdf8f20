//! Wall-clock access for the room engine.
//!
//! Mutating FSM code (`MtvRoomState::apply`, `MpeRoomState::apply`) never
//! calls `SystemTime::now()` directly: the runner reads the clock once per
//! side-effecting transition and passes the reading in as a plain value.
//! That single read-and-pass is the side-effect envelope described in
//! §5 — recording a non-deterministic value once so replaying the
//! same event sequence against the same recorded values is deterministic.
//! Query handlers are the one place allowed to read the clock directly,
//! since a query is never replayed.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// A source of wall-clock time, swappable so tests can control it.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> SystemTime;
}

/// The production clock: a thin wrapper over `SystemTime::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock tests can advance by hand, so timer- and elapsed-time-sensitive
/// scenarios (S2, S3, S6 in §8) don't need real sleeps.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone)]
pub struct VirtualClock {
    inner: Arc<Mutex<SystemTime>>,
}

#[cfg(any(test, feature = "test-util"))]
impl VirtualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            inner: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.inner.lock().expect("virtual clock lock poisoned");
        *guard += by;
    }

    pub fn set(&self, at: SystemTime) {
        *self.inner.lock().expect("virtual clock lock poisoned") = at;
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Default for VirtualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for VirtualClock {
    fn now(&self) -> SystemTime {
        *self.inner.lock().expect("virtual clock lock poisoned")
    }
}
