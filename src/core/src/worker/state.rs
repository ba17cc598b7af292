//! The state block shared by the request path and the idle watchdog.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

use crate::session_management::session::Session;

/// Why a worker was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeardownReason {
    /// The client deleted its session.
    SessionStopped,
    /// No intercepted command within the idle timeout.
    IdleTimeout,
    /// The router released the session without a stop command.
    SessionReleased,
    /// Requested by the embedding process.
    Shutdown,
}

#[derive(Debug)]
pub(crate) struct WorkerState {
    pub tests_executed: u32,
    pub session_limit_reached: bool,
    pub current_session: Option<Session>,
    pub max_idle: Duration,
    pub test_name: Option<String>,
    pub test_group: Option<String>,
    pub registered_at: Instant,
    pub last_activity: Instant,
    pub start_marker_seen: bool,
    pub polling: bool,
    pub down: bool,
    pub teardown_reason: Option<TeardownReason>,
}

impl WorkerState {
    pub fn new(max_idle: Duration) -> Self {
        let now = Instant::now();
        Self {
            tests_executed: 0,
            session_limit_reached: false,
            current_session: None,
            max_idle,
            test_name: None,
            test_group: None,
            registered_at: now,
            last_activity: now,
            start_marker_seen: false,
            polling: false,
            down: false,
            teardown_reason: None,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Returns the reason the worker should be reclaimed at `now`, if any.
    pub fn expiry(&self, now: Instant) -> Option<TeardownReason> {
        if self.down {
            return None;
        }
        match self.current_session {
            Some(_) if now.duration_since(self.last_activity) > self.max_idle => {
                Some(TeardownReason::IdleTimeout)
            }
            Some(_) => None,
            // Used up and released: nothing left to serve.
            None if self.session_limit_reached => Some(TeardownReason::SessionReleased),
            None if now.duration_since(self.registered_at) > self.max_idle => {
                Some(TeardownReason::IdleTimeout)
            }
            None => None,
        }
    }
}
