use log::{debug, info};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use uuid::Uuid;

use crate::configuration::types::WorkerSettings;
use crate::container_management::engine::ContainerEngine;
use crate::session_management::admission::admit;
use crate::session_management::capabilities::Capabilities;
use crate::session_management::session::Session;
use crate::video_recording::artifacts::ArtifactLabels;
use crate::video_recording::recorder::VideoRecorder;
use crate::video_recording::types::RecordingState;

use super::state::{TeardownReason, WorkerState};

/// A disposable worker bound to one running container, serving one session.
///
/// `Worker` is a cheap handle; clones share the same state. The request path
/// (admission, command hooks) and the idle watchdog both operate on it, and
/// whichever of them ends the session triggers the single teardown of the
/// backing container.
///
/// # Fields Overview
///
/// - `container_id`: the container registered by the starter, fixed for life
/// - `capabilities`: browser/platform combinations this container can serve
/// - `settings`: idle timeout default, poll interval, stop timeout
/// - `engine`: container engine client used for recording and teardown
/// - `recorder`: recording orchestrator following session boundaries
/// - `state`: the mutable block shared with the watchdog
/// - `stopped`: flips to `true` once the container stop call has returned
#[derive(Clone)]
pub struct Worker {
    pub(crate) inner: Arc<WorkerInner>,
}

pub(crate) struct WorkerInner {
    pub container_id: String,
    pub capabilities: Vec<Capabilities>,
    pub settings: WorkerSettings,
    pub engine: Arc<dyn ContainerEngine>,
    pub recorder: VideoRecorder,
    pub state: Mutex<WorkerState>,
    pub stopped: watch::Sender<bool>,
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Worker")
            .field("container_id", &self.inner.container_id)
            .field("busy", &state.current_session.is_some())
            .field("down", &state.down)
            .field("tests_executed", &state.tests_executed)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of a worker for consoles and the routing layer.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub container_id: String,
    pub busy: bool,
    pub down: bool,
    pub tests_executed: u32,
    pub session_limit_reached: bool,
    pub max_idle_secs: u64,
    pub session_id: Option<Uuid>,
    pub test_name: Option<String>,
    pub test_group: Option<String>,
    pub recording_enabled: bool,
    pub recording_state: RecordingState,
    pub teardown_reason: Option<TeardownReason>,
}

impl Worker {
    pub fn new(
        container_id: &str,
        capabilities: Vec<Capabilities>,
        settings: WorkerSettings,
        engine: Arc<dyn ContainerEngine>,
        recorder: VideoRecorder,
    ) -> Self {
        let state = WorkerState::new(std::time::Duration::from_secs(
            settings.default_idle_timeout_secs,
        ));
        let (stopped, _) = watch::channel(false);
        info!(
            "[{}] Worker registered with {} capability set(s)",
            container_id,
            capabilities.len()
        );
        Self {
            inner: Arc::new(WorkerInner {
                container_id: container_id.to_string(),
                capabilities,
                settings,
                engine,
                recorder,
                state: Mutex::new(state),
                stopped,
            }),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, WorkerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Binds a new session if this worker can still take one.
    ///
    /// Returns `None` when the worker is down, has already served its session,
    /// or cannot satisfy the requested browser and platform. Refusal is
    /// expected: the router tries another worker.
    pub fn request_session(&self, requested: Capabilities) -> Option<Session> {
        let (session, record_video) = {
            let mut state = self.lock();
            let terms = match admit(
                &self.inner.capabilities,
                &requested,
                state.session_limit_reached,
                state.down,
                self.inner.settings.default_idle_timeout_secs,
            ) {
                Ok(terms) => terms,
                Err(refusal) => {
                    debug!(
                        "[{}] Session request refused: {}",
                        self.inner.container_id, refusal
                    );
                    return None;
                }
            };

            let session = Session::new(requested);
            state.session_limit_reached = true;
            state.tests_executed += 1;
            state.max_idle = terms.max_idle;
            state.test_name = terms.test_name;
            state.test_group = terms.test_group;
            state.current_session = Some(session.clone());
            state.touch();
            (session, terms.record_video)
        };

        self.inner.recorder.configure_session(
            record_video,
            ArtifactLabels {
                session_id: session.id,
                test_name: session.name(),
                browser: session
                    .requested_capabilities
                    .browser_name()
                    .map(str::to_string),
            },
        );
        info!(
            "[{}] Session {} admitted (name: {:?}, group: {:?}, idle timeout: {}s)",
            self.inner.container_id,
            session.id,
            session.name(),
            session.group(),
            self.max_idle_seconds()
        );
        Some(session)
    }

    /// Router notification that the session slot was released.
    ///
    /// Unbinds the session without tearing down; the watchdog reclaims the
    /// spent worker on its next tick.
    pub fn after_session(&self, session: &Session) {
        let mut state = self.lock();
        state.touch();
        if state
            .current_session
            .as_ref()
            .map(|current| current.id == session.id)
            .unwrap_or(false)
        {
            state.current_session = None;
            info!(
                "[{}] Session {} released",
                self.inner.container_id, session.id
            );
        }
    }

    pub fn container_id(&self) -> &str {
        &self.inner.container_id
    }

    pub fn capabilities(&self) -> &[Capabilities] {
        &self.inner.capabilities
    }

    pub fn is_busy(&self) -> bool {
        self.lock().current_session.is_some()
    }

    pub fn is_down(&self) -> bool {
        self.lock().down
    }

    pub fn current_session(&self) -> Option<Session> {
        self.lock().current_session.clone()
    }

    pub fn amount_of_executed_tests(&self) -> u32 {
        self.lock().tests_executed
    }

    pub fn is_session_limit_reached(&self) -> bool {
        self.lock().session_limit_reached
    }

    pub fn max_idle_seconds(&self) -> u64 {
        self.lock().max_idle.as_secs()
    }

    pub fn test_name(&self) -> Option<String> {
        self.lock().test_name.clone()
    }

    pub fn test_group(&self) -> Option<String> {
        self.lock().test_group.clone()
    }

    pub fn teardown_reason(&self) -> Option<TeardownReason> {
        self.lock().teardown_reason
    }

    pub fn recorder(&self) -> &VideoRecorder {
        &self.inner.recorder
    }

    pub fn recording_state(&self) -> RecordingState {
        self.inner.recorder.recording_state()
    }

    pub fn status(&self) -> WorkerStatus {
        let state = self.lock();
        WorkerStatus {
            container_id: self.inner.container_id.clone(),
            busy: state.current_session.is_some(),
            down: state.down,
            tests_executed: state.tests_executed,
            session_limit_reached: state.session_limit_reached,
            max_idle_secs: state.max_idle.as_secs(),
            session_id: state.current_session.as_ref().map(|s| s.id),
            test_name: state.test_name.clone(),
            test_group: state.test_group.clone(),
            recording_enabled: self.inner.recorder.is_enabled(),
            recording_state: self.inner.recorder.recording_state(),
            teardown_reason: state.teardown_reason,
        }
    }

    /// Resolves once the backing container stop call has returned.
    pub async fn wait_until_stopped(&self) {
        let mut stopped = self.inner.stopped.subscribe();
        // The sender lives as long as `self`, so this only ends on `true`.
        let _ = stopped.wait_for(|stopped| *stopped).await;
    }
}
