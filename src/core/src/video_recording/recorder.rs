//! Recording orchestration for the single session of a worker.
//!
//! `VideoRecorder` follows the session boundaries reported by the command
//! interceptor: a start marker begins capturing the display inside the
//! container, a stop marker finalizes the capture and pulls the recording
//! onto the host.
//!
//! Every action is recorded in the history, whether or not recording is
//! enabled; only enabled recorders reach the container. Transitions are
//! decided under a short lock, engine calls run after it is released.
//!
//! Actions reach the engine one at a time and in arrival order, so a stop
//! never overlaps a start that is still running. Every engine call is bounded
//! by the configured command timeout; failures and timeouts are logged and
//! swallowed so they never hold up teardown.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::configuration::types::RecordingConfig;
use crate::container_management::engine::ContainerEngine;
use crate::error_handling::types::{ContainerError, RecordingError};

use super::artifacts::{ArtifactCollector, ArtifactLabels};
use super::types::{ContainerAction, RecordingState};

pub struct VideoRecorder {
    container_id: String,
    engine: Arc<dyn ContainerEngine>,
    collector: Arc<ArtifactCollector>,
    start_command: Vec<String>,
    stop_command: Vec<String>,
    command_timeout: Duration,
    /// Held across the engine work of one action.
    engine_turn: tokio::sync::Mutex<()>,
    /// Process-wide switch, read once when the worker is built.
    globally_enabled: bool,
    inner: Mutex<RecorderState>,
}

struct RecorderState {
    state: RecordingState,
    session_enabled: bool,
    labels: Option<ArtifactLabels>,
    history: Vec<ContainerAction>,
    container_actions: Vec<ContainerAction>,
    artifacts: Vec<PathBuf>,
}

impl VideoRecorder {
    pub fn new(
        container_id: &str,
        engine: Arc<dyn ContainerEngine>,
        collector: Arc<ArtifactCollector>,
        config: &RecordingConfig,
        globally_enabled: bool,
    ) -> Self {
        debug!(
            "[{}] VideoRecorder created (globally enabled: {})",
            container_id, globally_enabled
        );
        Self {
            container_id: container_id.to_string(),
            engine,
            collector,
            start_command: config.start_command.clone(),
            stop_command: config.stop_command.clone(),
            command_timeout: config.command_timeout(),
            engine_turn: tokio::sync::Mutex::new(()),
            globally_enabled,
            inner: Mutex::new(RecorderState {
                state: RecordingState::NotStarted,
                session_enabled: true,
                labels: None,
                history: Vec::new(),
                container_actions: Vec::new(),
                artifacts: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        // The state stays consistent even if a holder panicked mid-update.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies the session's `recordVideo` choice and artifact labels.
    pub fn configure_session(&self, record_video: bool, labels: ArtifactLabels) {
        let mut inner = self.lock();
        inner.session_enabled = record_video;
        inner.labels = Some(labels);
        if !record_video {
            info!("[{}] Recording disabled by session capability", self.container_id);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.globally_enabled && self.lock().session_enabled
    }

    pub fn is_globally_enabled(&self) -> bool {
        self.globally_enabled
    }

    pub fn recording_state(&self) -> RecordingState {
        self.lock().state
    }

    /// Every action received, in order, including those that were no-ops.
    pub fn history(&self) -> Vec<ContainerAction> {
        self.lock().history.clone()
    }

    /// Actions that reached the container.
    pub fn container_actions(&self) -> Vec<ContainerAction> {
        self.lock().container_actions.clone()
    }

    /// Host paths of retrieved recordings.
    pub fn artifacts(&self) -> Vec<PathBuf> {
        self.lock().artifacts.clone()
    }

    /// Entry point for session-boundary actions.
    pub async fn video_recording(&self, action: ContainerAction) {
        // Taken before the transition so engine work follows transition order.
        let _turn = self.engine_turn.lock().await;
        let run = {
            let mut inner = self.lock();
            inner.history.push(action);
            let enabled = self.globally_enabled && inner.session_enabled;
            let next = match (action, inner.state) {
                (_, _) if !enabled => None,
                (ContainerAction::StartRecording, RecordingState::NotStarted) => {
                    Some(RecordingState::Recording)
                }
                (ContainerAction::StopRecording, RecordingState::Recording) => {
                    Some(RecordingState::Stopped)
                }
                (ContainerAction::StopRecording, RecordingState::NotStarted) => {
                    // Nothing to finalize; closing the state keeps a late start from recording.
                    inner.state = RecordingState::Stopped;
                    None
                }
                _ => None,
            };
            if let Some(next) = next {
                inner.state = next;
                inner.container_actions.push(action);
            }
            debug!(
                "[{}] {} received (enabled: {}, state: {:?})",
                self.container_id, action, enabled, inner.state
            );
            next.is_some()
        };

        if !run {
            return;
        }

        if let Err(e) = self.process_container_action(action).await {
            error!("[{}] {} failed: {}", self.container_id, action, e);
        }
        if action == ContainerAction::StopRecording {
            self.copy_videos().await;
        }
    }

    /// Runs the in-container command for `action`.
    async fn process_container_action(
        &self,
        action: ContainerAction,
    ) -> Result<(), RecordingError> {
        let command = match action {
            ContainerAction::StartRecording => &self.start_command,
            ContainerAction::StopRecording => &self.stop_command,
        };
        info!("[{}] {}: running {:?}", self.container_id, action, command);
        let output = tokio::time::timeout(
            self.command_timeout,
            self.engine.exec(&self.container_id, command),
        )
        .await
        .map_err(|_| {
            ContainerError::Timeout(format!(
                "{:?} did not finish within {:?}",
                command, self.command_timeout
            ))
        })??;
        if !output.success() {
            return Err(RecordingError::ContainerError(ContainerError::ExecFailed(
                format!(
                    "{:?} exited with {:?}: {}",
                    command,
                    output.exit_code,
                    output.stderr.trim()
                ),
            )));
        }
        debug!(
            "[{}] {} output: {}",
            self.container_id,
            action,
            output.stdout.trim()
        );
        Ok(())
    }

    async fn copy_videos(&self) {
        let labels = self.lock().labels.clone().unwrap_or_else(|| ArtifactLabels {
            session_id: uuid::Uuid::nil(),
            test_name: None,
            browser: None,
        });
        let retrieval = tokio::time::timeout(
            self.command_timeout,
            self.collector
                .retrieve(self.engine.as_ref(), &self.container_id, &labels),
        )
        .await;
        match retrieval {
            Ok(Ok(paths)) => self.lock().artifacts.extend(paths),
            Ok(Err(e)) => warn!(
                "[{}] Could not retrieve recording: {}",
                self.container_id, e
            ),
            Err(_) => warn!(
                "[{}] Recording retrieval abandoned after {:?}",
                self.container_id, self.command_timeout
            ),
        }
    }
}
