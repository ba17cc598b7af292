//! Single-execution shutdown of the backing container.
//!
//! Teardown is split in two: [`Worker::claim_teardown`] flips the `down`
//! flag under the state lock and decides who performs the shutdown, and
//! [`Worker::finish_teardown`] does the slow engine work without the lock.
//! Only the caller that won the claim ever reaches the engine.

use log::{debug, error, info};

use crate::video_recording::types::ContainerAction;

use super::node::Worker;
use super::state::TeardownReason;

impl Worker {
    /// Tears the worker down. Returns `false` if another path already did.
    pub async fn teardown(&self, reason: TeardownReason) -> bool {
        if !self.claim_teardown(reason) {
            return false;
        }
        self.finish_teardown().await;
        true
    }

    /// Marks the worker down and unbinds its session. Only the first caller wins.
    pub(crate) fn claim_teardown(&self, reason: TeardownReason) -> bool {
        let mut state = self.lock();
        if state.down {
            debug!(
                "[{}] Teardown ({:?}) skipped, already down ({:?})",
                self.inner.container_id, reason, state.teardown_reason
            );
            return false;
        }
        state.down = true;
        state.current_session = None;
        state.teardown_reason = Some(reason);
        info!(
            "[{}] Tearing down worker after {} test(s): {:?}",
            self.inner.container_id, state.tests_executed, reason
        );
        true
    }

    /// Finalizes recording and stops the container. Engine failures are
    /// logged; the worker stays down either way.
    pub(crate) async fn finish_teardown(&self) {
        self.inner
            .recorder
            .video_recording(ContainerAction::StopRecording)
            .await;

        let timeout = self.inner.settings.stop_timeout();
        match self
            .inner
            .engine
            .stop_container(&self.inner.container_id, timeout)
            .await
        {
            Ok(()) => info!("[{}] Container stopped", self.inner.container_id),
            Err(e) => error!(
                "[{}] Failed to stop container, leaving it to the engine's cleanup policy: {}",
                self.inner.container_id, e
            ),
        }

        self.inner.stopped.send_replace(true);
    }
}
