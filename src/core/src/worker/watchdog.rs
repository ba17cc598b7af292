//! Idle watchdog: the backstop that reclaims workers whose client went silent.

use log::{debug, warn};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::node::Worker;
use super::state::TeardownReason;

enum PollOutcome {
    Alive,
    Down,
    Expired(TeardownReason),
}

impl Worker {
    /// Starts the recurring idle check. Only the first call spawns a task;
    /// later calls, or calls on a worker already down, return `None`.
    ///
    /// The task ends on its own once it observes the worker down or tears it
    /// down itself.
    pub fn start_polling(&self) -> Option<JoinHandle<()>> {
        {
            let mut state = self.lock();
            if state.polling || state.down {
                return None;
            }
            state.polling = true;
        }
        let worker = self.clone();
        let period = self.inner.settings.poll_interval();
        debug!(
            "[{}] Starting idle watchdog every {:?}",
            self.inner.container_id, period
        );
        Some(tokio::spawn(async move { worker.poll(period).await }))
    }

    async fn poll(self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.check_idle() {
                PollOutcome::Alive => continue,
                PollOutcome::Down => break,
                PollOutcome::Expired(reason) => {
                    warn!(
                        "[{}] Worker expired ({:?}) after {}s idle limit",
                        self.inner.container_id,
                        reason,
                        self.max_idle_seconds()
                    );
                    self.teardown(reason).await;
                    break;
                }
            }
        }
        debug!("[{}] Idle watchdog exiting", self.inner.container_id);
    }

    fn check_idle(&self) -> PollOutcome {
        let state = self.lock();
        if state.down {
            return PollOutcome::Down;
        }
        match state.expiry(Instant::now()) {
            Some(reason) => PollOutcome::Expired(reason),
            None => PollOutcome::Alive,
        }
    }
}
