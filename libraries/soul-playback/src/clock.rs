//! Elapsed-time ticker
//!
//! Feeds `advance_elapsed` through the controller's command queue at a
//! fixed period. The clock holds only a weak handle, so it never keeps the
//! controller alive; it stops when dropped, when every controller handle is
//! gone, or once the controller is released.

use crate::controller::PlaybackController;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Periodic elapsed-time source for a controller
#[derive(Debug)]
pub struct ElapsedClock {
    task: JoinHandle<()>,
}

impl ElapsedClock {
    /// Start ticking every `period`
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime, and `period` must be
    /// non-zero.
    pub fn start(controller: &PlaybackController, period: Duration) -> Self {
        let weak = controller.downgrade();
        let delta_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                match controller.advance_elapsed(delta_ms).await {
                    Ok(_) => {}
                    Err(err) if err.is_terminal() => break,
                    Err(err) => debug!(error = %err, "Elapsed tick rejected"),
                }
            }
            debug!("Elapsed clock stopped");
        });

        Self { task }
    }

    /// Whether the ticker has stopped on its own
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for ElapsedClock {
    fn drop(&mut self) {
        self.task.abort();
    }
}
