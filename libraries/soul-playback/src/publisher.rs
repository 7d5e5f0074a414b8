//! Observable playback state
//!
//! Holds the latest [`PlaybackSnapshot`] in a `tokio::sync::watch` channel.
//! The command worker is the only writer; UIs and other consumers hold
//! [`StateObserver`]s. Observers always see whole snapshots written at
//! command boundaries, never an intermediate step of a command.

use crate::error::{PlaybackError, Result};
use crate::types::{Condition, PlaybackSnapshot, PlaybackState};
use tokio::sync::watch;

/// Writer side of the snapshot channel
#[derive(Debug)]
pub struct StatePublisher {
    tx: watch::Sender<PlaybackSnapshot>,
}

impl StatePublisher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PlaybackSnapshot {
            state: PlaybackState::Unavailable,
            enabled: true,
            condition: Condition::Active,
        });
        Self { tx }
    }

    pub fn subscribe(&self) -> StateObserver {
        StateObserver {
            rx: self.tx.subscribe(),
        }
    }

    pub fn current(&self) -> PlaybackSnapshot {
        self.tx.borrow().clone()
    }

    /// Mark a command as in flight
    pub fn disable(&self) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.enabled {
                snapshot.enabled = false;
                true
            } else {
                false
            }
        });
    }

    /// Publish a state while a command is still running
    pub fn publish_in_flight(&self, state: PlaybackState) {
        self.tx.send_modify(|snapshot| {
            snapshot.state = state;
            snapshot.enabled = false;
        });
    }

    /// Publish the committed result of a command and re-enable controls
    pub fn publish(&self, state: PlaybackState, condition: Condition) {
        self.tx.send_replace(PlaybackSnapshot {
            state,
            enabled: true,
            condition,
        });
    }

    /// Replace the state without touching `enabled` (used by ticks)
    pub fn publish_quiet(&self, state: PlaybackState) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.state == state {
                false
            } else {
                snapshot.state = state;
                true
            }
        });
    }
}

impl Default for StatePublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the playback snapshot
#[derive(Debug, Clone)]
pub struct StateObserver {
    rx: watch::Receiver<PlaybackSnapshot>,
}

impl StateObserver {
    /// Latest snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next published snapshot
    ///
    /// # Errors
    /// `Released` once the controller has shut down and no more values will
    /// be published
    pub async fn changed(&mut self) -> Result<PlaybackSnapshot> {
        self.rx
            .changed()
            .await
            .map_err(|_| PlaybackError::Released)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Wait until a snapshot satisfies `predicate` (checks the current one first)
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&PlaybackSnapshot) -> bool,
    ) -> Result<PlaybackSnapshot> {
        self.rx
            .wait_for(predicate)
            .await
            .map(|snapshot| snapshot.clone())
            .map_err(|_| PlaybackError::Released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unavailable_and_enabled() {
        let publisher = StatePublisher::new();
        let snapshot = publisher.current();
        assert_eq!(snapshot.state, PlaybackState::Unavailable);
        assert!(snapshot.enabled);
        assert!(snapshot.condition.is_active());
    }

    #[tokio::test]
    async fn observers_see_disable_then_publish() {
        let publisher = StatePublisher::new();
        let mut observer = publisher.subscribe();

        publisher.disable();
        let in_flight = observer.changed().await.unwrap();
        assert!(!in_flight.enabled);

        publisher.publish(PlaybackState::Loading, Condition::Active);
        let done = observer.changed().await.unwrap();
        assert!(done.enabled);
        assert_eq!(done.state, PlaybackState::Loading);
    }

    #[tokio::test]
    async fn repeated_disable_does_not_notify() {
        let publisher = StatePublisher::new();
        let mut observer = publisher.subscribe();

        publisher.disable();
        observer.changed().await.unwrap();
        publisher.disable();

        assert!(!observer.rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn dropping_publisher_ends_observation() {
        let publisher = StatePublisher::new();
        let mut observer = publisher.subscribe();
        drop(publisher);

        assert!(matches!(
            observer.changed().await,
            Err(PlaybackError::Released)
        ));
        // Last value stays readable
        assert!(observer.snapshot().enabled);
    }
}
