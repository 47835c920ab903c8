//! Background eviction of expired tracking entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::limiter::WindowTracker;

/// Default interval between eviction sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Handle to the periodic sweep task.
///
/// The sweep bounds memory by evicting entries for identifiers that
/// stopped sending requests; admission correctness does not depend on it.
/// The task runs until [`Sweeper::stop`] is called.
pub struct Sweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn a sweep task over `tracker`, ticking every `period`.
    pub fn start(tracker: Arc<WindowTracker>, period: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; skip it so a fresh store
            // is not swept before it has seen any traffic.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = tracker.sweep();
                        if removed > 0 {
                            debug!(removed, "Evicted expired rate limit entries");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("Sweep task shutting down");
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Signal the sweep task to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{Identifier, Policy};

    #[tokio::test]
    async fn test_sweeper_evicts_expired_entries() {
        let tracker = Arc::new(WindowTracker::new());

        // 1 ms window: the entry expires almost immediately
        let policy = Policy::new(1, 1);
        tracker.check(&Identifier::from_user("s1"), &policy);
        assert_eq!(tracker.entry_count(), 1);

        let sweeper = Sweeper::start(tracker.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(tracker.entry_count(), 0);
        sweeper.stop().await;
    }

    #[tokio::test]
    async fn test_sweeper_keeps_live_entries() {
        let tracker = Arc::new(WindowTracker::new());

        tracker.check(&Identifier::from_user("s2"), &Policy::new(10, 60_000));

        let sweeper = Sweeper::start(tracker.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(tracker.entry_count(), 1);
        sweeper.stop().await;
    }

    #[tokio::test]
    async fn test_sweeper_stop_terminates_task() {
        let tracker = Arc::new(WindowTracker::new());
        let sweeper = Sweeper::start(tracker, DEFAULT_SWEEP_INTERVAL);

        // Returns promptly even though the first tick is minutes away
        sweeper.stop().await;
    }
}
