//! Cancellable per-session timers.
//!
//! Each timer is a tokio task that sleeps and then reports its expiry on the
//! session's timer channel. Aborting the task is not enough on its own: the
//! expiry may already be queued. Every arm therefore gets a fresh generation,
//! and the runner drops any expiry whose generation is no longer current.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use super::machine::TimerId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TimerFired {
    pub id: TimerId,
    pub generation: u64,
}

struct ArmedTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct TimerManager {
    timers: HashMap<TimerId, ArmedTimer>,
    next_generation: u64,
    fired_tx: mpsc::Sender<TimerFired>,
}

impl TimerManager {
    pub fn new(fired_tx: mpsc::Sender<TimerFired>) -> Self {
        Self {
            timers: HashMap::new(),
            next_generation: 0,
            fired_tx,
        }
    }

    /// Arm `id`, replacing any timer already running under that id.
    pub fn set_timer(&mut self, id: TimerId, duration: Duration) {
        self.cancel_timer(id);

        self.next_generation += 1;
        let generation = self.next_generation;
        let fired_tx = self.fired_tx.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            // The session may already be gone.
            let _ = fired_tx.send(TimerFired { id, generation }).await;
        });

        self.timers.insert(id, ArmedTimer { generation, handle });
        trace!(?id, ?duration, generation, "Timer set");
    }

    pub fn cancel_timer(&mut self, id: TimerId) {
        if let Some(timer) = self.timers.remove(&id) {
            timer.handle.abort();
            trace!(?id, generation = timer.generation, "Timer cancelled");
        }
    }

    pub fn cancel_all(&mut self) {
        for (id, timer) in self.timers.drain() {
            timer.handle.abort();
            trace!(?id, generation = timer.generation, "Timer cancelled");
        }
    }

    /// Accept an expiry only if it belongs to the currently armed timer.
    /// An accepted expiry disarms the timer.
    pub fn take_fired(&mut self, fired: TimerFired) -> bool {
        match self.timers.get(&fired.id) {
            Some(timer) if timer.generation == fired.generation => {
                self.timers.remove(&fired.id);
                true
            }
            _ => {
                trace!(id = ?fired.id, generation = fired.generation, "Stale timer expiry dropped");
                false
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires() {
        let (fired_tx, mut fired_rx) = mpsc::channel(10);
        let mut manager = TimerManager::new(fired_tx);

        manager.set_timer(TimerId::Pair, Duration::from_millis(10));

        let fired = fired_rx.recv().await.unwrap();
        assert_eq!(fired.id, TimerId::Pair);
        assert!(manager.take_fired(fired));
        assert_eq!(manager.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_cancel() {
        let (fired_tx, mut fired_rx) = mpsc::channel(10);
        let mut manager = TimerManager::new(fired_tx);

        manager.set_timer(TimerId::KeepAliveDelay, Duration::from_millis(50));
        manager.cancel_timer(TimerId::KeepAliveDelay);

        let result = tokio::time::timeout(Duration::from_millis(100), fired_rx.recv()).await;
        assert!(result.is_err(), "Timer should have been cancelled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replaced_timer_expiry_is_stale() {
        let (fired_tx, mut fired_rx) = mpsc::channel(10);
        let mut manager = TimerManager::new(fired_tx);

        manager.set_timer(TimerId::KeepAliveResponse, Duration::from_millis(10));
        let first = fired_rx.recv().await.unwrap();

        // Re-armed before the first expiry was consumed.
        manager.set_timer(TimerId::KeepAliveResponse, Duration::from_millis(10));
        assert!(!manager.take_fired(first));

        let second = fired_rx.recv().await.unwrap();
        assert!(manager.take_fired(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let (fired_tx, mut fired_rx) = mpsc::channel(10);
        let mut manager = TimerManager::new(fired_tx);

        manager.set_timer(TimerId::Pair, Duration::from_millis(50));
        manager.set_timer(TimerId::KeepAliveDelay, Duration::from_millis(50));
        assert_eq!(manager.active_count(), 2);

        manager.cancel_all();
        assert_eq!(manager.active_count(), 0);

        let result = tokio::time::timeout(Duration::from_millis(100), fired_rx.recv()).await;
        assert!(result.is_err());
    }
}
