use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard},
    time::Duration,
};

/// Counts remote deliveries that have been handed off but not finished yet.
#[derive(Debug, Default)]
pub struct DeliveryTracker {
    in_flight: Mutex<usize>,
    drained: Condvar,
}

impl DeliveryTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one delivery. The count drops again when the guard is dropped,
    /// whichever way the delivery ends.
    pub fn track(self: &Arc<Self>) -> InFlight {
        *self.count() += 1;
        InFlight {
            tracker: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.count()
    }

    /// Blocks until every tracked delivery has finished.
    pub fn wait(&self) {
        let count = self.count();
        let _count = self
            .drained
            .wait_while(count, |n| *n > 0)
            .unwrap_or_else(|e| e.into_inner());
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`. Returns whether the tracker drained.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let count = self.count();
        let (count, _) = self
            .drained
            .wait_timeout_while(count, timeout, |n| *n > 0)
            .unwrap_or_else(|e| e.into_inner());
        *count == 0
    }

    fn count(&self) -> MutexGuard<'_, usize> {
        // The counter stays consistent even if a holder panicked.
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn release(&self) {
        let mut count = self.count();
        *count -= 1;
        if *count == 0 {
            self.drained.notify_all();
        }
    }
}

/// Guard for a single in-flight delivery.
#[derive(Debug)]
pub struct InFlight {
    tracker: Arc<DeliveryTracker>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.tracker.release();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use super::*;

    #[test]
    fn wait_returns_immediately_when_idle() {
        let tracker = DeliveryTracker::new();
        tracker.wait();
        assert!(tracker.wait_timeout(Duration::ZERO));
    }

    #[test]
    fn guards_count_up_and_down() {
        let tracker = DeliveryTracker::new();
        let a = tracker.track();
        let b = tracker.track();
        assert_eq!(tracker.in_flight(), 2);

        drop(a);
        assert_eq!(tracker.in_flight(), 1);
        drop(b);
        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn wait_blocks_until_last_guard_drops() {
        let tracker = DeliveryTracker::new();
        let guards: Vec<_> = (0..8).map(|_| tracker.track()).collect();

        let workers: Vec<_> = guards
            .into_iter()
            .enumerate()
            .map(|(i, guard)| {
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(5 * i as u64));
                    drop(guard);
                })
            })
            .collect();

        tracker.wait();
        assert_eq!(tracker.in_flight(), 0);

        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn guard_released_when_holder_panics() {
        let tracker = DeliveryTracker::new();
        let guard = tracker.track();

        let result = thread::spawn(move || {
            let _guard = guard;
            panic!("delivery blew up");
        })
        .join();

        assert!(result.is_err());
        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn wait_timeout_gives_up() {
        let tracker = DeliveryTracker::new();
        let _stuck = tracker.track();

        let started = Instant::now();
        assert!(!tracker.wait_timeout(Duration::from_millis(50)));
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(tracker.in_flight(), 1);
    }
}
