use std::{sync::Arc, time::Duration};

use tokio::runtime::Runtime;

use super::{
    event::Event,
    tracker::{DeliveryTracker, InFlight},
    Transport,
};
use crate::error::ConnectError;

/// Upper bound for flushing on fatal records and on close.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// A connected remote backend: transport, delivery runtime and in-flight tracker.
pub struct RemoteHub {
    transport: Arc<dyn Transport>,
    tracker: Arc<DeliveryTracker>,
    runtime: Option<Runtime>,
    flush_timeout: Duration,
}

impl std::fmt::Debug for RemoteHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteHub")
            .field("tracker", &self.tracker)
            .field("flush_timeout", &self.flush_timeout)
            .finish_non_exhaustive()
    }
}

impl RemoteHub {
    pub fn new(transport: Arc<dyn Transport>) -> Result<Self, ConnectError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("sevlog-remote")
            .enable_all()
            .build()
            .map_err(ConnectError::Runtime)?;

        Ok(Self {
            transport,
            tracker: DeliveryTracker::new(),
            runtime: Some(runtime),
            flush_timeout: FLUSH_TIMEOUT,
        })
    }

    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    pub fn flush_timeout(&self) -> Duration {
        self.flush_timeout
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.in_flight()
    }

    /// Hands `event` to a background delivery task and returns immediately.
    pub fn capture(&self, event: Event) {
        let guard = self.tracker.track();
        if let Some(runtime) = &self.runtime {
            runtime.spawn(deliver(Arc::clone(&self.transport), event, guard));
        }
    }

    /// Blocks until all deliveries handed off so far have finished.
    pub fn wait(&self) {
        self.tracker.wait();
    }

    /// Waits at most `timeout` for in-flight deliveries. Returns whether everything finished.
    pub fn flush(&self, timeout: Duration) -> bool {
        let drained = self.tracker.wait_timeout(timeout);
        if !drained {
            tracing::debug!(
                target: "sevlog",
                in_flight = self.tracker.in_flight(),
                "remote flush timed out after {:?}",
                timeout
            );
        }
        drained
    }
}

async fn deliver(transport: Arc<dyn Transport>, event: Event, _guard: InFlight) {
    let id = event.id;
    let level = event.level;
    if let Err(err) = transport.send(event).await {
        tracing::debug!(target: "sevlog", event_id = %id, %level, "remote delivery failed: {:#}", err);
    }
}

impl Drop for RemoteHub {
    fn drop(&mut self) {
        // Unfinished tasks are dropped with their guards; never blocks, even inside async code.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
