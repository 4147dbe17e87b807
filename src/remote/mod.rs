//! Asynchronous delivery of log records to a remote error-reporting backend.

mod dsn;
mod event;
mod hub;
mod sentry;
mod sink;
mod tracker;

use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use futures_util::future::BoxFuture;

pub use dsn::Dsn;
pub use event::Event;
pub use hub::{RemoteHub, FLUSH_TIMEOUT};
pub use sentry::SentryTransport;
pub use sink::RemoteSink;
pub use tracker::{DeliveryTracker, InFlight};

#[cfg(test)]
pub(crate) use hub::testing;

use crate::error::ConnectError;

/// Delivers one event to the backend. Runs on the hub's delivery runtime.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, event: Event) -> BoxFuture<'static, eyre::Result<()>>;
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub request_timeout: Duration,
    pub flush_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            flush_timeout: FLUSH_TIMEOUT,
        }
    }
}

static HUB: OnceLock<Arc<RemoteHub>> = OnceLock::new();

/// Connects the process-wide remote backend. Only the first successful call takes effect.
pub fn connect(dsn: &str) -> Result<(), ConnectError> {
    connect_with_config(dsn, RemoteConfig::default())
}

pub fn connect_with_config(dsn: &str, config: RemoteConfig) -> Result<(), ConnectError> {
    if is_connected() {
        return Err(ConnectError::AlreadyConnected);
    }

    let dsn: Dsn = dsn.parse()?;
    let transport = SentryTransport::new(&dsn, config.request_timeout)?;
    let hub = RemoteHub::new(Arc::new(transport))?.with_flush_timeout(config.flush_timeout);
    install(hub)?;

    tracing::debug!(target: "sevlog", %dsn, "remote backend connected");
    Ok(())
}

/// Connects the process-wide remote backend through a custom transport.
pub fn connect_with(transport: Arc<dyn Transport>) -> Result<Arc<RemoteHub>, ConnectError> {
    if is_connected() {
        return Err(ConnectError::AlreadyConnected);
    }

    install(RemoteHub::new(transport)?)
}

fn install(hub: RemoteHub) -> Result<Arc<RemoteHub>, ConnectError> {
    let hub = Arc::new(hub);
    HUB.set(Arc::clone(&hub))
        .map_err(|_| ConnectError::AlreadyConnected)?;
    Ok(hub)
}

pub fn hub() -> Option<&'static Arc<RemoteHub>> {
    HUB.get()
}

pub fn is_connected() -> bool {
    HUB.get().is_some()
}

/// Blocks until every remote delivery handed off so far has finished.
pub fn wait() {
    if let Some(hub) = hub() {
        hub.wait();
    }
}

/// Bounded [`wait`]. Returns whether all deliveries finished in time.
pub fn flush(timeout: Duration) -> bool {
    hub().map_or(true, |hub| hub.flush(timeout))
}
