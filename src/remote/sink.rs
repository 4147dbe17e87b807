use std::{io, sync::Arc};

use super::{event::Event, hub::RemoteHub};
use crate::logging::{LogSink, Severity};

/// Forwards records of one severity to the remote backend.
///
/// Without an explicit hub the sink follows the process-wide connection: until
/// [`connect`](super::connect) succeeds every write is a no-op.
pub struct RemoteSink {
    level: Severity,
    logger: String,
    hub: Option<Arc<RemoteHub>>,
    name: String,
}

impl RemoteSink {
    pub fn new(level: Severity, logger: impl Into<String>) -> Self {
        Self {
            level,
            logger: logger.into(),
            hub: None,
            name: format!("remote {}", level),
        }
    }

    pub fn with_hub(level: Severity, logger: impl Into<String>, hub: Arc<RemoteHub>) -> Self {
        Self {
            hub: Some(hub),
            ..Self::new(level, logger)
        }
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    fn hub(&self) -> Option<&RemoteHub> {
        self.hub.as_deref().or_else(|| super::hub().map(Arc::as_ref))
    }
}

impl LogSink for RemoteSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &[u8]) -> io::Result<()> {
        let Some(hub) = self.hub() else {
            return Ok(());
        };

        let message = String::from_utf8_lossy(record);
        hub.capture(Event::new(
            self.level,
            self.logger.as_str(),
            message.trim_end_matches('\n'),
        ));

        if self.level == Severity::Fatal {
            hub.flush(hub.flush_timeout());
        }

        Ok(())
    }

    fn close(&self) -> io::Result<()> {
        if let Some(hub) = self.hub() {
            hub.flush(hub.flush_timeout());
        }
        Ok(())
    }
}
