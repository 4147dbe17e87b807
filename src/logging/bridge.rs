use std::{borrow::Cow, sync::Arc};

use eyre::Context;
use log::{LevelFilter, Log};

use super::{caller::Caller, default, Logger, Severity};

/// Routes records from the `log` facade into a [`Logger`].
///
/// `log` has no fatal level, so bridged records never terminate the process.
pub struct LogBridge {
    logger: Option<Arc<Logger>>,
}

impl LogBridge {
    /// Follows whichever logger is the process default at the time of each record.
    pub fn new() -> Self {
        Self { logger: None }
    }

    pub fn with_logger(logger: Arc<Logger>) -> Self {
        Self {
            logger: Some(logger),
        }
    }

    pub fn init(self, filter: LevelFilter) -> eyre::Result<()> {
        log::set_max_level(filter);
        log::set_boxed_logger(Box::new(self)).context("Failed registering boxed logger")?;

        Ok(())
    }

    fn caller(record: &log::Record) -> Caller {
        let file: Cow<'static, str> = match (record.file_static(), record.file()) {
            (Some(file), _) => Cow::Borrowed(file),
            (None, Some(file)) => Cow::Owned(file.to_string()),
            (None, None) => Cow::Owned(record.target().to_string()),
        };
        Caller::new(file, record.line().unwrap_or(0))
    }
}

impl Default for LogBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for LogBridge {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let logger = self.logger.clone().unwrap_or_else(default::logger);
        // Libraries may keep logging during shutdown; drop those records instead of panicking.
        logger.try_output(
            Severity::from(record.level()),
            &Self::caller(record),
            &record.args().to_string(),
        );
    }

    fn flush(&self) {}
}
