mod bridge;
mod caller;
pub(crate) mod default;
mod formatters;
mod logger;
mod macros;
mod severity;
mod sinks;

use std::io;

pub use bridge::LogBridge;
pub use caller::Caller;
pub use formatters::{Flags, RecordFormatter};
pub use logger::{Builder, Logger};
pub use severity::Severity;
pub use sinks::{BufferSink, FileSink, StderrSink, StdoutSink, WriterSink};

/// A destination for formatted records.
pub trait LogSink: Sync + Send {
    /// Shown in diagnostics when closing fails.
    fn name(&self) -> &str;

    fn write(&self, record: &[u8]) -> io::Result<()>;

    /// Flushes and releases the sink. Called once, when the owning logger closes.
    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}
