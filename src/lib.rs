//! Severity-routed logging to local streams and a remote error-reporting backend.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! let file = sevlog::FileSink::open("/var/log/app.log").unwrap();
//! sevlog::init("app", true, Some(Arc::new(file)));
//! if let Err(err) = sevlog::connect("https://key@errors.example.com/42") {
//!     sevlog::error!("remote reporting disabled: {}", err);
//! }
//!
//! sevlog::info("started");
//! sevlog::close();
//! ```

pub mod error;
pub mod https;
pub mod logging;
pub mod remote;

pub use error::{CloseError, ConnectError};
pub use logging::default::{
    close, error, error_depth, errorf, errorln, fatal, fatal_depth, fatalf, fatalln, info,
    info_depth, infof, infoln, init, logger, rinfo, rinfof, set_flags, warning, warning_depth,
    warningf, warningln,
};
pub use logging::{
    BufferSink, Builder, Caller, FileSink, Flags, LogBridge, LogSink, Logger, Severity,
    StderrSink, StdoutSink, WriterSink,
};
pub use remote::{connect, connect_with, RemoteHub, RemoteSink};
