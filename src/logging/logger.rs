use std::{
    fmt::{self, Display},
    panic::Location,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use chrono::Local;

use super::{
    caller::Caller,
    formatters::{Flags, RecordFormatter},
    sinks::{FileSink, StderrSink, StdoutSink},
    LogSink, Severity,
};
use crate::{
    error::CloseError,
    remote::{RemoteHub, RemoteSink},
};

/// Written in front of every record of the fallback logger.
pub(crate) const UNINITIALIZED: &str = "ERROR: Logging before Init.\n";

/// Serializes every local write in the process. Loggers may share writers, so the
/// lock is not per logger.
static OUTPUT_LOCK: Mutex<()> = Mutex::new(());

fn output_lock() -> MutexGuard<'static, ()> {
    OUTPUT_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

struct SeverityLog {
    formatter: RecordFormatter,
    local: Vec<Arc<dyn LogSink>>,
    remote: Vec<Arc<dyn LogSink>>,
}

/// Routes records to the sinks bound to their severity.
///
/// Multiple loggers can be used at the same time, even when they share writers.
/// Once [`close`](Logger::close) has run, any further write panics.
pub struct Logger {
    name: String,
    logs: [SeverityLog; 4],
    closers: Vec<Arc<dyn LogSink>>,
    initialized: bool,
    closed: AtomicBool,
}

macro_rules! severity_methods {
    ($severity:expr, $plain:ident, $depth:ident, $ln:ident, $f:ident) => {
        #[doc = concat!("Logs `msg` with the ", stringify!($plain), " severity.")]
        #[track_caller]
        pub fn $plain(&self, msg: impl Display) {
            self.output($severity, &Caller::here(), &msg.to_string());
        }

        #[doc = concat!("Acts as [`", stringify!($plain), "`](Self::", stringify!($plain), ") but attributes the record to the frame `depth` levels above the caller.")]
        #[track_caller]
        pub fn $depth(&self, depth: usize, msg: impl Display) {
            let caller = Caller::at_depth(Location::caller(), depth);
            self.output($severity, &caller, &msg.to_string());
        }

        /// Joins the values with single spaces and terminates the line.
        #[track_caller]
        pub fn $ln(&self, values: &[&dyn Display]) {
            self.output($severity, &Caller::here(), &join_line(values));
        }

        #[track_caller]
        pub fn $f(&self, args: fmt::Arguments<'_>) {
            self.output($severity, &Caller::here(), &fmt::format(args));
        }
    };
}

impl Logger {
    /// Stderr-only logger used until the first `init`.
    pub(crate) fn unconfigured() -> Self {
        Self::unconfigured_to(Arc::new(StderrSink::new()))
    }

    pub(crate) fn unconfigured_to(sink: Arc<dyn LogSink>) -> Self {
        Self {
            name: String::new(),
            logs: Severity::ALL.map(|severity| SeverityLog {
                formatter: RecordFormatter::new(
                    format!("{}{}", UNINITIALIZED, severity.tag()),
                    Flags::DEFAULT,
                ),
                local: vec![Arc::clone(&sink)],
                remote: Vec::new(),
            }),
            closers: Vec::new(),
            initialized: false,
            closed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn flags(&self, severity: Severity) -> Flags {
        self.logs[severity.index()].formatter.flags()
    }

    pub fn set_flags(&self, severity: Severity, flags: Flags) {
        self.logs[severity.index()].formatter.set_flags(flags);
    }

    /// Formats `text` and writes it to every sink bound to `severity`.
    ///
    /// Local sinks are written while holding the process-wide output lock; remote
    /// sinks only receive the record after the lock is released.
    ///
    /// # Panics
    ///
    /// If the logger has been closed.
    pub fn output(&self, severity: Severity, caller: &Caller, text: &str) {
        if !self.try_output(severity, caller, text) {
            panic!("logger {:?} used after close", self.name);
        }
    }

    /// Like [`output`](Self::output), but drops the record and returns `false` when the
    /// logger is closed. The check happens under the output lock, so it cannot race `close`.
    pub fn try_output(&self, severity: Severity, caller: &Caller, text: &str) -> bool {
        let log = &self.logs[severity.index()];

        let guard = output_lock();
        if self.is_closed() {
            return false;
        }

        let record = log.formatter.format(Local::now(), caller, text);
        for sink in &log.local {
            if let Err(err) = sink.write(&record) {
                tracing::debug!(target: "sevlog", sink = sink.name(), "local write failed: {}", err);
            }
        }
        drop(guard);

        for sink in &log.remote {
            // Remote sinks are best effort and report their own failures.
            let _ = sink.write(&record);
        }
        true
    }

    /// Closes every registered sink, which flushes cached records.
    ///
    /// Failures are printed to stderr and do not stop the remaining sinks from closing.
    /// Only the first call has an effect; a logger that was never initialized ignores it.
    pub fn close(&self) {
        for err in self.close_sinks() {
            eprintln!("{}", err);
        }
    }

    fn close_sinks(&self) -> Vec<CloseError> {
        let _guard = output_lock();
        if !self.initialized || self.closed.swap(true, Ordering::AcqRel) {
            return Vec::new();
        }

        self.closers
            .iter()
            .filter_map(|sink| {
                sink.close().err().map(|source| CloseError {
                    sink: sink.name().to_string(),
                    source,
                })
            })
            .collect()
    }

    /// Writes the fatal record and closes the logger without exiting.
    pub(crate) fn output_fatal(&self, caller: &Caller, text: &str) {
        self.output(Severity::Fatal, caller, text);
        self.close();
    }

    fn exit(&self, caller: &Caller, text: &str) -> ! {
        self.output_fatal(caller, text);
        std::process::exit(1)
    }

    severity_methods!(Severity::Info, info, info_depth, infoln, infof);
    severity_methods!(Severity::Warning, warning, warning_depth, warningln, warningf);
    severity_methods!(Severity::Error, error, error_depth, errorln, errorf);

    /// Logs with the fatal severity, closes the logger and exits the process with status 1.
    #[track_caller]
    pub fn fatal(&self, msg: impl Display) -> ! {
        self.exit(&Caller::here(), &msg.to_string())
    }

    #[track_caller]
    pub fn fatal_depth(&self, depth: usize, msg: impl Display) -> ! {
        let caller = Caller::at_depth(Location::caller(), depth);
        self.exit(&caller, &msg.to_string())
    }

    #[track_caller]
    pub fn fatalln(&self, values: &[&dyn Display]) -> ! {
        self.exit(&Caller::here(), &join_line(values))
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.exit(&Caller::here(), &fmt::format(args))
    }
}

pub(crate) fn join_line(values: &[&dyn Display]) -> String {
    let mut line = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    line.push('\n');
    line
}

enum Remote {
    Disabled,
    Global,
    Hub(Arc<RemoteHub>),
}

struct Attached {
    severity: Option<Severity>,
    sink: Arc<dyn LogSink>,
}

/// Assembles a [`Logger`].
///
/// By default every severity also feeds the process-wide remote backend, which stays
/// silent until [`connect`](crate::remote::connect) succeeds.
pub struct Builder {
    name: String,
    verbose: bool,
    flags: Flags,
    remote: Remote,
    sinks: Vec<Attached>,
    files: Vec<PathBuf>,
}

impl Builder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verbose: false,
            flags: Flags::DEFAULT,
            remote: Remote::Global,
            sinks: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Also write Info/Warning to stdout and Error/Fatal to stderr.
    pub fn verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    pub fn flags(self, flags: Flags) -> Self {
        Self { flags, ..self }
    }

    /// Attaches `sink` to all four severities. It is closed with the logger.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(Attached {
            severity: None,
            sink,
        });
        self
    }

    /// Attaches `sink` to a single severity. It is closed with the logger.
    pub fn with_severity_sink(mut self, severity: Severity, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(Attached {
            severity: Some(severity),
            sink,
        });
        self
    }

    /// Appends to the file at `path` for all severities; opened by [`build`](Self::build).
    pub fn with_file_sink(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn with_remote_hub(self, hub: Arc<RemoteHub>) -> Self {
        Self {
            remote: Remote::Hub(hub),
            ..self
        }
    }

    pub fn without_remote(self) -> Self {
        Self {
            remote: Remote::Disabled,
            ..self
        }
    }

    pub fn build(mut self) -> eyre::Result<Logger> {
        for path in std::mem::take(&mut self.files) {
            let sink = FileSink::open(path)?;
            self.sinks.push(Attached {
                severity: None,
                sink: Arc::new(sink),
            });
        }

        Ok(self.assemble())
    }

    /// Builds the logger and makes it the process-wide default unless another
    /// initialized logger got there first.
    pub fn init(self) -> eyre::Result<Arc<Logger>> {
        let logger = Arc::new(self.build()?);
        super::default::install(&logger);
        Ok(logger)
    }

    pub(super) fn assemble(self) -> Logger {
        let stdout: Arc<dyn LogSink> = Arc::new(StdoutSink::new());
        let stderr: Arc<dyn LogSink> = Arc::new(StderrSink::new());
        let mut closers: Vec<Arc<dyn LogSink>> = Vec::new();

        let logs = Severity::ALL.map(|severity| {
            let mut local: Vec<Arc<dyn LogSink>> = self
                .sinks
                .iter()
                .filter(|attached| attached.severity.map_or(true, |s| s == severity))
                .map(|attached| Arc::clone(&attached.sink))
                .collect();

            if self.verbose {
                let stream = if severity.is_stdout() { &stdout } else { &stderr };
                local.push(Arc::clone(stream));
            }

            let remote: Vec<Arc<dyn LogSink>> = match &self.remote {
                Remote::Disabled => Vec::new(),
                Remote::Global => vec![Arc::new(RemoteSink::new(severity, self.name.as_str()))],
                Remote::Hub(hub) => vec![Arc::new(RemoteSink::with_hub(
                    severity,
                    self.name.as_str(),
                    Arc::clone(hub),
                ))],
            };

            // Flushing the fatal remote sink drains the whole backend.
            if severity == Severity::Fatal {
                closers.extend(remote.iter().cloned());
            }

            SeverityLog {
                formatter: RecordFormatter::new(severity.tag(), self.flags),
                local,
                remote,
            }
        });

        closers.extend(self.sinks.iter().map(|attached| Arc::clone(&attached.sink)));

        Logger {
            name: self.name,
            logs,
            closers,
            initialized: true,
            closed: AtomicBool::new(false),
        }
    }
}
