//! The process-wide default logger and the free functions writing to it.

use std::{
    fmt::{self, Display},
    panic::Location,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

use super::{
    caller::Caller,
    logger::{join_line, Builder, Logger},
    Flags, LogSink, Severity,
};

static DEFAULT: LazyLock<RwLock<Arc<Logger>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Logger::unconfigured())));

/// The current default logger. Before [`init`] this is a stderr-only fallback that
/// marks every record as written before initialization.
pub fn logger() -> Arc<Logger> {
    Arc::clone(&DEFAULT.read().unwrap_or_else(PoisonError::into_inner))
}

/// Makes `logger` the default unless an initialized logger is already in place.
pub(crate) fn install(logger: &Arc<Logger>) -> bool {
    let mut current = DEFAULT.write().unwrap_or_else(PoisonError::into_inner);
    if current.is_initialized() {
        return false;
    }
    *current = Arc::clone(logger);
    true
}

#[cfg(test)]
pub(crate) fn reset_to(logger: Logger) {
    *DEFAULT.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(logger);
}

/// Sets up logging, usually from `main`.
///
/// `log_file` receives every severity and is closed with the logger. With `verbose`,
/// Info/Warning also go to stdout and Error/Fatal to stderr. Every severity feeds the
/// remote backend once [`connect`](crate::remote::connect) has succeeded.
///
/// The first call populates the default logger; later calls only return their own logger.
pub fn init(name: &str, verbose: bool, log_file: Option<Arc<dyn LogSink>>) -> Arc<Logger> {
    let mut builder = Builder::new(name).verbose(verbose);
    if let Some(sink) = log_file {
        builder = builder.with_sink(sink);
    }

    let logger = Arc::new(builder.assemble());
    install(&logger);
    logger
}

/// Closes the default logger.
pub fn close() {
    logger().close();
}

/// Changes the header flags of the default logger's Info and Warning records.
pub fn set_flags(flags: Flags) {
    let logger = logger();
    logger.set_flags(Severity::Info, flags);
    logger.set_flags(Severity::Warning, flags);
}

/// Logs at Info and waits until every remote delivery has finished.
#[track_caller]
pub fn rinfo(msg: impl Display) {
    logger().output(Severity::Info, &Caller::here(), &msg.to_string());
    crate::remote::wait();
}

#[track_caller]
pub fn rinfof(args: fmt::Arguments<'_>) {
    logger().output(Severity::Info, &Caller::here(), &fmt::format(args));
    crate::remote::wait();
}

macro_rules! default_functions {
    ($severity:expr, $plain:ident, $depth:ident, $ln:ident, $f:ident) => {
        #[doc = concat!("Logs `msg` with the ", stringify!($plain), " severity on the default logger.")]
        #[track_caller]
        pub fn $plain(msg: impl Display) {
            logger().output($severity, &Caller::here(), &msg.to_string());
        }

        #[track_caller]
        pub fn $depth(depth: usize, msg: impl Display) {
            let caller = Caller::at_depth(Location::caller(), depth);
            logger().output($severity, &caller, &msg.to_string());
        }

        #[track_caller]
        pub fn $ln(values: &[&dyn Display]) {
            logger().output($severity, &Caller::here(), &join_line(values));
        }

        #[track_caller]
        pub fn $f(args: fmt::Arguments<'_>) {
            logger().output($severity, &Caller::here(), &fmt::format(args));
        }
    };
}

default_functions!(Severity::Info, info, info_depth, infoln, infof);
default_functions!(Severity::Warning, warning, warning_depth, warningln, warningf);
default_functions!(Severity::Error, error, error_depth, errorln, errorf);

/// Logs with the fatal severity on the default logger, closes it and exits with status 1.
#[track_caller]
pub fn fatal(msg: impl Display) -> ! {
    exit(&Caller::here(), &msg.to_string())
}

#[track_caller]
pub fn fatal_depth(depth: usize, msg: impl Display) -> ! {
    let caller = Caller::at_depth(Location::caller(), depth);
    exit(&caller, &msg.to_string())
}

#[track_caller]
pub fn fatalln(values: &[&dyn Display]) -> ! {
    exit(&Caller::here(), &join_line(values))
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    exit(&Caller::here(), &fmt::format(args))
}

fn exit(caller: &Caller, text: &str) -> ! {
    logger().output_fatal(caller, text);
    std::process::exit(1)
}
