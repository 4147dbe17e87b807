//! Format-string entry points. Without `logger:` they write to the default logger.

#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.infof(::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::infof(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warning {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.warningf(::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::warningf(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.errorf(::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::errorf(::core::format_args!($($arg)+))
    };
}

/// Logs with the fatal severity, closes the logger and exits the process.
#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.fatalf(::core::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::fatalf(::core::format_args!($($arg)+))
    };
}
