use std::fmt;

/// Severity a record is routed by. There is no threshold: every level is always written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Prefix written in front of every local record of this severity.
    pub const fn tag(self) -> &'static str {
        match self {
            Severity::Info => "INFO : ",
            Severity::Warning => "WARN : ",
            Severity::Error => "ERROR: ",
            Severity::Fatal => "FATAL: ",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Info and Warning go to stdout in verbose mode, Error and Fatal to stderr.
    pub const fn is_stdout(self) -> bool {
        matches!(self, Severity::Info | Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warning,
            log::Level::Info | log::Level::Debug | log::Level::Trace => Severity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_fixed_width() {
        for severity in Severity::ALL {
            assert_eq!(severity.tag().len(), 7, "{severity}");
        }
    }

    #[test]
    fn index_matches_position() {
        for (i, severity) in Severity::ALL.iter().enumerate() {
            assert_eq!(severity.index(), i);
        }
    }

    #[test]
    fn ordering_follows_gravity() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn log_levels_collapse_onto_info() {
        assert_eq!(Severity::from(log::Level::Trace), Severity::Info);
        assert_eq!(Severity::from(log::Level::Debug), Severity::Info);
        assert_eq!(Severity::from(log::Level::Warn), Severity::Warning);
        assert_eq!(Severity::from(log::Level::Error), Severity::Error);
    }
}
