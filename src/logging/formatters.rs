use core::fmt::Write;
use std::{
    ops::BitOr,
    sync::atomic::{AtomicU8, Ordering},
};

use chrono::{DateTime, Local};

use super::caller::Caller;

/// Header fields written in front of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// `2009/01/23`
    pub const DATE: Flags = Flags(1);
    /// `01:23:23`
    pub const TIME: Flags = Flags(1 << 1);
    /// `01:23:23.123123`, implies TIME.
    pub const MICROSECONDS: Flags = Flags(1 << 2);
    /// Full source path and line.
    pub const LONG_FILE: Flags = Flags(1 << 3);
    /// Final path element and line, overrides LONG_FILE.
    pub const SHORT_FILE: Flags = Flags(1 << 4);

    pub const DEFAULT: Flags = Flags(Self::DATE.0 | Self::MICROSECONDS.0 | Self::SHORT_FILE.0);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        Flags(bits & 0b1_1111)
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags::DEFAULT
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

/// Renders `<prefix><date> <time> <file:line>: <text>\n`.
///
/// Flags live in an atomic so they can be changed on a logger that is already shared.
pub struct RecordFormatter {
    prefix: String,
    flags: AtomicU8,
}

impl RecordFormatter {
    pub fn new(prefix: impl Into<String>, flags: Flags) -> Self {
        Self {
            prefix: prefix.into(),
            flags: AtomicU8::new(flags.bits()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits(self.flags.load(Ordering::Relaxed))
    }

    pub fn set_flags(&self, flags: Flags) {
        self.flags.store(flags.bits(), Ordering::Relaxed);
    }

    pub fn format(&self, now: DateTime<Local>, caller: &Caller, text: &str) -> Vec<u8> {
        let flags = self.flags();
        let mut out = String::with_capacity(self.prefix.len() + text.len() + 48);
        out.push_str(&self.prefix);

        // Writing into a String cannot fail.
        if flags.contains(Flags::DATE) {
            let _ = write!(out, "{} ", now.format("%Y/%m/%d"));
        }

        if flags.intersects(Flags::TIME | Flags::MICROSECONDS) {
            let time = if flags.contains(Flags::MICROSECONDS) {
                now.format("%H:%M:%S%.6f")
            } else {
                now.format("%H:%M:%S")
            };
            let _ = write!(out, "{} ", time);
        }

        if flags.intersects(Flags::SHORT_FILE | Flags::LONG_FILE) {
            let file = if flags.contains(Flags::SHORT_FILE) {
                caller.short_file()
            } else {
                caller.file()
            };
            let _ = write!(out, "{}:{}: ", file, caller.line());
        }

        out.push_str(text);
        if !text.ends_with('\n') {
            out.push('\n');
        }

        out.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("unambiguous local time")
            + Duration::microseconds(123_456)
    }

    fn render(flags: Flags, text: &str) -> String {
        let formatter = RecordFormatter::new("INFO : ", flags);
        let caller = Caller::new("src/service/worker.rs", 42);
        String::from_utf8(formatter.format(fixed_time(), &caller, text)).unwrap()
    }

    #[test]
    fn default_layout() {
        assert_eq!(
            render(Flags::DEFAULT, "started"),
            "INFO : 2024/01/02 03:04:05.123456 worker.rs:42: started\n"
        );
    }

    #[test]
    fn existing_newline_is_not_doubled() {
        assert_eq!(render(Flags::NONE, "a b c\n"), "INFO : a b c\n");
    }

    #[test]
    fn long_file_and_plain_time() {
        assert_eq!(
            render(Flags::TIME | Flags::LONG_FILE, "x"),
            "INFO : 03:04:05 src/service/worker.rs:42: x\n"
        );
    }

    #[test]
    fn short_file_wins_over_long_file() {
        assert_eq!(
            render(Flags::SHORT_FILE | Flags::LONG_FILE, "x"),
            "INFO : worker.rs:42: x\n"
        );
    }

    #[test]
    fn flags_can_change_after_construction() {
        let formatter = RecordFormatter::new("WARN : ", Flags::DEFAULT);
        formatter.set_flags(Flags::NONE);
        assert_eq!(formatter.flags(), Flags::NONE);

        let record = formatter.format(fixed_time(), &Caller::new("a.rs", 1), "quiet");
        assert_eq!(record, b"WARN : quiet\n");
    }
}
