use std::{backtrace::Backtrace, borrow::Cow, panic::Location};

/// Source location a record is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    file: Cow<'static, str>,
    line: u32,
}

impl Caller {
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    #[track_caller]
    pub fn here() -> Self {
        Location::caller().into()
    }

    /// Resolves the frame `depth` levels above `location`.
    ///
    /// Depth 0 is `location` itself. Deeper frames are looked up in a captured backtrace,
    /// which needs debug info; without it the record falls back to `location`.
    pub fn at_depth(location: &'static Location<'static>, depth: usize) -> Self {
        if depth == 0 {
            return location.into();
        }

        let trace = Backtrace::force_capture().to_string();
        resolve_frame(&trace, location, depth).unwrap_or_else(|| location.into())
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Final path element of the file name.
    pub fn short_file(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file.as_ref())
    }
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }
}

fn resolve_frame(trace: &str, location: &Location<'_>, depth: usize) -> Option<Caller> {
    let frames: Vec<(&str, u32)> = trace
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("at "))
        .filter_map(parse_frame)
        .collect();

    let start = frames
        .iter()
        .position(|(file, line)| *line == location.line() && file.ends_with(location.file()))?;

    start
        .checked_add(depth)
        .and_then(|index| frames.get(index))
        .map(|(file, line)| Caller::new(file.to_string(), *line))
}

// "path/to/file.rs:LINE:COLUMN"
fn parse_frame(frame: &str) -> Option<(&str, u32)> {
    let mut parts = frame.rsplitn(3, ':');
    let _column = parts.next()?;
    let line = parts.next()?.parse().ok()?;
    let file = parts.next()?;

    Some((file, line))
}
