use std::{
    fs::File,
    io::{self, LineWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use eyre::Context;

use super::LogSink;

fn lock<T>(mutex: &Mutex<T>) -> io::Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|e| io::Error::other(e.to_string()))
}

pub struct FileSink {
    file: Mutex<LineWriter<File>>,
    name: String,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed creating log directory {}", parent.display()))?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed opening or creating log file {}", path.display()))?;

        Ok(Self {
            file: Mutex::new(LineWriter::new(file)),
            name: path.display().to_string(),
        })
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.name)
    }
}

impl LogSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &[u8]) -> io::Result<()> {
        lock(&self.file)?.write_all(record)
    }

    fn close(&self) -> io::Result<()> {
        let mut file = lock(&self.file)?;
        file.flush()?;
        file.get_ref().sync_all()
    }
}

pub struct StderrSink {
    handle: io::Stderr,
}

impl StderrSink {
    pub fn new() -> Self {
        Self {
            handle: io::stderr(),
        }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StderrSink {
    fn name(&self) -> &str {
        "stderr"
    }

    fn write(&self, record: &[u8]) -> io::Result<()> {
        let mut writer = self.handle.lock();
        writer.write_all(record)?;
        writer.flush()
    }

    fn close(&self) -> io::Result<()> {
        self.handle.lock().flush()
    }
}

pub struct StdoutSink {
    handle: io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            handle: io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn write(&self, record: &[u8]) -> io::Result<()> {
        let mut writer = self.handle.lock();
        writer.write_all(record)?;
        writer.flush()
    }

    fn close(&self) -> io::Result<()> {
        self.handle.lock().flush()
    }
}

/// Adapts any `io::Write` into a sink.
pub struct WriterSink<W> {
    writer: Mutex<W>,
    name: String,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            name: name.into(),
        }
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &[u8]) -> io::Result<()> {
        lock(&self.writer)?.write_all(record)
    }

    fn close(&self) -> io::Result<()> {
        lock(&self.writer)?.flush()
    }
}

/// In-memory sink; clones share the same buffer.
#[derive(Clone, Default)]
pub struct BufferSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl LogSink for BufferSink {
    fn name(&self) -> &str {
        "buffer"
    }

    fn write(&self, record: &[u8]) -> io::Result<()> {
        lock(&self.buffer)?.extend_from_slice(record);
        Ok(())
    }
}
