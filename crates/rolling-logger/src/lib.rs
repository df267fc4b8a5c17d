//! Rolling File Logger
//!
//! Installs a `tracing` subscriber that writes to a bounded set of
//! size-rotated files (`<app>.log`, `<app>.1.log`, ...) and keeps the most
//! recent lines in an in-memory circular buffer.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

/// Rotate once the current file would grow past this many bytes
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
/// Number of files kept, including the current one
pub const DEFAULT_MAX_FILES: usize = 5;
/// Lines kept in the in-memory buffer
pub const DEFAULT_RECENT_CAPACITY: usize = 200;

static RECENT: OnceLock<RecentLines> = OnceLock::new();

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Circular buffer of the last formatted log lines
#[derive(Clone, Debug)]
pub struct RecentLines {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl RecentLines {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn push_text(&self, text: &str) {
        let mut lines = lock(&self.lines);
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            if lines.len() == self.capacity {
                lines.pop_front();
            }
            lines.push_back(line.to_string());
        }
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<String> {
        lock(&self.lines).iter().cloned().collect()
    }
}

struct RollingState {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_files: usize,
    file: Option<File>,
    written: u64,
}

impl RollingState {
    fn path_for(&self, index: usize) -> PathBuf {
        if index == 0 {
            self.dir.join(format!("{}.log", self.app_name))
        } else {
            self.dir.join(format!("{}.{}.log", self.app_name, index))
        }
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file = None;

        let oldest = self.path_for(self.max_files - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (0..self.max_files - 1).rev() {
            let from = self.path_for(index);
            if from.exists() {
                fs::rename(&from, self.path_for(index + 1))?;
            }
        }

        self.file = Some(open_append(&self.path_for(0))?);
        self.written = 0;
        Ok(())
    }

    fn write_chunk(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }

        let current = self.path_for(0);
        let file = match &mut self.file {
            Some(file) => file,
            slot @ None => slot.insert(open_append(&current)?),
        };
        file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// File writer that rotates by size and mirrors lines into [`RecentLines`]
#[derive(Clone)]
pub struct RollingFileWriter {
    state: Arc<Mutex<RollingState>>,
    recent: RecentLines,
}

impl RollingFileWriter {
    /// Open (or continue) `<dir>/<app_name>.log`, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>, app_name: &str) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut state = RollingState {
            dir,
            app_name: app_name.to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
            file: None,
            written: 0,
        };
        let current = state.path_for(0);
        let file = open_append(&current)?;
        state.written = file.metadata()?.len();
        state.file = Some(file);

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            recent: RecentLines::new(DEFAULT_RECENT_CAPACITY),
        })
    }

    pub fn with_limits(self, max_bytes: u64, max_files: usize) -> Self {
        {
            let mut state = lock(&self.state);
            state.max_bytes = max_bytes.max(1);
            state.max_files = max_files.max(1);
        }
        self
    }

    pub fn with_recent_capacity(mut self, capacity: usize) -> Self {
        self.recent = RecentLines::new(capacity);
        self
    }

    pub fn current_path(&self) -> PathBuf {
        lock(&self.state).path_for(0)
    }

    pub fn recent(&self) -> RecentLines {
        self.recent.clone()
    }

    fn append(&self, buf: &[u8]) -> io::Result<()> {
        lock(&self.state).write_chunk(buf)?;
        self.recent.push_text(&String::from_utf8_lossy(buf));
        Ok(())
    }
}

impl Write for RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match lock(&self.state).file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Buffers one formatted event and appends it whole when dropped
pub struct EventWriter {
    target: RollingFileWriter,
    buf: Vec<u8>,
}

impl Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        if !self.buf.is_empty() {
            if let Err(e) = self.target.append(&self.buf) {
                eprintln!("rolling-logger: failed to write log event: {}", e);
            }
        }
    }
}

impl<'a> MakeWriter<'a> for RollingFileWriter {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter {
            target: self.clone(),
            buf: Vec::new(),
        }
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Install the global subscriber writing into `log_dir`
///
/// `log` records are bridged into the same subscriber.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    let writer = RollingFileWriter::new(log_dir.as_ref(), app_name)
        .map_err(|e| format!("Failed to open log file: {}", e))?;
    let recent = writer.recent();

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_max_level(tracing::Level::INFO)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    let _ = RECENT.set(recent);
    tracing::info!(app = app_name, "logger initialized");
    Ok(())
}

pub fn is_initialized() -> bool {
    RECENT.get().is_some()
}

/// Last lines written by the global logger, oldest first
pub fn recent_lines() -> Vec<String> {
    RECENT.get().map(RecentLines::snapshot).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), String> {
    if is_initialized() {
        Ok(())
    } else {
        Err("Logger not initialized".to_string())
    }
}

pub fn info(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::info!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::error!("{}", message);
    Ok(())
}
