use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file size that triggers trimming (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Most recent bytes kept when trimming (1 MB)
const KEEP_SIZE: u64 = 1024 * 1024;

const LOG_FILE_NAME: &str = "frontier.log";

/// Trim `log_path` to its last `KEEP_SIZE` bytes once it outgrows `MAX_LOG_SIZE`.
fn rotate_log_if_needed(log_path: &Path) -> io::Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let file_size = fs::metadata(log_path)?.len();
    if file_size <= MAX_LOG_SIZE {
        return Ok(());
    }

    let mut file = File::open(log_path)?;
    file.seek(SeekFrom::Start(file_size.saturating_sub(KEEP_SIZE)))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    drop(file);

    // Drop the partial first line
    let skip = buffer
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- log trimmed, older entries removed ---\n")?;
    file.write_all(&buffer[skip..])?;
    Ok(())
}

/// Hands out writers that share one open log file
#[derive(Clone)]
struct SharedFile {
    file: Arc<Mutex<File>>,
}

struct SharedFileWriter {
    file: Arc<Mutex<File>>,
}

impl SharedFileWriter {
    fn with_file<T>(&self, f: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        f(&mut file)
    }
}

impl Write for SharedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = SharedFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileWriter {
            file: self.file.clone(),
        }
    }
}

/// Open (and trim if oversized) the log file inside `log_dir`.
pub fn open_log_file(log_dir: &Path) -> io::Result<(PathBuf, File)> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);

    if let Err(e) = rotate_log_if_needed(&log_path) {
        eprintln!("warning: failed to trim log file {}: {e}", log_path.display());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    Ok((log_path, file))
}

/// Default directives when `RUST_LOG` is unset
pub fn default_filter(level: &str) -> String {
    format!("frontier={level},frontier_core={level}")
}

/// Install the global tracing subscriber.
///
/// With `log_dir` set, events go to `{log_dir}/frontier.log` (trimmed to the
/// last 1 MB once it passes 5 MB); otherwise to stderr, keeping stdout free
/// for the JSON report. `RUST_LOG` overrides `level`.
pub fn init_logging(log_dir: Option<&Path>, level: &str) -> color_eyre::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let (writer, ansi, log_path) = match log_dir {
        Some(dir) => {
            let (path, file) = open_log_file(dir)?;
            let shared = SharedFile {
                file: Arc::new(Mutex::new(file)),
            };
            (BoxMakeWriter::new(shared), false, Some(path))
        }
        None => (BoxMakeWriter::new(io::stderr), true, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();

    match log_path {
        Some(path) => tracing::info!(log_path = %path.display(), "logging initialized"),
        None => tracing::debug!("logging to stderr"),
    }
    Ok(())
}
