//! Buffered file writer for the logger

use crate::logger::config::FileConfig;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Log file writer shared across subscriber layers
pub(crate) struct LogFileWriter {
    state: Arc<Mutex<BufWriter<File>>>,
}

impl LogFileWriter {
    pub fn new(config: &FileConfig) -> anyhow::Result<Self> {
        // Create directory if it doesn't exist
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;

        Ok(Self {
            state: Arc::new(Mutex::new(file)),
        })
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriterGuard {
            state: self.state.clone(),
        }
    }
}

/// Guard for file writer access
pub(crate) struct LogWriterGuard {
    state: Arc<Mutex<BufWriter<File>>>,
}

impl Write for LogWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "Failed to acquire writer lock"))?;
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "Failed to acquire writer lock"))?;
        file.flush()
    }
}

impl Drop for LogWriterGuard {
    fn drop(&mut self) {
        // Ensure buffer is flushed when guard is dropped
        if let Ok(mut file) = self.state.lock() {
            let _ = file.flush();
        }
    }
}

fn open_log_file(path: &std::path::Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}
