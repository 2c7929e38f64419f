//! File handler implementation

use crate::core::{Formatter, Handler, LineFormatter, LogLevel, LogRecord, LoggerError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends formatted records to a file.
///
/// The file is opened on the first write, so building the handler from
/// configuration never touches the filesystem. Every record reaches the file
/// before `write` returns unless buffering is switched on.
pub struct FileHandler {
    path: PathBuf,
    level: LogLevel,
    bubble: bool,
    use_locking: bool,
    buffered: bool,
    writer: Option<BufWriter<File>>,
    default_formatter: LineFormatter,
}

impl FileHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            level: LogLevel::Debug,
            bubble: true,
            use_locking: false,
            buffered: false,
            writer: None,
            default_formatter: LineFormatter::default(),
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_bubble(mut self, bubble: bool) -> Self {
        self.bubble = bubble;
        self
    }

    /// Take an exclusive lock around every write
    #[must_use]
    pub fn with_locking(mut self, use_locking: bool) -> Self {
        self.use_locking = use_locking;
        self
    }

    /// Keep records in memory until `flush` or drop.
    ///
    /// Loggers held by a process-wide manager are never dropped, so buffered
    /// records written through them need an explicit `flush`.
    #[must_use]
    pub fn with_buffering(mut self, buffered: bool) -> Self {
        self.buffered = buffered;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&mut self) -> Result<&mut BufWriter<File>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::io_operation(
                        "creating log directory",
                        parent.display().to_string(),
                        e,
                    )
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|e| {
                    LoggerError::io_operation("opening log file", self.path.display().to_string(), e)
                })?;
            self.writer = Some(BufWriter::new(file));
        }
        self.writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))
    }

    #[cfg(feature = "file")]
    fn write_locked(writer: &mut BufWriter<File>, bytes: &[u8]) -> Result<()> {
        use fs2::FileExt;

        writer.get_ref().lock_exclusive()?;
        let result = writer.write_all(bytes).and_then(|_| writer.flush());
        let unlock = writer.get_ref().unlock();
        result?;
        unlock?;
        Ok(())
    }

    #[cfg(not(feature = "file"))]
    fn write_locked(writer: &mut BufWriter<File>, bytes: &[u8]) -> Result<()> {
        writer.write_all(bytes)?;
        writer.flush()?;
        Ok(())
    }
}

impl Handler for FileHandler {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn bubble(&self) -> bool {
        self.bubble
    }

    fn write(&mut self, record: &LogRecord, formatter: Option<&dyn Formatter>) -> Result<()> {
        let output = match formatter {
            Some(formatter) => formatter.format(record),
            None => self.default_formatter.format(record),
        };

        let (use_locking, buffered) = (self.use_locking, self.buffered);
        let writer = self.open()?;
        if use_locking {
            Self::write_locked(writer, output.as_bytes())
        } else {
            writer.write_all(output.as_bytes())?;
            if !buffered {
                writer.flush()?;
            }
            Ok(())
        }
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileHandler {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
