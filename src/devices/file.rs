//! File device implementation

use crate::core::device::closed_device_error;
use crate::core::{LogDevice, LoggerError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends to a single file that never rotates.
///
/// Every write is flushed so other readers of the file see complete lines.
pub struct FileDevice {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileDevice {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open `path` for appending, creating missing parent directories.
pub(crate) fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_device(path.display().to_string(), format!("Failed to open: {}", e))
        })
}

#[cfg(unix)]
pub(crate) fn raw_fd(writer: &BufWriter<File>) -> Option<i32> {
    use std::os::fd::AsRawFd;
    Some(writer.get_ref().as_raw_fd())
}

#[cfg(not(unix))]
pub(crate) fn raw_fd(_writer: &BufWriter<File>) -> Option<i32> {
    None
}

impl LogDevice for FileDevice {
    fn write(&mut self, text: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| closed_device_error("file"))?;

        writer
            .write_all(text.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| {
                LoggerError::file_device(
                    self.path.display().to_string(),
                    format!("Failed to write log entry: {}", e),
                )
            })
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn fileno(&self) -> Option<i32> {
        self.writer.as_ref().and_then(raw_fd)
    }

    fn filename(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

impl Drop for FileDevice {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
