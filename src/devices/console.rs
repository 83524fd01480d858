//! Console device implementation

use crate::core::device::closed_device_error;
use crate::core::{LogDevice, Result};
use std::io::{IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Writes to the process's standard output or standard error.
///
/// Closing only flushes and detaches the device; the process stream itself
/// stays open for the rest of the program.
#[derive(Debug)]
pub struct ConsoleDevice {
    stream: Stream,
    closed: bool,
}

impl ConsoleDevice {
    pub fn stdout() -> Self {
        Self {
            stream: Stream::Stdout,
            closed: false,
        }
    }

    pub fn stderr() -> Self {
        Self {
            stream: Stream::Stderr,
            closed: false,
        }
    }

    fn name(&self) -> &'static str {
        match self.stream {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

impl LogDevice for ConsoleDevice {
    fn write(&mut self, text: &str) -> Result<()> {
        if self.closed {
            return Err(closed_device_error(self.name()));
        }
        match self.stream {
            Stream::Stdout => std::io::stdout().lock().write_all(text.as_bytes())?,
            Stream::Stderr => std::io::stderr().lock().write_all(text.as_bytes())?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            Stream::Stdout => std::io::stdout().flush()?,
            Stream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.flush()?;
            self.closed = true;
        }
        Ok(())
    }

    #[cfg(unix)]
    fn fileno(&self) -> Option<i32> {
        use std::os::fd::AsRawFd;
        Some(match self.stream {
            Stream::Stdout => std::io::stdout().as_raw_fd(),
            Stream::Stderr => std::io::stderr().as_raw_fd(),
        })
    }

    #[cfg(not(unix))]
    fn fileno(&self) -> Option<i32> {
        Some(match self.stream {
            Stream::Stdout => 1,
            Stream::Stderr => 2,
        })
    }

    fn is_tty(&self) -> bool {
        match self.stream {
            Stream::Stdout => std::io::stdout().is_terminal(),
            Stream::Stderr => std::io::stderr().is_terminal(),
        }
    }
}
