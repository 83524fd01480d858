//! Devices backed by arbitrary writers and by memory

use crate::core::device::closed_device_error;
use crate::core::{LogDevice, LoggerError, Result};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Wraps any `Write` implementation. Closing flushes and drops the writer.
pub struct WriterDevice {
    writer: Option<Box<dyn Write + Send>>,
}

impl WriterDevice {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Some(writer),
        }
    }
}

impl LogDevice for WriterDevice {
    fn write(&mut self, text: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| closed_device_error("writer"))?;
        writer.write_all(text.as_bytes())?;
        Ok(())
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
}

#[derive(Debug, Default)]
struct MemoryState {
    buffer: String,
    writes: usize,
    closes: usize,
    fail_writes: bool,
}

/// In-memory device whose clones share one buffer.
///
/// Hand one clone to a sink and keep another to inspect what was written and
/// how often the device was closed. It is a capture handle for tests: a
/// destination owns its device, so never register clones of the same
/// `MemoryDevice` under two names. Each destination closes it, and after the
/// first close every write fails.
///
/// ```
/// use multilog::devices::MemoryDevice;
/// use multilog::{LogLevel, MultiSink};
///
/// let capture = MemoryDevice::new();
/// let sink = MultiSink::empty();
/// sink.add_log("mem", capture.clone(), LogLevel::Info, None).unwrap();
/// sink.info("hello").unwrap();
/// assert!(capture.contents().contains("hello"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDevice {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device whose writes always fail with an I/O error
    pub fn failing() -> Self {
        let device = Self::default();
        device.state.lock().fail_writes = true;
        device
    }

    pub fn contents(&self) -> String {
        self.state.lock().buffer.clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.state.lock().buffer.lines().map(String::from).collect()
    }

    /// Number of successful `write` calls
    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }

    /// Number of times `close` was called
    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }

    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

impl LogDevice for MemoryDevice {
    fn write(&mut self, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.closes > 0 {
            return Err(closed_device_error("memory"));
        }
        if state.fail_writes {
            return Err(LoggerError::io_operation(
                "writing to memory",
                "simulated write failure",
                std::io::Error::other("write refused"),
            ));
        }
        state.buffer.push_str(text);
        state.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.lock().closes += 1;
        Ok(())
    }
}
