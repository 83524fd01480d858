//! # MultiLog
//!
//! A leveled logger that sends each message to several named destinations,
//! each with its own minimum level.
//!
//! ## Features
//!
//! - **Per-destination levels**: debug to a file while the console only shows warnings
//! - **Cheap rejection**: messages below every destination's level are dropped before formatting
//! - **Pluggable output**: custom renderers and devices, size or date based file rotation
//! - **Thread safe**: one sink can be shared across threads
//!
//! ```
//! use multilog::prelude::*;
//!
//! let console = MemoryDevice::new();
//! let file = MemoryDevice::new();
//!
//! let sink = MultiSink::empty();
//! sink.add_log("console", console.clone(), LogLevel::Warn, None)?;
//! sink.add_log("file", file.clone(), LogLevel::Debug, None)?;
//!
//! sink.debug("cache miss")?;
//! sink.error("disk full")?;
//!
//! assert_eq!(console.lines().len(), 1);
//! assert_eq!(file.lines().len(), 2);
//! # Ok::<(), LoggerError>(())
//! ```

pub mod core;
pub mod devices;
pub mod macros;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use crate::core::{
        DestinationConfig, DestinationSpec, DeviceTarget, JsonRenderer, LogDevice, LogLevel,
        LoggerError, MultiSink, MultiSinkBuilder, Renderer, Result, RotationAge, RotationPolicy,
        SinkConfig, TextRenderer, TimestampFormat,
    };
    pub use crate::devices::{ConsoleDevice, FileDevice, MemoryDevice, RotatingFileDevice};
}

pub use crate::core::{
    level_to_string, string_to_level, DestinationConfig, DestinationSpec, DeviceTarget,
    JsonRenderer, LogDevice, LogLevel, LoggerError, MultiSink, MultiSinkBuilder, Renderer, Result,
    RotationAge, RotationPolicy, SinkConfig, TextRenderer, TimestampFormat, SILENT_BY_DEFAULT,
};
pub use devices::{ConsoleDevice, FileDevice, MemoryDevice, RotatingFileDevice, WriterDevice};
