//! Core sink types and traits

pub mod config;
pub mod device;
pub mod error;
pub mod log_level;
pub mod multi_sink;
pub mod renderer;
pub mod timestamp;

pub use config::{DestinationConfig, DestinationSpec, SinkConfig, StreamKind};
pub use device::{DeviceTarget, LogDevice, RotationAge, RotationPolicy, DEFAULT_ROTATION_SIZE};
pub use error::{LoggerError, Result};
pub use log_level::{level_to_string, string_to_level, LogLevel};
pub use multi_sink::{
    MultiSink, MultiSinkBuilder, DEFAULT_LEVEL, DEFAULT_NAME, EMPTY_THRESHOLD, SILENT_BY_DEFAULT,
};
pub use renderer::{JsonRenderer, Renderer, TextRenderer};
pub use timestamp::TimestampFormat;
