//! Destination configuration
//!
//! [`SinkConfig`] is what [`MultiSink::configure`](super::MultiSink::configure)
//! accepts. [`DestinationConfig`] is its serde-friendly counterpart for
//! settings that arrive as data rather than code.

use super::device::{DeviceTarget, RotationAge, RotationPolicy};
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input shapes accepted by `configure`
#[derive(Debug, Default)]
pub enum SinkConfig {
    /// A single `default` destination on stdout at
    /// [`SILENT_BY_DEFAULT`](super::multi_sink::SILENT_BY_DEFAULT)
    #[default]
    Default,
    /// A single `default` destination on the given device at
    /// [`DEFAULT_LEVEL`](super::multi_sink::DEFAULT_LEVEL)
    Device(DeviceTarget),
    /// One destination per spec; an empty list means no destinations at all
    Specs(Vec<DestinationSpec>),
}

impl SinkConfig {
    /// Build a spec list from deserialized destination configs
    pub fn from_configs(configs: Vec<DestinationConfig>) -> Result<Self> {
        configs
            .into_iter()
            .map(DestinationConfig::into_spec)
            .collect::<Result<Vec<_>>>()
            .map(SinkConfig::Specs)
    }
}

impl From<DeviceTarget> for SinkConfig {
    fn from(target: DeviceTarget) -> Self {
        SinkConfig::Device(target)
    }
}

impl From<DestinationSpec> for SinkConfig {
    fn from(spec: DestinationSpec) -> Self {
        SinkConfig::Specs(vec![spec])
    }
}

impl From<Vec<DestinationSpec>> for SinkConfig {
    fn from(specs: Vec<DestinationSpec>) -> Self {
        SinkConfig::Specs(specs)
    }
}

/// One destination to install. Every field is optional:
///
/// | field | default |
/// |---|---|
/// | name | `"default"` |
/// | device | stdout |
/// | level | `Unknown` |
/// | rotation age/size/compress | the sink's default rotation policy |
///
/// # Examples
///
/// ```
/// use multilog::core::{DestinationSpec, DeviceTarget};
/// use multilog::LogLevel;
///
/// let console = DestinationSpec::new()
///     .named("console")
///     .device(DeviceTarget::Stdout)
///     .level("info");
/// let file = DestinationSpec::new()
///     .named("file")
///     .device("/var/log/app.log")
///     .level(LogLevel::Debug)
///     .rotation_age(7)
///     .rotation_size(10 * 1024 * 1024);
/// ```
#[derive(Debug, Default)]
pub struct DestinationSpec {
    pub name: Option<String>,
    pub device: Option<DeviceTarget>,
    pub level: Option<LogLevel>,
    pub rotation_age: Option<RotationAge>,
    pub rotation_size: Option<u64>,
    pub compress: Option<bool>,
}

impl DestinationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn device(mut self, target: impl Into<DeviceTarget>) -> Self {
        self.device = Some(target.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: impl Into<LogLevel>) -> Self {
        self.level = Some(level.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn rotation_age(mut self, age: impl Into<RotationAge>) -> Self {
        self.rotation_age = Some(age.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn rotation_size(mut self, size: u64) -> Self {
        self.rotation_size = Some(size);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = Some(enabled);
        self
    }

    /// The rotation policy for this spec, filling gaps from `defaults`
    pub fn rotation(&self, defaults: &RotationPolicy) -> RotationPolicy {
        RotationPolicy {
            age: self.rotation_age.unwrap_or(defaults.age),
            size: self.rotation_size.unwrap_or(defaults.size),
            compress: self.compress.unwrap_or(defaults.compress),
        }
    }
}

/// Standard stream selector for [`DestinationConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Serializable description of a destination
///
/// ```
/// use multilog::core::DestinationConfig;
///
/// let configs = DestinationConfig::from_json(r#"[
///     {"name": "console", "stream": "stderr", "level": "warn"},
///     {"name": "file", "path": "/tmp/app.log", "level": "debug",
///      "rotation_age": "daily"}
/// ]"#).unwrap();
/// assert_eq!(configs.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    pub name: Option<String>,
    pub path: Option<PathBuf>,
    pub stream: Option<StreamKind>,
    pub level: Option<LogLevel>,
    pub rotation_age: Option<RotationAge>,
    pub rotation_size: Option<u64>,
    pub compress: Option<bool>,
}

impl DestinationConfig {
    /// Parse a JSON array of destination configs
    pub fn from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_spec(self) -> Result<DestinationSpec> {
        let device = match (self.path, self.stream) {
            (Some(_), Some(_)) => {
                return Err(LoggerError::config(
                    format!("destination '{}'", self.name.as_deref().unwrap_or("default")),
                    "set either 'path' or 'stream', not both",
                ));
            }
            (Some(path), None) => Some(DeviceTarget::Path(path)),
            (None, Some(StreamKind::Stdout)) => Some(DeviceTarget::Stdout),
            (None, Some(StreamKind::Stderr)) => Some(DeviceTarget::Stderr),
            (None, None) => None,
        };

        Ok(DestinationSpec {
            name: self.name,
            device,
            level: self.level,
            rotation_age: self.rotation_age,
            rotation_size: self.rotation_size,
            compress: self.compress,
        })
    }
}
