//! Device trait for log output destinations, plus the rotation parameters a
//! device is opened with

use super::error::{LoggerError, Result};
use crate::devices::{ConsoleDevice, FileDevice, MemoryDevice, RotatingFileDevice, WriterDevice};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A writable sink owned by exactly one destination.
///
/// `close` is called once by the owning sink when the destination is removed,
/// replaced, or the sink itself is closed.
pub trait LogDevice: Send {
    fn write(&mut self, text: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;

    /// Raw OS file descriptor, when the device has one
    fn fileno(&self) -> Option<i32> {
        None
    }

    fn is_tty(&self) -> bool {
        false
    }

    /// Backing file, for file-based devices
    fn filename(&self) -> Option<&Path> {
        None
    }
}

impl LogDevice for Box<dyn LogDevice> {
    fn write(&mut self, text: &str) -> Result<()> {
        (**self).write(text)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn fileno(&self) -> Option<i32> {
        (**self).fileno()
    }

    fn is_tty(&self) -> bool {
        (**self).is_tty()
    }

    fn filename(&self) -> Option<&Path> {
        (**self).filename()
    }
}

pub(crate) fn closed_device_error(device: &str) -> LoggerError {
    LoggerError::io_operation(
        format!("writing to {}", device),
        "device already closed",
        std::io::Error::new(std::io::ErrorKind::BrokenPipe, "device closed"),
    )
}

/// How many rotated files to keep, or which calendar period a file covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAge {
    /// Keep this many numbered backups. `Count(0)` disables rotation.
    Count(usize),
    Daily,
    Weekly,
    Monthly,
}

impl Default for RotationAge {
    fn default() -> Self {
        RotationAge::Count(0)
    }
}

impl RotationAge {
    pub fn is_periodic(&self) -> bool {
        matches!(self, RotationAge::Daily | RotationAge::Weekly | RotationAge::Monthly)
    }

    /// Parse the textual forms `daily`, `weekly`, `monthly` or a backup count
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(RotationAge::Daily),
            "weekly" => Some(RotationAge::Weekly),
            "monthly" => Some(RotationAge::Monthly),
            other => other.parse::<usize>().ok().map(RotationAge::from),
        }
    }
}

impl From<usize> for RotationAge {
    fn from(count: usize) -> Self {
        RotationAge::Count(count)
    }
}

impl fmt::Display for RotationAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationAge::Count(n) => write!(f, "{}", n),
            RotationAge::Daily => f.write_str("daily"),
            RotationAge::Weekly => f.write_str("weekly"),
            RotationAge::Monthly => f.write_str("monthly"),
        }
    }
}

impl Serialize for RotationAge {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RotationAge::Count(n) => serializer.serialize_u64(*n as u64),
            periodic => serializer.serialize_str(&periodic.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for RotationAge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(usize),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(RotationAge::from(n)),
            Raw::Name(name) => RotationAge::parse(&name).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid rotation age: '{}'", name))
            }),
        }
    }
}

/// Default rotation size threshold (1 MiB)
pub const DEFAULT_ROTATION_SIZE: u64 = 1_048_576;

/// Rotation parameters handed to a device when it is opened
///
/// Only file devices act on these; streams and writers ignore them.
///
/// # Examples
///
/// ```
/// use multilog::core::{RotationAge, RotationPolicy};
///
/// // Keep 7 backups of at most 10 MiB each, gzip the backups
/// let policy = RotationPolicy::new()
///     .with_age(RotationAge::Count(7))
///     .with_size(10 * 1024 * 1024)
///     .with_compression(true);
///
/// // One file per day
/// let policy = RotationPolicy::new().with_age(RotationAge::Daily);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    #[serde(default)]
    pub age: RotationAge,
    #[serde(default = "default_rotation_size")]
    pub size: u64,
    #[serde(default)]
    pub compress: bool,
}

fn default_rotation_size() -> u64 {
    DEFAULT_ROTATION_SIZE
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            age: RotationAge::Count(0),
            size: DEFAULT_ROTATION_SIZE,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_age(mut self, age: impl Into<RotationAge>) -> Self {
        self.age = age.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Whether a file opened with this policy can ever rotate
    #[must_use]
    pub fn rotates(&self) -> bool {
        self.age != RotationAge::Count(0)
    }

    pub fn validate(&self) -> Result<()> {
        if matches!(self.age, RotationAge::Count(n) if n > 0) && self.size == 0 {
            return Err(LoggerError::config(
                "RotationPolicy",
                "size must be positive when keeping numbered backups",
            ));
        }
        Ok(())
    }
}

/// What a destination writes to, before it is opened
pub enum DeviceTarget {
    Stdout,
    Stderr,
    /// A file path; opened in append mode and rotated per the policy
    Path(PathBuf),
    /// Any writer, wrapped as-is
    Writer(Box<dyn Write + Send>),
    /// An already constructed device
    Device(Box<dyn LogDevice>),
}

impl DeviceTarget {
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        DeviceTarget::Writer(Box::new(writer))
    }

    pub fn device(device: impl LogDevice + 'static) -> Self {
        DeviceTarget::Device(Box::new(device))
    }

    /// Open or wrap the target. Rotation applies to paths only.
    pub fn open(self, rotation: &RotationPolicy) -> Result<Box<dyn LogDevice>> {
        Ok(match self {
            DeviceTarget::Stdout => Box::new(ConsoleDevice::stdout()),
            DeviceTarget::Stderr => Box::new(ConsoleDevice::stderr()),
            DeviceTarget::Path(path) if rotation.rotates() => {
                rotation.validate()?;
                Box::new(RotatingFileDevice::with_policy(path, rotation.clone())?)
            }
            DeviceTarget::Path(path) => Box::new(FileDevice::new(path)?),
            DeviceTarget::Writer(writer) => Box::new(WriterDevice::new(writer)),
            DeviceTarget::Device(device) => device,
        })
    }
}

impl fmt::Debug for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceTarget::Stdout => f.write_str("Stdout"),
            DeviceTarget::Stderr => f.write_str("Stderr"),
            DeviceTarget::Path(path) => f.debug_tuple("Path").field(path).finish(),
            DeviceTarget::Writer(_) => f.write_str("Writer(..)"),
            DeviceTarget::Device(_) => f.write_str("Device(..)"),
        }
    }
}

impl From<PathBuf> for DeviceTarget {
    fn from(path: PathBuf) -> Self {
        DeviceTarget::Path(path)
    }
}

impl From<&Path> for DeviceTarget {
    fn from(path: &Path) -> Self {
        DeviceTarget::Path(path.to_path_buf())
    }
}

impl From<&str> for DeviceTarget {
    fn from(path: &str) -> Self {
        DeviceTarget::Path(PathBuf::from(path))
    }
}

impl From<Box<dyn LogDevice>> for DeviceTarget {
    fn from(device: Box<dyn LogDevice>) -> Self {
        DeviceTarget::Device(device)
    }
}

impl From<MemoryDevice> for DeviceTarget {
    fn from(device: MemoryDevice) -> Self {
        DeviceTarget::Device(Box::new(device))
    }
}

impl From<ConsoleDevice> for DeviceTarget {
    fn from(device: ConsoleDevice) -> Self {
        DeviceTarget::Device(Box::new(device))
    }
}
