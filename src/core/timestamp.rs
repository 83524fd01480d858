//! Timestamp formatting utilities
//!
//! Renderers receive the emit time as a local `DateTime` and use one of these
//! formats to turn it into text.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use multilog::core::TimestampFormat;
/// use chrono::Local;
///
/// let format = TimestampFormat::Iso8601;
/// let timestamp = format.format(&Local::now());
/// assert!(timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Local wall-clock time with microseconds: `2025-01-08T10:30:45.123456`
    ///
    /// This is the default, and the shape the classic text layout expects.
    #[default]
    LocalMicros,

    /// ISO 8601 in UTC with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// RFC 3339 with the local offset: `2025-01-08T10:30:45.123456+01:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format, applied to local time
    ///
    /// ```
    /// use multilog::core::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%y-%m-%d %H:%M:%S".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::LocalMicros => datetime.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            TimestampFormat::Iso8601 => datetime
                .with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}
