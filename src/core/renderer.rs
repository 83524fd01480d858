//! Rendering of a single log line
//!
//! The sink renders each accepted message exactly once, through a
//! [`Renderer`], and hands the same text to every admitting device.
//! Renderers provided here:
//! - [`TextRenderer`]: `I, [2025-01-08T10:30:45.123456 #4242]  INFO -- app: started`
//! - [`JsonRenderer`]: one JSON object per line
//! - any closure `Fn(&str, &DateTime<Local>, Option<&str>, &str) -> String`

use super::log_level::string_to_level;
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Local};

/// Turns a severity label, timestamp, program name and message into the text
/// written to devices. Implementations should include the line terminator.
pub trait Renderer: Send + Sync {
    fn render(
        &self,
        severity: &str,
        timestamp: &DateTime<Local>,
        progname: Option<&str>,
        message: &str,
    ) -> String;
}

impl<F> Renderer for F
where
    F: Fn(&str, &DateTime<Local>, Option<&str>, &str) -> String + Send + Sync,
{
    fn render(
        &self,
        severity: &str,
        timestamp: &DateTime<Local>,
        progname: Option<&str>,
        message: &str,
    ) -> String {
        self(severity, timestamp, progname, message)
    }
}

/// Classic single-line text layout
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    timestamp_format: TimestampFormat,
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timestamp format for this renderer
    ///
    /// # Examples
    ///
    /// ```
    /// use multilog::core::{TextRenderer, TimestampFormat};
    ///
    /// let renderer = TextRenderer::new().with_timestamp_format(TimestampFormat::Rfc3339);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom timestamp format using a strftime-compatible format string
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }

    /// Colour the severity label. Has no effect without the `console` feature.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[cfg(feature = "console")]
    fn severity_label(&self, severity: &str) -> String {
        use colored::Colorize;
        let label = format!("{:>5}", severity);
        if self.use_colors {
            label
                .color(string_to_level(severity).color_code())
                .to_string()
        } else {
            label
        }
    }

    #[cfg(not(feature = "console"))]
    fn severity_label(&self, severity: &str) -> String {
        format!("{:>5}", severity)
    }
}

impl Renderer for TextRenderer {
    fn render(
        &self,
        severity: &str,
        timestamp: &DateTime<Local>,
        progname: Option<&str>,
        message: &str,
    ) -> String {
        let initial = severity.chars().next().unwrap_or('?');
        format!(
            "{}, [{} #{}] {} -- {}: {}\n",
            initial,
            self.timestamp_format.format(timestamp),
            std::process::id(),
            self.severity_label(severity),
            progname.unwrap_or_default(),
            message
        )
    }
}

/// JSON lines layout
///
/// Numeric timestamp formats are emitted as JSON numbers, everything else as
/// strings. The canonical severity name is used even when the caller passes a
/// differently-cased label.
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    timestamp_format: TimestampFormat,
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::Iso8601,
        }
    }
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn timestamp_value(&self, timestamp: &DateTime<Local>) -> serde_json::Value {
        match self.timestamp_format {
            TimestampFormat::Unix => serde_json::Value::Number(timestamp.timestamp().into()),
            TimestampFormat::UnixMillis => {
                serde_json::Value::Number(timestamp.timestamp_millis().into())
            }
            _ => serde_json::Value::String(self.timestamp_format.format(timestamp)),
        }
    }
}

impl Renderer for JsonRenderer {
    fn render(
        &self,
        severity: &str,
        timestamp: &DateTime<Local>,
        progname: Option<&str>,
        message: &str,
    ) -> String {
        let mut json_obj = serde_json::Map::new();
        json_obj.insert("timestamp".to_string(), self.timestamp_value(timestamp));
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(string_to_level(severity).as_str().to_string()),
        );
        json_obj.insert("pid".to_string(), std::process::id().into());
        if let Some(progname) = progname {
            json_obj.insert(
                "progname".to_string(),
                serde_json::Value::String(progname.to_string()),
            );
        }
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(message.to_string()),
        );

        let mut line =
            serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default();
        line.push('\n');
        line
    }
}
