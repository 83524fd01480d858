//! Log level definitions and the forgiving name/index registry
//!
//! Levels order by index, `Debug` lowest. `Unknown` sits above `Fatal` and
//! doubles as the "log nothing below this" threshold. Conversions never
//! fail: anything unrecognised becomes `Unknown`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const LABELS: [&str; 5] = ["DEBUG", "INFO", "WARN", "ERROR", "FATAL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
    #[default]
    Unknown = 5,
}

impl LogLevel {
    /// All levels in ascending order
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Unknown => "UNKNOWN",
        }
    }

    /// Numeric index of the level (`Unknown` is 5)
    pub fn index(&self) -> i64 {
        *self as i64
    }

    /// Map an index to a level; anything outside `0..=4` is `Unknown`
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            3 => LogLevel::Error,
            4 => LogLevel::Fatal,
            _ => LogLevel::Unknown,
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
            LogLevel::Unknown => BrightBlack,
        }
    }
}

/// Name for a level index, `UNKNOWN` for anything outside `0..=4`.
pub fn level_to_string(index: i64) -> &'static str {
    usize::try_from(index)
        .ok()
        .and_then(|i| LABELS.get(i))
        .copied()
        .unwrap_or("UNKNOWN")
}

/// Case-insensitive lookup of a level name. Unmatched names yield `Unknown`.
pub fn string_to_level(name: &str) -> LogLevel {
    let upper = name.to_ascii_uppercase();
    LABELS
        .iter()
        .position(|label| *label == upper)
        .map_or(LogLevel::Unknown, |i| LogLevel::from_index(i as i64))
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(string_to_level(s))
    }
}

impl From<&str> for LogLevel {
    fn from(name: &str) -> Self {
        string_to_level(name)
    }
}

impl From<String> for LogLevel {
    fn from(name: String) -> Self {
        string_to_level(&name)
    }
}

impl From<&String> for LogLevel {
    fn from(name: &String) -> Self {
        string_to_level(name)
    }
}

impl From<i64> for LogLevel {
    fn from(index: i64) -> Self {
        LogLevel::from_index(index)
    }
}

impl From<i32> for LogLevel {
    fn from(index: i32) -> Self {
        LogLevel::from_index(i64::from(index))
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Index(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Name(name) => string_to_level(&name),
            Raw::Index(index) => LogLevel::from_index(index),
        })
    }
}
