//! Logging macros with `format!`-style arguments.
//!
//! The message is only formatted when at least one destination of the sink
//! admits the level.
//!
//! # Examples
//!
//! ```
//! use multilog::prelude::*;
//! use multilog::info;
//!
//! let sink = MultiSink::empty();
//! sink.add_log("mem", MemoryDevice::new(), LogLevel::Info, None)?;
//!
//! // Basic logging
//! info!(sink, "Server started")?;
//!
//! // With format arguments
//! let port = 8080;
//! info!(sink, "Server listening on port {}", port)?;
//! # Ok::<(), LoggerError>(())
//! ```

/// Log a message with automatic formatting.
///
/// Expands to a `Result<bool>` from [`MultiSink::log_lazy`](crate::MultiSink::log_lazy).
///
/// ```
/// # use multilog::prelude::*;
/// # let sink = MultiSink::empty();
/// use multilog::log;
/// log!(sink, LogLevel::Info, "Simple message").unwrap();
/// log!(sink, "error", "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($sink:expr, $level:expr, $($arg:tt)+) => {
        $sink.log_lazy($level, || format!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use multilog::prelude::*;
/// # let sink = MultiSink::empty();
/// use multilog::error;
/// error!(sink, "Failed to connect to {}", "db-1").unwrap();
/// ```
#[macro_export]
macro_rules! error {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Fatal, $($arg)+)
    };
}
