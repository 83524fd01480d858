//! Multi-destination logger
//!
//! A [`MultiSink`] owns a set of named destinations, each a device with its
//! own minimum level. One call renders the message once and writes it to every
//! destination whose level admits it. The lowest level across all
//! destinations is cached so that messages nobody wants are rejected before
//! any formatting happens.

use super::{
    config::{DestinationSpec, SinkConfig},
    device::{DeviceTarget, LogDevice, RotationPolicy},
    error::{LoggerError, Result},
    log_level::{level_to_string, LogLevel},
    renderer::{Renderer, TextRenderer},
};
use chrono::Local;
use parking_lot::{Mutex, RwLock};
use std::fmt::Write as _;

/// Name used for a destination when none is given
pub const DEFAULT_NAME: &str = "default";

/// Level given to a lone device passed straight to `configure`, and to specs
/// that omit a level
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Unknown;

/// Level of the stdout destination installed by `SinkConfig::Default`.
///
/// `Unknown` admits only `Unknown`-severity messages, so a sink built with
/// no configuration is effectively silent until a level is set.
pub const SILENT_BY_DEFAULT: LogLevel = LogLevel::Unknown;

/// Cached lowest level when there are no destinations
pub const EMPTY_THRESHOLD: LogLevel = LogLevel::Unknown;

struct Destination {
    name: String,
    device: Box<dyn LogDevice>,
    level: LogLevel,
}

impl Destination {
    fn describe_device(&self) -> String {
        let mut out = match self.device.fileno() {
            Some(fd) => format!("fd={}", fd),
            None => "fd=-".to_string(),
        };
        if self.device.is_tty() {
            out.push_str(" TTY");
        }
        if let Some(path) = self.device.filename() {
            let _ = write!(out, " filename={}", path.display());
        }
        out
    }
}

struct SinkState {
    /// Insertion order; position is only used to number the summary
    destinations: Vec<Destination>,
    lowest: LogLevel,
    closed: bool,
}

impl SinkState {
    fn position(&self, name: &str) -> Option<usize> {
        self.destinations.iter().position(|d| d.name == name)
    }

    fn recompute_lowest(&mut self) {
        self.lowest = self
            .destinations
            .iter()
            .map(|d| d.level)
            .min()
            .unwrap_or(EMPTY_THRESHOLD);
    }

    /// Insert or replace by name. A replaced destination is handed back so
    /// the caller can close its device.
    fn insert(&mut self, destination: Destination) -> Option<Destination> {
        match self.position(&destination.name) {
            Some(idx) => {
                let old = std::mem::replace(&mut self.destinations[idx], destination);
                self.recompute_lowest();
                Some(old)
            }
            None => {
                self.lowest = self.lowest.min(destination.level);
                self.destinations.push(destination);
                None
            }
        }
    }

    /// Close and drop every destination. All devices are closed even when
    /// one fails; the first failure is returned.
    fn close_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for mut destination in self.destinations.drain(..) {
            if let Err(e) = destination.device.close() {
                first_error.get_or_insert(e);
            }
        }
        self.lowest = EMPTY_THRESHOLD;
        first_error.map_or(Ok(()), Err)
    }
}

/// Logger that fans each message out to many independently leveled devices.
///
/// # Example
///
/// ```no_run
/// use multilog::prelude::*;
///
/// let sink = MultiSink::builder()
///     .progname("server")
///     .destination(DestinationSpec::new().named("console").device(DeviceTarget::Stdout).level("info"))
///     .destination(DestinationSpec::new().named("file").device("/var/log/server.log").level("debug"))
///     .build()?;
///
/// sink.debug("only in the file")?;
/// sink.info("in both")?;
/// # Ok::<(), LoggerError>(())
/// ```
pub struct MultiSink {
    state: Mutex<SinkState>,
    renderer: RwLock<Box<dyn Renderer>>,
    progname: RwLock<Option<String>>,
    rotation: RotationPolicy,
}

impl MultiSink {
    /// Create a sink with the default renderer and rotation, installing `config`
    pub fn new(config: impl Into<SinkConfig>) -> Result<Self> {
        Self::builder().config(config.into()).build()
    }

    /// A sink with no destinations. Every emit is a cheap no-op until a
    /// destination is added.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_parts(Box::new(TextRenderer::default()), None, RotationPolicy::default())
    }

    /// Create a builder for MultiSink
    #[must_use]
    pub fn builder() -> MultiSinkBuilder {
        MultiSinkBuilder::new()
    }

    fn with_parts(
        renderer: Box<dyn Renderer>,
        progname: Option<String>,
        rotation: RotationPolicy,
    ) -> Self {
        Self {
            state: Mutex::new(SinkState {
                destinations: Vec::new(),
                lowest: EMPTY_THRESHOLD,
                closed: false,
            }),
            renderer: RwLock::new(renderer),
            progname: RwLock::new(progname),
            rotation,
        }
    }

    /// Replace every destination with the ones described by `config`.
    ///
    /// Existing devices are closed before the new ones are opened. If a new
    /// device fails to open, the error is returned and the sink keeps the
    /// destinations opened so far.
    pub fn configure(&self, config: impl Into<SinkConfig>) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(LoggerError::Closed);
        }

        let mut first_error = state.close_all().err();

        match config.into() {
            SinkConfig::Default => {
                state.insert(Destination {
                    name: DEFAULT_NAME.to_string(),
                    device: DeviceTarget::Stdout.open(&self.rotation)?,
                    level: SILENT_BY_DEFAULT,
                });
            }
            SinkConfig::Device(target) => {
                state.insert(Destination {
                    name: DEFAULT_NAME.to_string(),
                    device: target.open(&self.rotation)?,
                    level: DEFAULT_LEVEL,
                });
            }
            SinkConfig::Specs(specs) => {
                for spec in specs {
                    let destination = self.open_spec(spec)?;
                    if let Some(mut replaced) = state.insert(destination) {
                        if let Err(e) = replaced.device.close() {
                            first_error.get_or_insert(e);
                        }
                    }
                }
            }
        }

        state.recompute_lowest();
        first_error.map_or(Ok(()), Err)
    }

    fn open_spec(&self, spec: DestinationSpec) -> Result<Destination> {
        let rotation = spec.rotation(&self.rotation);
        let DestinationSpec {
            name, device, level, ..
        } = spec;
        Ok(Destination {
            name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            device: device.unwrap_or(DeviceTarget::Stdout).open(&rotation)?,
            level: level.unwrap_or(DEFAULT_LEVEL),
        })
    }

    /// Add a destination without touching the others. A destination with the
    /// same name is replaced in place and its device closed.
    ///
    /// `rotation` defaults to the sink's rotation policy.
    pub fn add_log(
        &self,
        name: impl Into<String>,
        target: impl Into<DeviceTarget>,
        level: impl Into<LogLevel>,
        rotation: Option<RotationPolicy>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(LoggerError::Closed);
        }

        let rotation = rotation.as_ref().unwrap_or(&self.rotation);
        let destination = Destination {
            name: name.into(),
            device: target.into().open(rotation)?,
            level: level.into(),
        };

        match state.insert(destination) {
            Some(mut replaced) => replaced.device.close(),
            None => Ok(()),
        }
    }

    /// Remove a destination and close its device. Unknown names are ignored.
    ///
    /// The entry is gone even if closing its device fails.
    pub fn remove_log(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        let Some(idx) = state.position(name) else {
            return Ok(());
        };

        let mut removed = state.destinations.remove(idx);
        if removed.level == state.lowest {
            state.recompute_lowest();
        }
        drop(state);

        removed.device.close()
    }

    /// Set the level of one destination, or of all of them when `name` is `None`.
    ///
    /// # Errors
    ///
    /// `LoggerError::NotFound` when `name` is not registered.
    pub fn set_level(&self, name: Option<&str>, level: impl Into<LogLevel>) -> Result<()> {
        let level = level.into();
        let mut state = self.state.lock();
        if state.closed {
            return Err(LoggerError::Closed);
        }

        match name {
            Some(name) => {
                let idx = state
                    .position(name)
                    .ok_or_else(|| LoggerError::not_found(name))?;
                state.destinations[idx].level = level;
            }
            None => state
                .destinations
                .iter_mut()
                .for_each(|d| d.level = level),
        }

        state.recompute_lowest();
        Ok(())
    }

    /// Level of the named destination, `"default"` when `name` is `None`
    pub fn get_level(&self, name: Option<&str>) -> Option<LogLevel> {
        let name = name.unwrap_or(DEFAULT_NAME);
        let state = self.state.lock();
        state
            .position(name)
            .map(|idx| state.destinations[idx].level)
    }

    /// Lowest level across all destinations
    pub fn lowest_level(&self) -> LogLevel {
        self.state.lock().lowest
    }

    /// Whether a message at `level` would reach at least one destination
    pub fn enabled(&self, level: impl Into<LogLevel>) -> bool {
        let state = self.state.lock();
        !state.closed && !state.destinations.is_empty() && level.into() >= state.lowest
    }

    /// Number of destinations
    pub fn len(&self) -> usize {
        self.state.lock().destinations.len()
    }

    /// Whether there are no destinations
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destination names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.state
            .lock()
            .destinations
            .iter()
            .map(|d| d.name.clone())
            .collect()
    }

    /// Whether a destination named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().position(name).is_some()
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Program name used when a call does not give one
    pub fn progname(&self) -> Option<String> {
        self.progname.read().clone()
    }

    /// Set the default program name
    pub fn set_progname(&self, progname: Option<String>) {
        *self.progname.write() = progname;
    }

    /// Replace the renderer used for every later message
    pub fn set_renderer(&self, renderer: impl Renderer + 'static) {
        *self.renderer.write() = Box::new(renderer);
    }

    /// Log `message` at `severity`.
    ///
    /// A `None` severity is treated as `Unknown`. With no message, the
    /// program name becomes the message and the sink's own program name is
    /// used in its place.
    ///
    /// Always returns `Ok(true)` once dispatch completes. A device write error
    /// aborts the dispatch and is returned as-is.
    pub fn add(
        &self,
        severity: Option<LogLevel>,
        message: Option<String>,
        progname: Option<&str>,
    ) -> Result<bool> {
        self.dispatch(severity, message, progname, None::<fn() -> String>)
    }

    /// Like [`add`](Self::add), but the message is produced by `message`,
    /// which runs at most once and only if some destination admits `severity`.
    pub fn add_lazy<F>(&self, severity: Option<LogLevel>, progname: Option<&str>, message: F) -> Result<bool>
    where
        F: FnOnce() -> String,
    {
        self.dispatch(severity, None, progname, Some(message))
    }

    fn dispatch<F>(
        &self,
        severity: Option<LogLevel>,
        message: Option<String>,
        progname: Option<&str>,
        lazy: Option<F>,
    ) -> Result<bool>
    where
        F: FnOnce() -> String,
    {
        let severity = severity.unwrap_or(LogLevel::Unknown);
        {
            let state = self.state.lock();
            if state.closed || state.destinations.is_empty() || severity < state.lowest {
                return Ok(true);
            }
        }

        let default_progname = self.progname();
        let mut progname = progname.map(String::from).or_else(|| default_progname.clone());
        let message = match (message, lazy) {
            (Some(message), _) => message,
            (None, Some(produce)) => produce(),
            (None, None) => {
                let message = progname.take().unwrap_or_default();
                progname = default_progname;
                message
            }
        };

        let rendered = self.renderer.read().render(
            level_to_string(severity.index()),
            &Local::now(),
            progname.as_deref(),
            &message,
        );

        let mut state = self.state.lock();
        for destination in state
            .destinations
            .iter_mut()
            .filter(|d| d.level <= severity)
        {
            destination.device.write(&rendered)?;
        }
        Ok(true)
    }

    pub fn log(&self, level: impl Into<LogLevel>, message: impl Into<String>) -> Result<bool> {
        self.add(Some(level.into()), Some(message.into()), None)
    }

    pub fn log_lazy<F>(&self, level: impl Into<LogLevel>, message: F) -> Result<bool>
    where
        F: FnOnce() -> String,
    {
        self.add_lazy(Some(level.into()), None, message)
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogLevel::Debug, message)
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogLevel::Info, message)
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogLevel::Warn, message)
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogLevel::Error, message)
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogLevel::Fatal, message)
    }

    #[inline]
    pub fn unknown(&self, message: impl Into<String>) -> Result<bool> {
        self.log(LogLevel::Unknown, message)
    }

    /// Log a description of every destination at the lowest level, so each
    /// destination sees it. Returns the emitted lines.
    ///
    /// ```text
    /// Summary of logs:
    ///  (1/2) console (level: INFO, device: fd=1 TTY)
    ///  (2/2) file (level: DEBUG, device: fd=3 filename=/var/log/app.log)
    /// ```
    ///
    /// With no destinations the only line is ` *** No logs!`.
    pub fn summarize(&self) -> Result<Vec<String>> {
        let (lowest, lines) = {
            let state = self.state.lock();
            if state.closed {
                return Ok(Vec::new());
            }

            let total = state.destinations.len();
            let lines: Vec<String> = if total == 0 {
                vec![" *** No logs!".to_string()]
            } else {
                std::iter::once("Summary of logs:".to_string())
                    .chain(state.destinations.iter().enumerate().map(|(i, d)| {
                        format!(
                            " ({}/{}) {} (level: {}, device: {})",
                            i + 1,
                            total,
                            d.name,
                            level_to_string(d.level.index()),
                            d.describe_device()
                        )
                    }))
                    .collect()
            };
            (state.lowest, lines)
        };

        for line in &lines {
            self.add(Some(lowest), Some(line.clone()), None)?;
        }
        Ok(lines)
    }

    /// Flush every device, stopping at the first error
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        for destination in state.destinations.iter_mut() {
            destination.device.flush()?;
        }
        Ok(())
    }

    /// Close every device and stop accepting configuration changes.
    ///
    /// Calling `close` again is a no-op. Afterwards emits succeed without
    /// writing anything, while `configure`, `add_log` and `set_level` fail
    /// with `LoggerError::Closed`.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;
        state.close_all()
    }
}

impl Default for MultiSink {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drop for MultiSink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close devices during drop: {}", e);
        }
    }
}

/// Builder for [`MultiSink`]
pub struct MultiSinkBuilder {
    config: Option<SinkConfig>,
    specs: Vec<DestinationSpec>,
    renderer: Box<dyn Renderer>,
    progname: Option<String>,
    rotation: RotationPolicy,
}

impl MultiSinkBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: None,
            specs: Vec::new(),
            renderer: Box::new(TextRenderer::default()),
            progname: None,
            rotation: RotationPolicy::default(),
        }
    }

    /// Use a complete configuration, replacing any destinations added so far
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: SinkConfig) -> Self {
        self.specs.clear();
        self.config = Some(config);
        self
    }

    /// Add a destination
    #[must_use = "builder methods return a new value"]
    pub fn destination(mut self, spec: DestinationSpec) -> Self {
        self.config = None;
        self.specs.push(spec);
        self
    }

    /// Use a single device as the `default` destination
    #[must_use = "builder methods return a new value"]
    pub fn default_device(self, target: impl Into<DeviceTarget>) -> Self {
        self.config(SinkConfig::Device(target.into()))
    }

    #[must_use = "builder methods return a new value"]
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn progname(mut self, progname: impl Into<String>) -> Self {
        self.progname = Some(progname.into());
        self
    }

    /// Rotation applied to destinations that do not set their own
    #[must_use = "builder methods return a new value"]
    pub fn rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Build the sink, opening every configured device.
    ///
    /// With neither `config`, `destination` nor `default_device` called, the
    /// sink gets `SinkConfig::Default`.
    pub fn build(self) -> Result<MultiSink> {
        let config = match self.config {
            Some(config) => config,
            None if self.specs.is_empty() => SinkConfig::Default,
            None => SinkConfig::Specs(self.specs),
        };

        let sink = MultiSink::with_parts(self.renderer, self.progname, self.rotation);
        sink.configure(config)?;
        Ok(sink)
    }
}

impl Default for MultiSinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::MemoryDevice;
    use chrono::DateTime;
    use std::cell::Cell;

    fn bare(severity: &str, _: &DateTime<Local>, progname: Option<&str>, msg: &str) -> String {
        format!("{} {} {}\n", severity, progname.unwrap_or("-"), msg)
    }

    fn sink_with(devices: &[(&str, &MemoryDevice, LogLevel)]) -> MultiSink {
        let sink = MultiSink::empty();
        sink.set_renderer(bare);
        for (name, device, level) in devices {
            sink.add_log(*name, (*device).clone(), *level, None).unwrap();
        }
        sink
    }

    #[test]
    fn test_default_config_is_silent_stdout() {
        let sink = MultiSink::new(SinkConfig::Default).unwrap();

        assert_eq!(sink.names(), vec![DEFAULT_NAME]);
        assert_eq!(sink.get_level(None), Some(SILENT_BY_DEFAULT));
        assert_eq!(sink.lowest_level(), LogLevel::Unknown);
        assert!(!sink.enabled(LogLevel::Fatal));
    }

    #[test]
    fn test_single_device_config() {
        let capture = MemoryDevice::new();
        let sink = MultiSink::new(DeviceTarget::from(capture.clone())).unwrap();

        assert_eq!(sink.get_level(Some("default")), Some(DEFAULT_LEVEL));
        sink.set_renderer(bare);
        sink.fatal("dropped").unwrap();
        sink.unknown("kept").unwrap();
        assert_eq!(capture.lines(), vec!["UNKNOWN - kept"]);
    }

    #[test]
    fn test_empty_specs() {
        let sink = MultiSink::new(SinkConfig::Specs(Vec::new())).unwrap();

        assert!(sink.is_empty());
        assert_eq!(sink.lowest_level(), EMPTY_THRESHOLD);
        assert!(sink.fatal("x").unwrap());
        assert_eq!(sink.summarize().unwrap(), vec![" *** No logs!"]);
    }

    #[test]
    fn test_empty_sink_skips_message_and_rendering() {
        let sink = MultiSink::new(SinkConfig::Specs(Vec::new())).unwrap();
        let renders = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = renders.clone();
        sink.set_renderer(move |s: &str, t: &DateTime<Local>, p: Option<&str>, m: &str| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            bare(s, t, p, m)
        });
        let calls = Cell::new(0);

        assert!(sink
            .add_lazy(Some(LogLevel::Unknown), None, || {
                calls.set(calls.get() + 1);
                "nobody listens".to_string()
            })
            .unwrap());
        assert_eq!(sink.summarize().unwrap(), vec![" *** No logs!"]);

        assert_eq!(calls.get(), 0);
        assert_eq!(renders.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(!sink.enabled(LogLevel::Unknown));
    }

    struct CloseFails;

    impl LogDevice for CloseFails {
        fn write(&mut self, _: &str) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            Err(LoggerError::io_operation(
                "closing device",
                "close refused",
                std::io::Error::other("close refused"),
            ))
        }
    }

    #[test]
    fn test_configure_keeps_installing_after_close_error() {
        let later = MemoryDevice::new();
        let sink = MultiSink::empty();

        let result = sink.configure(vec![
            DestinationSpec::new().named("dup").device(DeviceTarget::device(CloseFails)),
            DestinationSpec::new().named("dup").device(MemoryDevice::new()).level("warn"),
            DestinationSpec::new().named("later").device(later.clone()).level("info"),
        ]);

        assert!(matches!(result, Err(LoggerError::IoOperation { .. })));
        assert_eq!(sink.names(), vec!["dup", "later"]);
        assert_eq!(sink.lowest_level(), LogLevel::Info);
        assert_eq!(later.close_count(), 0);
    }

    #[test]
    fn test_configure_reports_close_error_of_previous_devices() {
        let sink = MultiSink::empty();
        sink.add_log("old", DeviceTarget::device(CloseFails), LogLevel::Debug, None)
            .unwrap();

        let replacement = MemoryDevice::new();
        let result = sink.configure(DestinationSpec::new().named("new").device(replacement.clone()));

        assert!(result.is_err());
        assert_eq!(sink.names(), vec!["new"]);
    }

    #[test]
    fn test_spec_defaults() {
        let capture = MemoryDevice::new();
        let sink = MultiSink::new(DestinationSpec::new().device(capture.clone())).unwrap();

        assert_eq!(sink.names(), vec!["default"]);
        assert_eq!(sink.get_level(None), Some(LogLevel::Unknown));
    }

    #[test]
    fn test_configure_closes_previous_devices() {
        let old = MemoryDevice::new();
        let new = MemoryDevice::new();
        let sink = sink_with(&[("old", &old, LogLevel::Debug)]);

        sink.configure(vec![DestinationSpec::new()
            .named("new")
            .device(new.clone())
            .level("warn")])
            .unwrap();

        assert_eq!(old.close_count(), 1);
        assert_eq!(new.close_count(), 0);
        assert_eq!(sink.names(), vec!["new"]);
        assert_eq!(sink.lowest_level(), LogLevel::Warn);
    }

    #[test]
    fn test_configure_duplicate_names_replace() {
        let first = MemoryDevice::new();
        let second = MemoryDevice::new();
        let sink = MultiSink::new(vec![
            DestinationSpec::new().named("dup").device(first.clone()).level("debug"),
            DestinationSpec::new().named("dup").device(second.clone()).level("error"),
        ])
        .unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(first.close_count(), 1);
        assert_eq!(sink.lowest_level(), LogLevel::Error);
    }

    #[test]
    fn test_per_destination_gating() {
        let console = MemoryDevice::new();
        let file = MemoryDevice::new();
        let sink = sink_with(&[("console", &console, LogLevel::Info), ("file", &file, LogLevel::Debug)]);

        sink.debug("detail").unwrap();
        sink.info("notice").unwrap();

        assert_eq!(console.lines(), vec!["INFO - notice"]);
        assert_eq!(file.lines(), vec!["DEBUG - detail", "INFO - notice"]);
    }

    #[test]
    fn test_message_at_threshold_is_written() {
        let device = MemoryDevice::new();
        let sink = sink_with(&[("only", &device, LogLevel::Warn)]);

        sink.info("below").unwrap();
        sink.warn("at").unwrap();
        sink.error("above").unwrap();

        assert_eq!(device.lines(), vec!["WARN - at", "ERROR - above"]);
    }

    #[test]
    fn test_add_log_replaces_and_closes() {
        let first = MemoryDevice::new();
        let second = MemoryDevice::new();
        let sink = sink_with(&[("file", &first, LogLevel::Debug)]);

        sink.add_log("file", second.clone(), "ERROR", None).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(first.close_count(), 1);
        assert_eq!(sink.get_level(Some("file")), Some(LogLevel::Error));
        assert_eq!(sink.lowest_level(), LogLevel::Error);
    }

    #[test]
    fn test_add_log_keeps_position() {
        let a = MemoryDevice::new();
        let b = MemoryDevice::new();
        let sink = sink_with(&[("a", &a, LogLevel::Info), ("b", &b, LogLevel::Info)]);

        sink.add_log("a", MemoryDevice::new(), LogLevel::Warn, None).unwrap();
        assert_eq!(sink.names(), vec!["a", "b"]);
        assert_eq!(b.close_count(), 0);
    }

    #[test]
    fn test_remove_log() {
        let debug = MemoryDevice::new();
        let error = MemoryDevice::new();
        let sink = sink_with(&[("debug", &debug, LogLevel::Debug), ("error", &error, LogLevel::Error)]);

        sink.remove_log("missing").unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.lowest_level(), LogLevel::Debug);

        sink.remove_log("debug").unwrap();
        assert_eq!(debug.close_count(), 1);
        assert_eq!(sink.lowest_level(), LogLevel::Error);

        sink.remove_log("error").unwrap();
        assert!(sink.is_empty());
        assert_eq!(sink.lowest_level(), EMPTY_THRESHOLD);

        sink.remove_log("error").unwrap();
        assert_eq!(error.close_count(), 1);
    }

    #[test]
    fn test_set_level() {
        let a = MemoryDevice::new();
        let b = MemoryDevice::new();
        let sink = sink_with(&[("a", &a, LogLevel::Info), ("b", &b, LogLevel::Error)]);

        sink.set_level(Some("b"), "debug").unwrap();
        assert_eq!(sink.lowest_level(), LogLevel::Debug);

        sink.set_level(None, LogLevel::Fatal).unwrap();
        assert_eq!(sink.get_level(Some("a")), Some(LogLevel::Fatal));
        assert_eq!(sink.get_level(Some("b")), Some(LogLevel::Fatal));
        assert_eq!(sink.lowest_level(), LogLevel::Fatal);

        let err = sink.set_level(Some("nope"), "INFO").unwrap_err();
        assert!(matches!(err, LoggerError::NotFound { ref name } if name == "nope"));
        assert_eq!(sink.get_level(Some("nope")), None);
    }

    #[test]
    fn test_lazy_message_only_past_gate() {
        let device = MemoryDevice::new();
        let sink = sink_with(&[("only", &device, LogLevel::Warn)]);
        let calls = Cell::new(0);

        sink.add_lazy(Some(LogLevel::Debug), None, || {
            calls.set(calls.get() + 1);
            "expensive".to_string()
        })
        .unwrap();
        assert_eq!(calls.get(), 0);

        sink.add_lazy(Some(LogLevel::Error), None, || {
            calls.set(calls.get() + 1);
            "expensive".to_string()
        })
        .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(device.lines(), vec!["ERROR - expensive"]);
    }

    #[test]
    fn test_progname_fallback_chain() {
        let device = MemoryDevice::new();
        let sink = sink_with(&[("only", &device, LogLevel::Debug)]);
        sink.set_progname(Some("app".to_string()));

        sink.add(Some(LogLevel::Info), Some("explicit".to_string()), Some("worker"))
            .unwrap();
        sink.add(Some(LogLevel::Info), Some("implicit".to_string()), None)
            .unwrap();
        sink.add(Some(LogLevel::Info), None, Some("as message")).unwrap();
        sink.add(None, None, None).unwrap();

        assert_eq!(
            device.lines(),
            vec![
                "INFO worker explicit",
                "INFO app implicit",
                "INFO app as message",
                "UNKNOWN app app",
            ]
        );
    }

    #[test]
    fn test_write_error_propagates() {
        let failing = MemoryDevice::failing();
        let sink = sink_with(&[("bad", &failing, LogLevel::Debug)]);

        assert!(matches!(
            sink.info("x"),
            Err(LoggerError::IoOperation { .. })
        ));
        assert!(sink.debug("still raised").is_err());
    }

    #[test]
    fn test_summarize_numbers_destinations() {
        let a = MemoryDevice::new();
        let b = MemoryDevice::new();
        let sink = sink_with(&[("a", &a, LogLevel::Error), ("b", &b, LogLevel::Warn)]);

        let lines = sink.summarize().unwrap();
        assert_eq!(
            lines,
            vec![
                "Summary of logs:",
                " (1/2) a (level: ERROR, device: fd=-)",
                " (2/2) b (level: WARN, device: fd=-)",
            ]
        );
        // Emitted at the lowest level, so the ERROR destination sees it too
        assert_eq!(a.lines().len(), 3);
        assert_eq!(b.lines()[0], "WARN - Summary of logs:");
    }

    #[test]
    fn test_close_is_terminal_and_idempotent() {
        let device = MemoryDevice::new();
        let sink = sink_with(&[("only", &device, LogLevel::Debug)]);

        sink.close().unwrap();
        sink.close().unwrap();
        assert_eq!(device.close_count(), 1);
        assert!(sink.is_closed());

        assert!(sink.fatal("ignored").unwrap());
        assert!(sink.summarize().unwrap().is_empty());
        assert!(matches!(
            sink.add_log("late", MemoryDevice::new(), LogLevel::Info, None),
            Err(LoggerError::Closed)
        ));
        assert!(matches!(sink.configure(SinkConfig::Default), Err(LoggerError::Closed)));
        assert!(matches!(sink.set_level(None, "info"), Err(LoggerError::Closed)));
        sink.remove_log("only").unwrap();
    }

    #[test]
    fn test_drop_closes_devices() {
        let device = MemoryDevice::new();
        {
            let _sink = sink_with(&[("only", &device, LogLevel::Debug)]);
        }
        assert_eq!(device.close_count(), 1);
    }

    #[test]
    fn test_builder() {
        let capture = MemoryDevice::new();
        let sink = MultiSink::builder()
            .progname("svc")
            .renderer(bare)
            .destination(DestinationSpec::new().named("mem").device(capture.clone()).level("info"))
            .build()
            .unwrap();

        sink.info("hello").unwrap();
        assert_eq!(capture.lines(), vec!["INFO svc hello"]);
        assert_eq!(sink.progname().as_deref(), Some("svc"));

        let sink = MultiSink::builder().build().unwrap();
        assert_eq!(sink.names(), vec![DEFAULT_NAME]);
    }

    #[test]
    fn test_sink_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MultiSink>();
    }
}
