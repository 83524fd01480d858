//! Rotating file device
//!
//! Rotation is driven by a [`RotationPolicy`]:
//! - `RotationAge::Count(n)`: once the file would grow past `size` bytes, it
//!   is renamed to `{file}.1`, older backups shift up by one and anything past
//!   `{file}.{n}` is deleted.
//! - `Daily`, `Weekly`, `Monthly`: on the first write in a new calendar
//!   period the file is renamed to `{file}.{YYYYMMDD}`, stamped with the date
//!   of the period it covered.

use super::file::{open_append, raw_fd};
use crate::core::device::closed_device_error;
use crate::core::{LogDevice, LoggerError, Result, RotationAge, RotationPolicy};
use chrono::{DateTime, Datelike, Local};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File device that rotates according to a [`RotationPolicy`]
///
/// # Examples
///
/// ```no_run
/// use multilog::devices::RotatingFileDevice;
/// use multilog::core::{RotationAge, RotationPolicy};
///
/// // Keep 5 backups of 1 MiB each
/// let policy = RotationPolicy::new().with_age(5).with_size(1024 * 1024);
/// let device = RotatingFileDevice::with_policy("/var/log/app.log", policy).unwrap();
///
/// // One file per week
/// let policy = RotationPolicy::new().with_age(RotationAge::Weekly);
/// let device = RotatingFileDevice::with_policy("/var/log/app.log", policy).unwrap();
/// ```
pub struct RotatingFileDevice {
    base_path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    /// Time of the last write, or the file's mtime when it was opened
    last_write: DateTime<Local>,
}

impl RotatingFileDevice {
    /// Open `path` for appending with the given policy
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or opened, or the policy is invalid
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        policy.validate()?;
        let base_path = path.as_ref().to_path_buf();
        let file = open_append(&base_path)?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_device(
                base_path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;
        let last_write = metadata
            .modified()
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());

        Ok(Self {
            base_path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size: metadata.len(),
            last_write,
        })
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    fn should_rotate(&self, incoming: u64, now: &DateTime<Local>) -> bool {
        match self.policy.age {
            RotationAge::Count(0) => false,
            RotationAge::Count(_) => {
                self.current_size > 0 && self.current_size + incoming > self.policy.size
            }
            age => period_key(age, &self.last_write) != period_key(age, now),
        }
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        match self.policy.age {
            RotationAge::Count(keep) => self.shift_numbered(keep)?,
            _ => self.move_to_dated()?,
        }

        let file = open_append(&self.base_path).map_err(|e| {
            LoggerError::file_rotation(
                self.base_path.display().to_string(),
                format!("Failed to create new log file: {}", e),
            )
        })?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = 0;
        Ok(())
    }

    fn shift_numbered(&self, keep: usize) -> Result<()> {
        let oldest = self.backup_path(keep);
        for stale in [gz_path(&oldest), oldest] {
            if stale.exists() {
                if let Err(e) = fs::remove_file(&stale) {
                    eprintln!("[WARN] Failed to remove oldest backup {}: {}", stale.display(), e);
                }
            }
        }

        for i in (1..keep).rev() {
            let old_path = self.backup_path(i);
            let new_path = self.backup_path(i + 1);
            let (from, to) = if gz_path(&old_path).exists() {
                (gz_path(&old_path), gz_path(&new_path))
            } else {
                (old_path, new_path)
            };
            if from.exists() {
                fs::rename(&from, &to).map_err(|e| {
                    LoggerError::file_rotation(
                        from.display().to_string(),
                        format!("Failed to rotate backup files: {}", e),
                    )
                })?;
            }
        }

        let first = self.backup_path(1);
        self.rename_current(&first)?;
        if self.policy.compress {
            compress_file(&first)?;
        }
        Ok(())
    }

    fn move_to_dated(&self) -> Result<()> {
        let stamp = self.last_write.format("%Y%m%d").to_string();
        let mut target = self.suffixed(&stamp);
        let mut n = 1;
        while target.exists() {
            target = self.suffixed(&format!("{}.{}", stamp, n));
            n += 1;
        }
        self.rename_current(&target)
    }

    fn rename_current(&self, target: &Path) -> Result<()> {
        if self.base_path.exists() {
            fs::rename(&self.base_path, target).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn suffixed(&self, suffix: &str) -> PathBuf {
        let mut path = self.base_path.clone();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log")
            .to_string();
        path.set_file_name(format!("{}.{}", filename, suffix));
        path
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.suffixed(&index.to_string())
    }

    fn try_reopen(&mut self) -> Result<()> {
        let file = open_append(&self.base_path)?;
        self.current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }
}

fn period_key(age: RotationAge, at: &DateTime<Local>) -> (i32, u32) {
    match age {
        RotationAge::Daily => (at.year(), at.ordinal()),
        RotationAge::Weekly => {
            let week = at.iso_week();
            (week.year(), week.week())
        }
        RotationAge::Monthly => (at.year(), at.month()),
        RotationAge::Count(_) => (0, 0),
    }
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Gzip `path` into `path.gz`, removing the original only after the
/// compressed copy is complete.
fn compress_file(path: &Path) -> Result<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::BufReader;

    let gz = gz_path(path);
    let temp_gz = {
        let mut name = gz.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    };

    let compress = || -> std::io::Result<()> {
        let mut reader = BufReader::new(File::open(path)?);
        let output = BufWriter::new(File::create(&temp_gz)?);
        let mut encoder = GzEncoder::new(output, Compression::default());
        std::io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?.flush()?;
        fs::rename(&temp_gz, &gz)
    };

    if let Err(e) = compress() {
        let _ = fs::remove_file(&temp_gz);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

impl LogDevice for RotatingFileDevice {
    fn write(&mut self, text: &str) -> Result<()> {
        if self.writer.is_none() {
            return Err(closed_device_error("rotating file"));
        }

        let now = Local::now();
        let incoming = text.len() as u64;
        if self.should_rotate(incoming, &now) {
            if let Err(e) = self.rotate() {
                // Keep logging into whatever file is at the base path
                eprintln!("[WARN] Log rotation failed: {}. Continuing with current file.", e);
                if self.writer.is_none() {
                    if let Err(reopen_err) = self.try_reopen() {
                        eprintln!(
                            "[ERROR] Failed to reopen log file after rotation failure: {}",
                            reopen_err
                        );
                        return Err(e);
                    }
                }
                self.current_size = 0;
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| closed_device_error("rotating file"))?;
        writer
            .write_all(text.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| {
                LoggerError::file_device(
                    self.base_path.display().to_string(),
                    format!("Failed to write log entry: {}", e),
                )
            })?;
        self.current_size += incoming;
        self.last_write = now;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_device(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn fileno(&self) -> Option<i32> {
        self.writer.as_ref().and_then(raw_fd)
    }

    fn filename(&self) -> Option<&Path> {
        Some(&self.base_path)
    }
}

impl Drop for RotatingFileDevice {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn line(i: usize) -> String {
        format!("I, message number {:03}\n", i)
    }

    #[test]
    fn test_rotating_device_creation() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("test.log");

        let device = RotatingFileDevice::with_policy(&log_path, RotationPolicy::new().with_age(2))
            .unwrap();
        assert_eq!(device.path(), log_path);
        assert_eq!(device.current_size(), 0);
        assert_eq!(device.filename(), Some(log_path.as_path()));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let dir = tempdir().unwrap();
        let policy = RotationPolicy::new().with_age(2).with_size(0);
        let result = RotatingFileDevice::with_policy(dir.path().join("x.log"), policy);
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_size_rotation_keeps_age_backups() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("rotation.log");
        let policy = RotationPolicy::new().with_age(2).with_size(100);
        let mut device = RotatingFileDevice::with_policy(&log_path, policy).unwrap();

        for i in 0..20 {
            device.write(&line(i)).unwrap();
        }
        device.flush().unwrap();

        assert!(dir.path().join("rotation.log.1").exists());
        assert!(dir.path().join("rotation.log.2").exists());
        assert!(!dir.path().join("rotation.log.3").exists());
        assert!(fs::metadata(&log_path).unwrap().len() <= 100);

        let newest = fs::read_to_string(&log_path).unwrap();
        assert!(newest.ends_with(&line(19)));
    }

    #[test]
    fn test_no_rotation_below_size() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("small.log");
        let policy = RotationPolicy::new().with_age(3).with_size(10_000);
        let mut device = RotatingFileDevice::with_policy(&log_path, policy).unwrap();

        for i in 0..10 {
            device.write(&line(i)).unwrap();
        }

        assert!(!dir.path().join("small.log.1").exists());
        assert_eq!(fs::read_to_string(&log_path).unwrap().lines().count(), 10);
    }

    #[test]
    fn test_compressed_backups() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("gz.log");
        let policy = RotationPolicy::new()
            .with_age(3)
            .with_size(50)
            .with_compression(true);
        let mut device = RotatingFileDevice::with_policy(&log_path, policy).unwrap();

        for i in 0..6 {
            device.write(&line(i)).unwrap();
        }

        assert!(dir.path().join("gz.log.1.gz").exists());
        assert!(!dir.path().join("gz.log.1").exists());
    }

    #[test]
    fn test_daily_rotation_moves_to_dated_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("daily.log");
        let policy = RotationPolicy::new().with_age(RotationAge::Daily);
        let mut device = RotatingFileDevice::with_policy(&log_path, policy).unwrap();

        device.write("yesterday\n").unwrap();
        let yesterday = Local::now() - Duration::days(1);
        device.last_write = yesterday;
        device.write("today\n").unwrap();

        let dated = dir
            .path()
            .join(format!("daily.log.{}", yesterday.format("%Y%m%d")));
        assert_eq!(fs::read_to_string(dated).unwrap(), "yesterday\n");
        assert_eq!(fs::read_to_string(&log_path).unwrap(), "today\n");
    }

    #[test]
    fn test_write_after_close_fails() {
        let dir = tempdir().unwrap();
        let mut device = RotatingFileDevice::with_policy(
            dir.path().join("closed.log"),
            RotationPolicy::new().with_age(1),
        )
        .unwrap();
        device.close().unwrap();
        assert!(device.write("late\n").is_err());
        assert!(device.fileno().is_none());
    }
}
