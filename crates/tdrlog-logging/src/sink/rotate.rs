//! Size-bounded rotating log file
//!
//! The active file is rolled over when the next write would push it past
//! `max_size`. The old file is renamed to `<stem>-<timestamp>.<ext>` in the
//! same directory, then old backups are pruned: only the newest
//! `max_backups` are kept and backups older than `max_age` are removed
//! (a zero limit disables that rule).

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, warn};

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const MEGABYTE: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Rollover and retention limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Maximum size of the active file in bytes
    pub max_size: u64,
    /// Number of backups to keep (0 keeps all)
    pub max_backups: usize,
    /// Maximum backup age (zero keeps all)
    pub max_age: Duration,
}

impl RotationPolicy {
    /// Limits expressed the way the configuration does: megabytes and days
    pub fn from_units(max_size_mb: u64, max_backups: usize, max_age_days: u64) -> Self {
        Self {
            max_size: max_size_mb.saturating_mul(MEGABYTE),
            max_backups,
            max_age: DAY.saturating_mul(u32::try_from(max_age_days).unwrap_or(u32::MAX)),
        }
    }
}

/// Append-only file that rotates itself
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    file: BufWriter<File>,
    size: u64,
}

impl RotatingFile {
    /// Open (or create) the active file, creating its directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened for appending.
    pub fn open(path: impl AsRef<Path>, policy: RotationPolicy) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!(path = %parent.display(), "Creating log directory");
                fs::create_dir_all(parent)?;
            }
        }
        let file = open_append(&path)?;
        let size = file.metadata()?.len();
        debug!(path = %path.display(), size, "Log file opened");

        Ok(Self {
            path,
            policy,
            file: BufWriter::new(file),
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes in the active file, buffered writes included
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Roll the active file over now
    ///
    /// # Errors
    ///
    /// Returns an error if the active file cannot be renamed or reopened.
    pub fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let backup = self.backup_path();
        fs::rename(&self.path, &backup)?;
        self.file = BufWriter::new(open_append(&self.path)?);
        self.size = 0;
        debug!(backup = %backup.display(), "Rotated log file");

        self.prune();
        Ok(())
    }

    /// Backups of this file, newest first
    pub fn backups(&self) -> Vec<PathBuf> {
        let mut found: Vec<(NaiveDateTime, PathBuf)> = self
            .list_dir()
            .into_iter()
            .filter_map(|p| self.backup_time(&p).map(|t| (t, p)))
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));
        found.into_iter().map(|(_, p)| p).collect()
    }

    fn prune(&self) {
        let now = Utc::now().naive_utc();
        let max_age = chrono::Duration::from_std(self.policy.max_age).ok();

        for (i, backup) in self.backups().into_iter().enumerate() {
            let too_many = self.policy.max_backups > 0 && i >= self.policy.max_backups;
            let too_old = match (max_age, self.backup_time(&backup)) {
                (Some(age), Some(time)) if !self.policy.max_age.is_zero() => now - time > age,
                _ => false,
            };
            if too_many || too_old {
                if let Err(e) = fs::remove_file(&backup) {
                    warn!(path = %backup.display(), error = %e, "Failed to remove old log backup");
                }
            }
        }
    }

    fn stem_and_ext(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|s| format!(".{}", s.to_string_lossy()))
            .unwrap_or_default();
        (stem, ext)
    }

    fn backup_path(&self) -> PathBuf {
        let (stem, ext) = self.stem_and_ext();
        let stamp = Utc::now().format(BACKUP_TIME_FORMAT);
        self.path.with_file_name(format!("{stem}-{stamp}{ext}"))
    }

    fn backup_time(&self, candidate: &Path) -> Option<NaiveDateTime> {
        let (stem, ext) = self.stem_and_ext();
        let name = candidate.file_name()?.to_str()?;
        let stamp = name
            .strip_prefix(stem.as_str())?
            .strip_prefix('-')?
            .strip_suffix(ext.as_str())?;
        NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()
    }

    fn list_dir(&self) -> Vec<PathBuf> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        match fs::read_dir(&dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Failed to list log directory");
                Vec::new()
            }
        }
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len() as u64;
        if len > self.policy.max_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write of {len} bytes exceeds maximum file size of {} bytes",
                    self.policy.max_size
                ),
            ));
        }
        if self.size + len > self.policy.max_size {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.size += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_data()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
