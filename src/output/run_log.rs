//! Append-only run log
//!
//! Every state transition, skip, retry, and failure of a crawl run is
//! appended here with an RFC 3339 timestamp, surviving across runs (the file
//! is opened in append mode). Logging failures are reported via `tracing`
//! but never interrupt the crawl.

use crate::Result;
use chrono::{SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Timestamped append-only log file for one crawl target
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RunLog {
    /// Opens (or creates) the log file in append mode
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one timestamped line
    pub fn append(&self, message: &str) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut file = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(file, "[{}] {}", timestamp, message) {
            tracing::warn!("Failed to write run log entry: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_writes_timestamped_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawl.log");

        let log = RunLog::open(&path).unwrap();
        log.append("first");
        log.append("second");
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
    }

    #[test]
    fn test_reopen_appends_not_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawl.log");

        RunLog::open(&path).unwrap().append("run one");
        RunLog::open(&path).unwrap().append("run two");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/logs/crawl.log");
        let log = RunLog::open(&path).unwrap();
        log.append("x");
        assert!(path.exists());
    }
}
