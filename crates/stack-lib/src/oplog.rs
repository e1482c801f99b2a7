//! Operational log of manager actions
//!
//! One timestamped line per manager invocation, appended to `monstack.log`
//! at the deployment root. The log is plain truncation-managed: `clean`
//! empties it once it grows past the configured threshold.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;
use tracing::info;

use crate::error::{Result, StackError};

/// Append one action record. Best effort on an installed deployment; the
/// file is created on first use.
pub fn append(path: &Path, action: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StackError::io(path, e))?;
    let line = format!("{} {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"), action);
    file.write_all(line.as_bytes())
        .map_err(|e| StackError::io(path, e))?;
    Ok(())
}

/// Truncate the log if it exceeds `max_bytes`. Returns true when truncated.
pub fn truncate_if_oversized(path: &Path, max_bytes: u64) -> Result<bool> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return Ok(false),
    };
    if size <= max_bytes {
        return Ok(false);
    }
    fs::write(path, b"").map_err(|e| StackError::io(path, e))?;
    info!(log = %path.display(), size, "truncated oversized operational log");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_creates_and_accumulates() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("monstack.log");

        append(&log, "start").unwrap();
        append(&log, "stop").unwrap();

        let contents = fs::read_to_string(&log).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("start"));
        assert!(lines[1].ends_with("stop"));
    }

    #[test]
    fn test_truncate_under_threshold_is_noop() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("monstack.log");
        append(&log, "start").unwrap();

        assert!(!truncate_if_oversized(&log, 1024).unwrap());
        assert!(!fs::read_to_string(&log).unwrap().is_empty());
    }

    #[test]
    fn test_truncate_over_threshold() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("monstack.log");
        append(&log, "a long enough action line to cross the threshold").unwrap();

        assert!(truncate_if_oversized(&log, 10).unwrap());
        assert_eq!(fs::metadata(&log).unwrap().len(), 0);
    }

    #[test]
    fn test_truncate_missing_file_is_noop() {
        let dir = tempdir().unwrap();
        assert!(!truncate_if_oversized(&dir.path().join("absent.log"), 10).unwrap());
    }
}
