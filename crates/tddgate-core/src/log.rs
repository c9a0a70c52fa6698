//! Append-only enforcement log.
//!
//! One line per decision:
//!
//! ```text
//! YYYY-MM-DD HH:MM:SS,<ACTION>,<REASON>,<file_path>
//! ```
//!
//! The format is shared with external usage-analysis scripts and must stay
//! byte-for-byte stable. The path is the last field and may itself contain
//! commas.

use crate::error::{GuardError, Result};
use crate::paths;
use crate::types::{Action, Reason};
use chrono::{Local, NaiveDateTime};
use fs2::FileExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// LogEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub action: Action,
    pub reason: Reason,
    pub file_path: String,
}

impl LogEntry {
    pub fn now(action: Action, reason: Reason, file_path: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            action,
            reason,
            file_path: file_path.into(),
        }
    }

    /// Render without the trailing newline. Line breaks inside the path are
    /// replaced with spaces so one entry is always one line.
    pub fn to_line(&self) -> String {
        let path: String = self
            .file_path
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        format!(
            "{},{},{},{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.action,
            self.reason,
            path
        )
    }

    pub fn parse_line(line: &str) -> Result<Self> {
        let invalid = || GuardError::InvalidLogLine(line.to_string());
        let mut fields = line.splitn(4, ',');
        let (Some(ts), Some(action), Some(reason), Some(file_path)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };
        let timestamp = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).map_err(|_| invalid())?;
        Ok(Self {
            timestamp,
            action: action.parse()?,
            reason: reason.parse()?,
            file_path: file_path.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// EnforcementLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EnforcementLog {
    path: PathBuf,
    max_size_bytes: u64,
}

impl EnforcementLog {
    pub fn new(path: impl Into<PathBuf>, max_size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            max_size_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `entry`. Never fails: the caller's decision stands whether or
    /// not the audit line could be written.
    pub fn append(&self, entry: &LogEntry) {
        if let Err(e) = self.try_append(entry) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to write enforcement log"
            );
        }
    }

    pub fn try_append(&self, entry: &LogEntry) -> Result<()> {
        if crate::io::file_len(&self.path)? > self.max_size_bytes {
            if let Err(e) = self.rotate_if_over() {
                tracing::warn!(error = %e, "log rotation failed");
            }
        }
        crate::io::append_line(&self.path, &entry.to_line())
    }

    /// Rotate when the active file exceeds the threshold. Returns whether a
    /// rotation happened. The size is re-checked under the lock so two
    /// processes racing past the threshold rotate only once.
    pub fn rotate_if_over(&self) -> Result<bool> {
        self.with_rotation_lock(|| {
            if crate::io::file_len(&self.path)? <= self.max_size_bytes {
                return Ok(false);
            }
            std::fs::rename(&self.path, paths::rotated_path(&self.path))?;
            Ok(true)
        })
    }

    /// Rotate unconditionally. Returns false when there was nothing to rotate.
    pub fn rotate_now(&self) -> Result<bool> {
        self.with_rotation_lock(|| {
            if !self.path.exists() {
                return Ok(false);
            }
            std::fs::rename(&self.path, paths::rotated_path(&self.path))?;
            Ok(true)
        })
    }

    fn with_rotation_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let lock = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(paths::lock_path(&self.path))?;
        lock.lock_exclusive()?;
        let result = f();
        let _ = lock.unlock();
        result
    }

    /// Read every well-formed entry from the active file. Returns the entries
    /// and the number of lines that could not be parsed.
    pub fn read_entries(&self) -> Result<(Vec<LogEntry>, usize)> {
        read_entries(&self.path)
    }
}

pub fn read_entries(path: &Path) -> Result<(Vec<LogEntry>, usize)> {
    if !path.exists() {
        return Ok((Vec::new(), 0));
    }
    let data = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();
    let mut malformed = 0;
    for line in data.lines().filter(|l| !l.trim().is_empty()) {
        match LogEntry::parse_line(line) {
            Ok(entry) => entries.push(entry),
            Err(_) => malformed += 1,
        }
    }
    Ok((entries, malformed))
}

// ---------------------------------------------------------------------------
// LogSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct LogSummary {
    pub total: usize,
    pub allowed: usize,
    pub blocked: usize,
    pub malformed: usize,
    pub by_reason: BTreeMap<Reason, usize>,
    /// Most frequently blocked paths, highest count first.
    pub top_blocked: Vec<BlockedPath>,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedPath {
    pub file_path: String,
    pub count: usize,
}

pub fn summarize(entries: &[LogEntry], malformed: usize, top: usize) -> LogSummary {
    let mut summary = LogSummary {
        malformed,
        ..LogSummary::default()
    };
    let mut blocked: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in entries {
        summary.total += 1;
        match entry.action {
            Action::Allow => summary.allowed += 1,
            Action::Block => {
                summary.blocked += 1;
                *blocked.entry(entry.file_path.as_str()).or_default() += 1;
            }
        }
        *summary.by_reason.entry(entry.reason).or_default() += 1;
        summary.first = Some(summary.first.map_or(entry.timestamp, |t| t.min(entry.timestamp)));
        summary.last = Some(summary.last.map_or(entry.timestamp, |t| t.max(entry.timestamp)));
    }
    let mut ranked: Vec<BlockedPath> = blocked
        .into_iter()
        .map(|(file_path, count)| BlockedPath {
            file_path: file_path.to_string(),
            count,
        })
        .collect();
    // BTreeMap order makes ties alphabetical; the sort is stable.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top);
    summary.top_blocked = ranked;
    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn entry(action: Action, reason: Reason, path: &str) -> LogEntry {
        LogEntry {
            timestamp: at(14, 5, 9),
            action,
            reason,
            file_path: path.to_string(),
        }
    }

    #[test]
    fn line_format_is_exact() {
        let e = entry(Action::Block, Reason::NoTests, "src/foo.py");
        assert_eq!(e.to_line(), "2026-03-09 14:05:09,BLOCK,NO_TESTS,src/foo.py");
        let e = entry(Action::Allow, Reason::Default, "");
        assert_eq!(e.to_line(), "2026-03-09 14:05:09,ALLOW,DEFAULT,");
    }

    #[test]
    fn parse_keeps_commas_in_path() {
        let e = LogEntry::parse_line("2026-03-09 14:05:09,ALLOW,HAS_TESTS,src/a,b.py").unwrap();
        assert_eq!(e.file_path, "src/a,b.py");
        assert_eq!(e.reason, Reason::HasTests);
        assert_eq!(e.timestamp, at(14, 5, 9));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(LogEntry::parse_line("hello").is_err());
        assert!(LogEntry::parse_line("yesterday,ALLOW,TEST_FILE,a").is_err());
        assert!(LogEntry::parse_line("2026-03-09 14:05:09,MAYBE,TEST_FILE,a").is_err());
        assert!(LogEntry::parse_line("2026-03-09 14:05:09,ALLOW,WHATEVER,a").is_err());
    }

    #[test]
    fn newlines_in_path_stay_on_one_line() {
        let e = entry(Action::Allow, Reason::OtherFile, "a\nb");
        assert_eq!(e.to_line().lines().count(), 1);
    }

    #[test]
    fn append_writes_one_line_per_call() {
        let dir = TempDir::new().unwrap();
        let log = EnforcementLog::new(dir.path().join("logs/tdd.log"), 1024 * 1024);
        log.append(&entry(Action::Allow, Reason::TestFile, "tests/test_a.py"));
        log.append(&entry(Action::Block, Reason::NoTests, "a.py"));
        let (entries, malformed) = log.read_entries().unwrap();
        assert_eq!(malformed, 0);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].file_path, "a.py");
    }

    #[test]
    fn rotation_moves_oversized_log_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tdd.log");
        let log = EnforcementLog::new(&path, 10);
        std::fs::write(&path, "x".repeat(11)).unwrap();
        std::fs::write(paths::rotated_path(&path), "previous generation").unwrap();

        log.append(&entry(Action::Allow, Reason::ConfigFile, "README.md"));

        let old = std::fs::read_to_string(paths::rotated_path(&path)).unwrap();
        assert_eq!(old, "x".repeat(11));
        let current = std::fs::read_to_string(&path).unwrap();
        assert_eq!(current, "2026-03-09 14:05:09,ALLOW,CONFIG_FILE,README.md\n");
    }

    #[test]
    fn no_rotation_at_or_below_threshold() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tdd.log");
        let log = EnforcementLog::new(&path, 10);
        std::fs::write(&path, "x".repeat(10)).unwrap();
        assert!(!log.rotate_if_over().unwrap());
        assert!(!paths::rotated_path(&path).exists());
    }

    #[test]
    fn rotate_now_without_log_is_noop() {
        let dir = TempDir::new().unwrap();
        let log = EnforcementLog::new(dir.path().join("tdd.log"), 10);
        assert!(!log.rotate_now().unwrap());
        log.append(&entry(Action::Allow, Reason::OtherFile, "x.css"));
        assert!(log.rotate_now().unwrap());
        assert!(!log.path().exists());
        assert!(paths::rotated_path(log.path()).exists());
    }

    #[test]
    fn append_swallows_write_failures() {
        let dir = TempDir::new().unwrap();
        // A regular file sits where the log directory should be.
        std::fs::write(dir.path().join("blocker"), "x").unwrap();
        let log = EnforcementLog::new(dir.path().join("blocker/tdd.log"), 10);
        log.append(&entry(Action::Block, Reason::NoTests, "a.py"));
        assert!(log.try_append(&entry(Action::Block, Reason::NoTests, "a.py")).is_err());
    }

    #[test]
    fn read_counts_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tdd.log");
        std::fs::write(
            &path,
            "2026-03-09 14:05:09,ALLOW,TEST_FILE,t.py\nnot a line\n\n2026-03-09 14:05:10,BLOCK,NO_TESTS,a.py\n",
        )
        .unwrap();
        let (entries, malformed) = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(malformed, 1);
    }

    #[test]
    fn summary_counts_and_ranks() {
        let mut entries = vec![
            entry(Action::Block, Reason::NoTests, "b.py"),
            entry(Action::Block, Reason::NoTests, "a.py"),
            entry(Action::Block, Reason::NoTests, "b.py"),
            entry(Action::Allow, Reason::HasTests, "c.py"),
            entry(Action::Allow, Reason::ConfigFile, "README.md"),
        ];
        entries[4].timestamp = at(15, 0, 0);
        entries[0].timestamp = at(9, 0, 0);

        let summary = summarize(&entries, 2, 5);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.allowed, 2);
        assert_eq!(summary.blocked, 3);
        assert_eq!(summary.malformed, 2);
        assert_eq!(summary.by_reason[&Reason::NoTests], 3);
        assert_eq!(summary.by_reason[&Reason::HasTests], 1);
        assert_eq!(
            summary.top_blocked,
            vec![
                BlockedPath {
                    file_path: "b.py".into(),
                    count: 2
                },
                BlockedPath {
                    file_path: "a.py".into(),
                    count: 1
                },
            ]
        );
        assert_eq!(summary.first, Some(at(9, 0, 0)));
        assert_eq!(summary.last, Some(at(15, 0, 0)));

        let limited = summarize(&entries, 0, 1);
        assert_eq!(limited.top_blocked.len(), 1);
    }
}
