use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{LOG_FILE_SUFFIX, TracingConfig};

const ARCHIVE_EXTENSION: &str = "gz";
const PARTIAL_EXTENSION: &str = "partial";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of a single archival pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveReport {
    pub compressed: usize,
    pub pruned: usize,
    /// Files that could not be compressed or deleted this pass.
    pub failed: usize,
}

/// Compresses rotated log files and deletes archives past the retention
/// window.
///
/// Works on the `<prefix>.<YYYY-MM-DD>.log` names written by the daily
/// rolling appender. The file for the current UTC day is never touched.
#[derive(Debug, Clone)]
pub struct LogArchiver {
    log_dir: PathBuf,
    file_prefix: String,
    retention_days: u32,
}

impl LogArchiver {
    pub fn new(config: &TracingConfig) -> Self {
        Self {
            log_dir: config.log_dir.clone(),
            file_prefix: config.file_prefix.clone(),
            retention_days: config.retention_days,
        }
    }

    pub fn run_once(&self) -> io::Result<ArchiveReport> {
        self.run_once_at(Utc::now())
    }

    pub fn run_once_at(&self, now: DateTime<Utc>) -> io::Result<ArchiveReport> {
        let today = now.date_naive();
        let oldest_kept = today - chrono::Duration::days(i64::from(self.retention_days));
        let mut report = ArchiveReport::default();

        let archive_suffix = format!("{LOG_FILE_SUFFIX}.{ARCHIVE_EXTENSION}");
        let partial_suffix = format!("{archive_suffix}.{PARTIAL_EXTENSION}");

        // Passes never overlap, so any partial archive is left over from an
        // interrupted run.
        for (path, _) in self.dated_files(&partial_suffix)? {
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "Failed to remove partial log archive");
                report.failed += 1;
            }
        }

        for (path, date) in self.dated_files(LOG_FILE_SUFFIX)? {
            if date >= today {
                continue;
            }
            match compress(&path) {
                Ok(_) => report.compressed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to compress rotated log file");
                    report.failed += 1;
                }
            }
        }

        for (path, date) in self.dated_files(&archive_suffix)? {
            if date >= oldest_kept {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "Pruned expired log archive");
                    report.pruned += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to prune log archive");
                    report.failed += 1;
                }
            }
        }

        if report != ArchiveReport::default() {
            info!(
                compressed = report.compressed,
                pruned = report.pruned,
                failed = report.failed,
                "Log archival pass finished"
            );
        }

        Ok(report)
    }

    /// Runs an archival pass immediately and then every `period`.
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let archiver = self.clone();
                match tokio::task::spawn_blocking(move || archiver.run_once()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => warn!(error = %e, "Log archival pass failed"),
                    Err(e) => warn!(error = %e, "Log archival task panicked"),
                }
            }
        })
    }

    fn dated_files(&self, suffix: &str) -> io::Result<Vec<(PathBuf, NaiveDate)>> {
        let prefix = format!("{}.", self.file_prefix);
        let suffix = format!(".{suffix}");
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.log_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(date) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(&suffix))
                .and_then(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).ok())
            else {
                continue;
            };
            files.push((path, date));
        }

        Ok(files)
    }
}

fn compress(path: &Path) -> io::Result<PathBuf> {
    let target = path.with_extension(format!("{LOG_FILE_SUFFIX}.{ARCHIVE_EXTENSION}"));
    let partial = path.with_extension(format!(
        "{LOG_FILE_SUFFIX}.{ARCHIVE_EXTENSION}.{PARTIAL_EXTENSION}"
    ));

    let mut input = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&partial)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::rename(&partial, &target)?;
    fs::remove_file(path)?;
    debug!(path = %target.display(), "Compressed rotated log file");

    Ok(target)
}
