//! Process-wide tracing setup: an env-filtered fmt subscriber writing to a
//! daily rolling file, optionally mirrored to stdout.

use crate::{config::LoggingConfig, paths::AppDirs};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

/// Keeps the background file writer alive; dropping it flushes pending lines.
pub struct LoggingGuard {
    _worker: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

pub fn init_logging(config: &LoggingConfig, dirs: &AppDirs) -> Result<LoggingGuard, LoggingError> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|source| LoggingError::Filter {
        directive: config.filter.clone(),
        source,
    })?;

    let files = LogFiles::prepare(dirs.log_dir(), &config.file_name)?;
    let pruned = files.prune(config.retain_files.max(1))?;
    let (file_writer, worker) = tracing_appender::non_blocking(files.appender());
    let writer = if config.stdout {
        BoxMakeWriter::new(std::io::stdout.and(file_writer))
    } else {
        BoxMakeWriter::new(file_writer)
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.stdout)
        .with_writer(writer)
        .try_init()
        .map_err(LoggingError::SubscriberInstall)?;

    tracing::debug!(dir = %files.dir.display(), pruned, "logging initialised");
    Ok(LoggingGuard {
        _worker: worker,
        log_dir: files.dir,
    })
}

/// Rolling log files sharing one name prefix inside a directory.
struct LogFiles {
    dir: PathBuf,
    prefix: String,
}

impl LogFiles {
    fn prepare(dir: &Path, prefix: &str) -> Result<Self, LoggingError> {
        fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        })
    }

    /// Existing log files, oldest first.
    fn existing(&self) -> Result<Vec<PathBuf>, LoggingError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| LoggingError::ReadDir {
            path: self.dir.clone(),
            source,
        })?;
        let mut files: Vec<(SystemTime, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&self.prefix))
            .filter_map(|entry| {
                let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
                Some((modified, entry.path()))
            })
            .collect();
        files.sort();
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }

    /// Deletes the oldest files so that at most `keep` remain. Returns how
    /// many were removed.
    fn prune(&self, keep: usize) -> Result<usize, LoggingError> {
        let files = self.existing()?;
        let excess = files.len().saturating_sub(keep);
        for path in &files[..excess] {
            fs::remove_file(path).map_err(|source| LoggingError::Cleanup {
                path: path.clone(),
                source,
            })?;
        }
        Ok(excess)
    }

    fn appender(&self) -> RollingFileAppender {
        tracing_appender::rolling::daily(&self.dir, &self.prefix)
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid log filter {directive:?}: {source}")]
    Filter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    SubscriberInstall(Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to list log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove old log file {path}: {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}
