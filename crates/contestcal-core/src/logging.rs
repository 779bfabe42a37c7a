//! Log setup for the `contestcal` binary.
//!
//! Console output always; scheduled runs usually add a log file so each
//! run leaves a trace after the terminal is gone. The file rolls over daily
//! and only the newest [`TracingConfig::log_keep`] files are kept.
//! `RUST_LOG` overrides the configured level.
//!
//! ```ignore
//! use contestcal_core::logging::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::default().with_log_file("log/contestcal.log"))?;
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::Level;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to create log directory {}: {source}", .path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: InitError,
    },
}

/// Rotated log files kept when none is configured.
pub const DEFAULT_LOG_KEEP: usize = 7;

/// Record layout, shared by console and file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line, for reading one run by eye.
    Pretty,
    #[default]
    Compact,
    /// One JSON object per record.
    Json,
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for `contestcal*` targets when `RUST_LOG` is unset.
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Add file and line to console records.
    pub include_location: bool,
    /// Full filter directive, replacing `default_level`.
    pub env_filter: Option<String>,
    /// Also write records here, without ANSI colors. The date is inserted
    /// before the extension: `log/contestcal.log` becomes
    /// `log/contestcal.2024-03-15.log`.
    pub log_file: Option<PathBuf>,
    /// Daily files to keep before the oldest is deleted.
    pub log_keep: usize,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            env_filter: None,
            log_file: None,
            log_keep: DEFAULT_LOG_KEEP,
        }
    }
}

impl TracingConfig {
    /// Debug level with source locations, for `-v`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_log_keep(mut self, keep: usize) -> Self {
        self.log_keep = keep.max(1);
        self
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.env_filter {
            return Ok(EnvFilter::try_new(directive)?);
        }
        let fallback = format!("contestcal={}", self.default_level);
        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn console_layer(config: &TracingConfig) -> BoxedLayer {
    let layer = fmt::layer()
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.output_format {
        TracingOutputFormat::Pretty => layer.pretty().boxed(),
        TracingOutputFormat::Compact => layer.compact().boxed(),
        TracingOutputFormat::Json => layer.json().boxed(),
    }
}

fn rolling_appender(path: &Path, keep: usize) -> Result<RollingFileAppender, TracingError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| TracingError::LogDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let prefix = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("contestcal");
    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(keep.max(1));
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        builder = builder.filename_suffix(ext);
    }
    builder.build(dir).map_err(|source| TracingError::LogFile {
        path: path.to_path_buf(),
        source,
    })
}

fn file_layer(config: &TracingConfig, path: &Path) -> Result<BoxedLayer, TracingError> {
    let layer = fmt::layer()
        .with_ansi(false)
        .with_writer(rolling_appender(path, config.log_keep)?);

    Ok(match config.output_format {
        TracingOutputFormat::Json => layer.json().boxed(),
        _ => layer.boxed(),
    })
}

/// Installs the global subscriber. Call once, before any work.
///
/// # Errors
///
/// Fails if a subscriber is already installed, the filter directive does
/// not parse, or the log directory cannot be created.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;

    let mut layers = vec![console_layer(&config)];
    if let Some(ref path) = config.log_file {
        layers.push(file_layer(&config, path)?);
    }

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(layers).with(filter))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, Level::INFO);
        assert_eq!(config.output_format, TracingOutputFormat::Compact);
        assert!(!config.include_location);
        assert!(config.env_filter.is_none());
        assert!(config.log_file.is_none());
        assert_eq!(config.log_keep, DEFAULT_LOG_KEEP);

        let debug = TracingConfig::cli_debug();
        assert_eq!(debug.default_level, Level::DEBUG);
        assert!(debug.include_location);
    }

    #[test]
    fn builders() {
        let config = TracingConfig::default()
            .with_level(Level::WARN)
            .with_format(TracingOutputFormat::Json)
            .with_env_filter("contestcal_sync=trace")
            .with_log_file("log/contestcal.log")
            .with_log_keep(0);

        assert_eq!(config.default_level, Level::WARN);
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("contestcal_sync=trace"));
        assert_eq!(config.log_file, Some(PathBuf::from("log/contestcal.log")));
        assert_eq!(config.log_keep, 1);
    }

    #[test]
    fn bad_directive_is_rejected() {
        let config = TracingConfig::default().with_env_filter("contestcal=verbose");
        assert!(matches!(config.filter(), Err(TracingError::EnvFilter(_))));
    }

    fn log_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn log_file_rolls_by_date_under_new_directory() {
        use std::io::Write;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("log");
        let path = dir.join("contestcal.log");

        let mut appender = rolling_appender(&path, DEFAULT_LOG_KEEP).unwrap();
        appender.write_all(b"first run\n").unwrap();
        appender.flush().unwrap();

        let names = log_names(&dir);
        assert_eq!(names.len(), 1);
        let name = &names[0];
        assert!(name.starts_with("contestcal.") && name.ends_with(".log"), "{}", name);
        assert_ne!(name, "contestcal.log");
        assert_eq!(std::fs::read_to_string(dir.join(name)).unwrap(), "first run\n");

        let mut again = rolling_appender(&path, DEFAULT_LOG_KEEP).unwrap();
        again.write_all(b"second run\n").unwrap();
        again.flush().unwrap();
        assert_eq!(log_names(&dir), names);
        assert_eq!(
            std::fs::read_to_string(dir.join(name)).unwrap(),
            "first run\nsecond run\n"
        );

        assert!(file_layer(&TracingConfig::default(), &path).is_ok());
    }

    #[test]
    fn log_directory_that_is_a_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("log");
        std::fs::write(&blocker, "").unwrap();

        let err = rolling_appender(&blocker.join("contestcal.log"), 3).unwrap_err();
        assert!(matches!(err, TracingError::LogDir { .. }));
    }
}
