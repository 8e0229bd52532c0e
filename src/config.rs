//! Recorder configuration. File values are defaults; command-line flags win.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_OUTPUT_PREFIX: &str = "./output";
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Timestamp appended to the prefix when naming the output file.
const FILE_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Output file prefix; the startup timestamp and `.csv` are appended
    pub output_prefix: String,
    /// Sampling interval (milliseconds)
    pub interval_ms: u64,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sampling interval must be greater than zero")]
    ZeroInterval,
    #[error("output prefix must not be empty")]
    EmptyPrefix,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            interval_ms: DEFAULT_INTERVAL_MS,
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl RecorderConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<RecorderConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        output_prefix: Option<String>,
        interval_ms: Option<u64>,
    ) -> Self {
        if let Some(prefix) = output_prefix {
            self.output_prefix = prefix;
        }
        if let Some(ms) = interval_ms {
            self.interval_ms = ms;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.output_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// `<prefix><YYYYMMDDHHMMSS>.csv` for the given start instant.
    pub fn output_path(&self, started_at: DateTime<Local>) -> PathBuf {
        PathBuf::from(format!(
            "{}{}.csv",
            self.output_prefix,
            started_at.format(FILE_STAMP_FORMAT)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_match_original_flags() {
        let c = RecorderConfig::default();
        assert_eq!(c.output_prefix, "./output");
        assert_eq!(c.interval_ms, 1000);
        assert_eq!(c.interval(), Duration::from_secs(1));
    }

    #[test]
    fn output_path_appends_stamp_and_extension() {
        let c = RecorderConfig::default();
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(c.output_path(at), PathBuf::from("./output20240309070501.csv"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let c = RecorderConfig::default().with_overrides(Some("/tmp/run".into()), Some(500));
        assert_eq!(c.output_prefix, "/tmp/run");
        assert_eq!(c.interval_ms, 500);

        let untouched = RecorderConfig::default().with_overrides(None, None);
        assert_eq!(untouched.interval_ms, 1000);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysstats.json");
        std::fs::write(&path, r#"{"interval_ms": 250}"#).unwrap();
        let c = RecorderConfig::load(&path);
        assert_eq!(c.interval_ms, 250);
        assert_eq!(c.output_prefix, DEFAULT_OUTPUT_PREFIX);
        assert_eq!(c.log.level, "info");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let c = RecorderConfig::default().with_overrides(None, Some(0));
        assert_eq!(c.validate(), Err(ConfigError::ZeroInterval));
    }
}
