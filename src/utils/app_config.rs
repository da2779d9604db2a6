/// Application configuration management
/// Stores user preferences in ~/.config/dhm/config.toml

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::state::{MonitorMode, PollIntervals};
use crate::utils::constants::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub start_mode: MonitorMode,
    pub lite_interval_ms: u64,
    pub full_interval_ms: u64,
    pub inspect_timeout_ms: u64,
    pub stats_timeout_ms: u64,
    pub log_tail: usize,
    pub restart_grace_secs: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            start_mode: MonitorMode::Lite,
            lite_interval_ms: DEFAULT_LITE_INTERVAL.as_millis() as u64,
            full_interval_ms: DEFAULT_FULL_INTERVAL.as_millis() as u64,
            inspect_timeout_ms: DEFAULT_INSPECT_TIMEOUT.as_millis() as u64,
            stats_timeout_ms: DEFAULT_STATS_TIMEOUT.as_millis() as u64,
            log_tail: DEFAULT_LOG_TAIL,
            restart_grace_secs: DEFAULT_RESTART_GRACE.as_secs(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine the user config directory")?;
        Ok(config_dir.join(APP_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from file; a missing file yields defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("lite_interval_ms", self.lite_interval_ms),
            ("full_interval_ms", self.full_interval_ms),
            ("inspect_timeout_ms", self.inspect_timeout_ms),
            ("stats_timeout_ms", self.stats_timeout_ms),
        ];
        for (key, value) in durations {
            if value == 0 {
                bail!("{} must be greater than zero", key);
            }
        }
        if self.log_tail == 0 {
            bail!("log_tail must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_intervals(&self) -> PollIntervals {
        PollIntervals {
            lite: Duration::from_millis(self.lite_interval_ms),
            full: Duration::from_millis(self.full_interval_ms),
        }
    }

    pub fn inspect_timeout(&self) -> Duration {
        Duration::from_millis(self.inspect_timeout_ms)
    }

    pub fn stats_timeout(&self) -> Duration {
        Duration::from_millis(self.stats_timeout_ms)
    }

    pub fn restart_grace(&self) -> Duration {
        Duration::from_secs(self.restart_grace_secs)
    }

    /// Log file from config, else `<data dir>/dhm/dhm.log`
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join(APP_DIR_NAME).join("dhm.log")))
    }
}
