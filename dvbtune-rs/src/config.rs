//! `dvbtune.toml` configuration file.

use std::path::{Path, PathBuf};

use dvbtune::protocol::TuningParams;
use dvbtune::tuner::{CaptureMode, DEFAULT_BUFFER_SIZE};
use serde::Deserialize;

/// File picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "dvbtune.toml";

/// Configuration file format.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub device: DeviceSection,
    #[serde(default)]
    pub logging: LoggingSection,
    /// Channel tuned when no frequency is given on the command line.
    pub channel: Option<TuningParams>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct DeviceSection {
    pub adapter: Option<u8>,
    pub device: Option<u8>,
    /// Capture the whole transport stream.
    pub budget: Option<bool>,
    /// Add PIDs to the hardware demux filter instead of emulating it.
    pub hw_pid_filter: Option<bool>,
    pub buffer_size: Option<u32>,
}

impl DeviceSection {
    /// Budget wins over the hardware filter; neither means emulation.
    pub fn capture_mode(&self) -> CaptureMode {
        if self.budget.unwrap_or(false) {
            CaptureMode::Budget
        } else if self.hw_pid_filter.unwrap_or(false) {
            CaptureMode::HardwareFilter
        } else {
            CaptureMode::Emulated
        }
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
    }
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct LoggingSection {
    pub log_dir: Option<String>,
    pub retention_days: Option<u64>,
    pub level: Option<String>,
}

pub(crate) fn load_config(path: &Path) -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Explicit path > auto-detect > none.
pub(crate) fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Some(default_path)
        } else {
            None
        }
    })
}
