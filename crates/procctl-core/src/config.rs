//! Centralized configuration for procctl.
//!
//! The constants in [`ActionConfig`] are the timing contracts of the process
//! actions. [`ActionTimings`] carries them at runtime and can be overridden
//! from a JSON file.

use crate::error::{ProcctlError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const CONFIG_DIR_NAME: &'static str = "procctl";
    pub const TIMINGS_FILENAME: &'static str = "timings.json";
}

/// Timing constants for quit, force-quit and restart.
pub struct ActionConfig;

impl ActionConfig {
    // Quit / force-quit
    pub const QUIT_REFRESH_DELAY: Duration = Duration::from_millis(500);

    // Restart: graceful phase
    pub const POLL_INTERVAL: Duration = Duration::from_millis(250);
    pub const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(5);

    // Restart: escalation and relaunch
    pub const ESCALATE_SETTLE: Duration = Duration::from_millis(500);
    pub const RELAUNCH_SETTLE: Duration = Duration::from_millis(300);
    pub const POST_LAUNCH_REFRESH_DELAY: Duration = Duration::from_secs(1);
}

/// Runtime timing configuration, in milliseconds.
///
/// Missing fields fall back to the [`ActionConfig`] constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTimings {
    pub quit_refresh_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub graceful_timeout_ms: u64,
    pub escalate_settle_ms: u64,
    pub relaunch_settle_ms: u64,
    pub post_launch_refresh_delay_ms: u64,
}

impl Default for ActionTimings {
    fn default() -> Self {
        Self {
            quit_refresh_delay_ms: millis(ActionConfig::QUIT_REFRESH_DELAY),
            poll_interval_ms: millis(ActionConfig::POLL_INTERVAL),
            graceful_timeout_ms: millis(ActionConfig::GRACEFUL_TIMEOUT),
            escalate_settle_ms: millis(ActionConfig::ESCALATE_SETTLE),
            relaunch_settle_ms: millis(ActionConfig::RELAUNCH_SETTLE),
            post_launch_refresh_delay_ms: millis(ActionConfig::POST_LAUNCH_REFRESH_DELAY),
        }
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

impl ActionTimings {
    pub fn quit_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.quit_refresh_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn graceful_timeout(&self) -> Duration {
        Duration::from_millis(self.graceful_timeout_ms)
    }

    pub fn escalate_settle(&self) -> Duration {
        Duration::from_millis(self.escalate_settle_ms)
    }

    pub fn relaunch_settle(&self) -> Duration {
        Duration::from_millis(self.relaunch_settle_ms)
    }

    pub fn post_launch_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.post_launch_refresh_delay_ms)
    }

    /// Check that the polling loop is well-formed.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ProcctlError::Config {
                message: "poll_interval_ms must be greater than zero".into(),
            });
        }
        if self.poll_interval_ms > self.graceful_timeout_ms {
            return Err(ProcctlError::Config {
                message: format!(
                    "poll_interval_ms ({}) must not exceed graceful_timeout_ms ({})",
                    self.poll_interval_ms, self.graceful_timeout_ms
                ),
            });
        }
        Ok(())
    }

    /// Load timings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ProcctlError::io_with_path(e, path))?;
        let timings: ActionTimings = serde_json::from_str(&contents)?;
        timings.validate()?;
        debug!("Loaded action timings from {}", path.display());
        Ok(timings)
    }

    /// Load from `explicit` if given, else from the default location if a
    /// file exists there, else return the defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_timings_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

/// Default location of the timings file (`<config dir>/procctl/timings.json`).
pub fn default_timings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join(AppConfig::CONFIG_DIR_NAME)
            .join(AppConfig::TIMINGS_FILENAME)
    })
}
