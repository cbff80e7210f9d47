//! Station configuration and config-file resolution
//!
//! The scheduler resolves its settings in priority order: command-line
//! argument, environment variable, `config.toml`, compiled default. The
//! pipeline runner uses a stricter required-environment model (see
//! wcrs-pull); only the station timezone and lead time are shared here.

use crate::error::{Error, Result};
use chrono::Duration;
use chrono_tz::Tz;
use std::path::PathBuf;

/// Default station zone when nothing is configured
pub const DEFAULT_STATION_TZ: &str = "America/New_York";

/// Default publish lead time in minutes
pub const DEFAULT_LEAD_TIME_MINUTES: i64 = 60;

/// Scheduling policy shared by the recurrence calculator and the episode
/// lifecycle checks. All recurrence math runs in this fixed zone, never
/// the caller's local zone.
#[derive(Debug, Clone, Copy)]
pub struct StationConfig {
    pub timezone: Tz,
    pub lead_time_minutes: i64,
}

impl StationConfig {
    pub fn new(timezone_name: &str, lead_time_minutes: i64) -> Result<Self> {
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|_| Error::Config(format!("unknown IANA timezone '{}'", timezone_name)))?;
        if lead_time_minutes < 0 {
            return Err(Error::Config(format!(
                "lead time must be non-negative, got {}",
                lead_time_minutes
            )));
        }
        Ok(Self {
            timezone,
            lead_time_minutes,
        })
    }

    pub fn lead_time(&self) -> Duration {
        Duration::minutes(self.lead_time_minutes)
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            lead_time_minutes: DEFAULT_LEAD_TIME_MINUTES,
        }
    }
}

/// Resolve a config value by priority: CLI argument, environment variable,
/// key in the wcrs config.toml, then None (caller applies its default).
pub fn resolve_setting(cli_arg: Option<&str>, env_var_name: &str, toml_key: &str) -> Option<String> {
    if let Some(value) = cli_arg {
        return Some(value.to_string());
    }
    if let Ok(value) = std::env::var(env_var_name) {
        return Some(value);
    }
    if let Some(config_path) = config_file_path() {
        if let Ok(content) = std::fs::read_to_string(&config_path) {
            if let Ok(table) = toml::from_str::<toml::Value>(&content) {
                if let Some(value) = table.get(toml_key).and_then(|v| v.as_str()) {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Platform config file: `~/.config/wcrs/config.toml` (or the OS
/// equivalent), falling back to `/etc/wcrs/config.toml` on Linux.
fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("wcrs").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }
    if cfg!(target_os = "linux") {
        let system = PathBuf::from("/etc/wcrs/config.toml");
        if system.exists() {
            return Some(system);
        }
    }
    None
}

/// OS-dependent default data folder for the scheduler database
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("wcrs"))
        .unwrap_or_else(|| PathBuf::from("./wcrs_data"))
}
