// Settings module
// Application configuration, stored as TOML in the user's config directory

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::course::time_code::MAX_ENCODED_PERIOD;
use crate::models::course_type::DEFAULT_COURSE_TYPE;
use crate::utils::color::{is_valid_hex_color, DEFAULT_COURSE_COLOR};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite file; `None` means the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Number of period rows in the weekly grid.
    pub periods_per_day: u8,
    /// Default `env_logger` filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub default_type: String,
    pub default_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            periods_per_day: 8,
            log_level: "info".to_string(),
            default_type: DEFAULT_COURSE_TYPE.to_string(),
            default_color: DEFAULT_COURSE_COLOR.to_string(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.periods_per_day == 0 || self.periods_per_day > MAX_ENCODED_PERIOD {
            return Err(format!(
                "periods_per_day must be between 1 and {}",
                MAX_ENCODED_PERIOD
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(format!("Unknown log level '{}'", self.log_level));
        }

        if self.default_type.trim().is_empty() {
            return Err("default_type cannot be empty".to_string());
        }

        if !is_valid_hex_color(&self.default_color) {
            return Err(format!("Invalid default_color '{}'", self.default_color));
        }

        Ok(())
    }
}
