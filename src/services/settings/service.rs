use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::Settings;

/// Overrides the config file location when set.
pub const CONFIG_ENV_VAR: &str = "COURSE_PLANNER_CONFIG";

const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "courses.db";

/// Loads and saves [`Settings`] from a TOML file.
pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    /// Service bound to an explicit config file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service bound to `$COURSE_PLANNER_CONFIG`, or `config.toml` in the
    /// platform config directory.
    pub fn from_environment() -> Self {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Self::new(PathBuf::from(path));
        }

        match project_dirs() {
            Some(dirs) => Self::new(dirs.config_dir().join(CONFIG_FILE)),
            None => {
                log::warn!("Unable to resolve project directory; using current dir for config");
                Self::new(CONFIG_FILE)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields the defaults.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            log::debug!("No config at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {}", self.path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", self.path.display()))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings in {}: {}", self.path.display(), e))?;

        Ok(settings)
    }

    /// Validate and write settings, creating the parent directory.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config to {}", self.path.display()))?;
        Ok(())
    }

    /// Where the database lives: the configured path, else the platform
    /// data directory, else the current directory.
    pub fn database_path(settings: &Settings) -> PathBuf {
        if let Some(path) = &settings.database_path {
            return path.clone();
        }

        match project_dirs() {
            Some(dirs) => dirs.data_dir().join(DATABASE_FILE),
            None => {
                log::warn!("Unable to resolve project directory; using current dir for database");
                PathBuf::from(DATABASE_FILE)
            }
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "CoursePlanner", "CoursePlanner")
}
