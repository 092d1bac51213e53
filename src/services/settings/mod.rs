// Settings service module
// Locates, loads and saves the TOML configuration file

mod service;

pub use service::{SettingsService, CONFIG_ENV_VAR};
