//! Application configuration management

mod options;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use options::{AutoOrganizeOptions, MovieFileOrganizationOptions, TvFileOrganizationOptions};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Organizer options file (JSON)
    pub options_path: PathBuf,

    /// Organization log file (JSON)
    pub results_path: PathBuf,

    /// Emit logs as JSON lines instead of human readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let options_path = match env::var("AUTO_ORGANIZE_CONFIG") {
            Ok(path) => PathBuf::from(path),
            Err(_) => dirs::config_dir()
                .map(|dir| dir.join("auto-organize").join("options.json"))
                .context("No AUTO_ORGANIZE_CONFIG set and no user config directory available")?,
        };

        Ok(Self {
            options_path,

            results_path: env::var("AUTO_ORGANIZE_RESULTS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/autoorganize.json")),

            log_json: env::var("AUTO_ORGANIZE_LOG_JSON")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Organizer options from [Config::options_path]
    pub fn load_options(&self) -> Result<AutoOrganizeOptions> {
        AutoOrganizeOptions::load(&self.options_path)
    }
}
