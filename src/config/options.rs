//! Organizer options
//!
//! Serialized as camelCase JSON; every field has a default so partial option
//! files load cleanly.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoOrganizeOptions {
    pub tv: TvFileOrganizationOptions,
    pub movie: MovieFileOrganizationOptions,
}

impl AutoOrganizeOptions {
    /// Read options from a JSON file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No options file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        let options = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid options file {}", path.display()))?;

        info!(path = %path.display(), "Loaded organizer options");
        Ok(options)
    }
}

/// Episode organization options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TvFileOrganizationOptions {
    pub is_enabled: bool,
    pub min_file_size_mb: u64,
    pub left_over_file_extensions_to_delete: Vec<String>,
    pub watch_locations: Vec<String>,
    pub ignored_file_name_contains: Vec<String>,
    pub season_folder_pattern: String,
    pub season_zero_folder_name: String,
    pub episode_name_pattern: String,
    pub multi_episode_name_pattern: String,
    pub series_folder_pattern: String,
    pub overwrite_existing_episodes: bool,
    pub delete_empty_folders: bool,
    pub copy_original_file: bool,
    pub auto_detect_series: bool,
    pub default_series_library_path: Option<String>,
    /// Move files whose metadata title is the "TBA" placeholder
    #[serde(rename = "allowTBA")]
    pub allow_tba: bool,
    /// Remove other files holding the same episode once the new one is in place
    pub single_episode_version: bool,
}

impl Default for TvFileOrganizationOptions {
    fn default() -> Self {
        Self {
            is_enabled: false,
            min_file_size_mb: 50,
            left_over_file_extensions_to_delete: Vec::new(),
            watch_locations: Vec::new(),
            ignored_file_name_contains: Vec::new(),
            season_folder_pattern: "Season %s".to_string(),
            season_zero_folder_name: "Season 0".to_string(),
            episode_name_pattern: "%sn - %sx%0e - %en.%ext".to_string(),
            multi_episode_name_pattern: "%sn - %sx%0e-x%0ed - %en.%ext".to_string(),
            series_folder_pattern: "%fn".to_string(),
            overwrite_existing_episodes: false,
            delete_empty_folders: false,
            copy_original_file: false,
            auto_detect_series: false,
            default_series_library_path: None,
            allow_tba: false,
            single_episode_version: false,
        }
    }
}

/// Movie organization options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieFileOrganizationOptions {
    pub is_enabled: bool,
    pub min_file_size_mb: u64,
    pub left_over_file_extensions_to_delete: Vec<String>,
    pub watch_locations: Vec<String>,
    pub ignored_file_name_contains: Vec<String>,
    pub movie_pattern: String,
    pub movie_folder_pattern: String,
    pub create_movie_in_folder: bool,
    pub overwrite_existing_files: bool,
    pub delete_empty_folders: bool,
    pub copy_original_file: bool,
    pub auto_detect_movie: bool,
    pub default_movie_library_path: Option<String>,
}

impl Default for MovieFileOrganizationOptions {
    fn default() -> Self {
        Self {
            is_enabled: false,
            min_file_size_mb: 50,
            left_over_file_extensions_to_delete: Vec::new(),
            watch_locations: Vec::new(),
            ignored_file_name_contains: Vec::new(),
            movie_pattern: "%fn.%ext".to_string(),
            movie_folder_pattern: "%mn (%my)".to_string(),
            create_movie_in_folder: false,
            overwrite_existing_files: false,
            delete_empty_folders: false,
            copy_original_file: false,
            auto_detect_movie: false,
            default_movie_library_path: None,
        }
    }
}
