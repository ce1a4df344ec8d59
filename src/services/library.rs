//! Host library capabilities
//!
//! The organizers never talk to a media server directly. They see the library
//! through [LibraryManager], file system notifications through
//! [LibraryMonitor] and remote metadata through [MetadataProvider]. The item
//! types here are plain snapshots handed across those seams.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::file_utils;
use super::naming::{self, ParsedName};

/// Provider name -> provider id (e.g. "Tvdb" -> "121361")
pub type ProviderIds = HashMap<String, String>;

/// Whether an item is backed by a file or only known from metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationType {
    #[default]
    FileSystem,
    Virtual,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Series {
    /// Library id; 0 for a series that only exists in memory so far
    pub internal_id: i64,
    pub name: String,
    pub path: String,
    pub production_year: Option<i32>,
    pub provider_ids: ProviderIds,
    pub preferred_metadata_language: Option<String>,
    pub preferred_metadata_country_code: Option<String>,
}

impl Series {
    pub fn is_new(&self) -> bool {
        self.internal_id == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Season {
    pub internal_id: i64,
    pub series_id: i64,
    pub index_number: Option<i32>,
    pub path: Option<String>,
    pub location_type: LocationType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Episode {
    pub internal_id: i64,
    pub series_id: i64,
    pub name: String,
    pub path: Option<String>,
    /// Season number
    pub parent_index_number: Option<i32>,
    pub index_number: Option<i32>,
    pub index_number_end: Option<i32>,
    pub premiere_date: Option<NaiveDate>,
    pub location_type: LocationType,
    pub provider_ids: ProviderIds,
    /// Season the library already files this episode under
    pub season: Option<Season>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaStream {
    pub display_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Movie {
    pub internal_id: i64,
    pub name: String,
    pub path: String,
    pub production_year: Option<i32>,
    pub provider_ids: ProviderIds,
    /// Stored loose in a shared folder rather than in its own folder
    pub is_in_mixed_folder: bool,
    pub media_streams: Vec<MediaStream>,
}

impl Movie {
    pub fn is_new(&self) -> bool {
        self.internal_id == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionType {
    Movies,
    TvShows,
    Mixed,
}

/// A library root as configured in the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualFolder {
    pub name: String,
    pub collection_type: CollectionType,
    pub locations: Vec<String>,
}

/// A library folder item, used to scope searches and pick metadata language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryFolder {
    pub internal_id: i64,
    pub path: String,
    pub preferred_metadata_language: Option<String>,
    pub preferred_metadata_country_code: Option<String>,
}

/// Library item search
///
/// `search_term` is the host's fuzzy name search; `name` is an exact name
/// match. Empty `years` means any year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemQuery {
    pub search_term: Option<String>,
    pub name: Option<String>,
    pub years: Vec<i32>,
    pub ancestor_id: Option<i64>,
}

/// Read access to the host media library
#[async_trait]
pub trait LibraryManager: Send + Sync {
    async fn find_series(&self, query: &ItemQuery) -> Result<Vec<Series>>;

    async fn find_movies(&self, query: &ItemQuery) -> Result<Vec<Movie>>;

    fn get_series_by_id(&self, id: i64) -> Option<Series>;

    fn get_movie_by_id(&self, id: i64) -> Option<Movie>;

    /// Every episode below the series, at any depth
    fn get_episodes(&self, series: &Series) -> Vec<Episode>;

    fn get_seasons(&self, series: &Series) -> Vec<Season>;

    /// Whether video files sit directly in the series folder rather than in season folders
    fn has_direct_video_children(&self, series: &Series) -> bool;

    fn find_folder_by_path(&self, path: &str) -> Option<LibraryFolder>;

    fn get_virtual_folders(&self) -> Vec<VirtualFolder>;

    /// Split a raw name into title and year
    fn parse_name(&self, name: &str) -> ParsedName {
        naming::parse_name(name)
    }

    fn is_video_file(&self, path: &str) -> bool {
        file_utils::is_video_file(path)
    }
}

/// File system change notifications and lock state from the host watcher
pub trait LibraryMonitor: Send + Sync {
    /// Whether the path is currently held by another operation
    fn is_path_locked(&self, path: &str) -> bool;

    fn report_file_system_change_beginning(&self, path: &str);

    fn report_file_system_change_complete(&self, path: &str, refresh_path: bool);
}

/// Monitor for running without a host: nothing is locked, notifications are dropped
#[derive(Debug, Default)]
pub struct NullLibraryMonitor;

impl LibraryMonitor for NullLibraryMonitor {
    fn is_path_locked(&self, _path: &str) -> bool {
        false
    }

    fn report_file_system_change_beginning(&self, _path: &str) {}

    fn report_file_system_change_complete(&self, _path: &str, _refresh_path: bool) {}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesLookup {
    pub name: String,
    pub year: Option<i32>,
    pub metadata_language: Option<String>,
    pub metadata_country_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EpisodeLookup {
    pub parent_index_number: Option<i32>,
    pub index_number: Option<i32>,
    pub index_number_end: Option<i32>,
    pub premiere_date: Option<NaiveDate>,
    pub series_provider_ids: ProviderIds,
    pub metadata_language: Option<String>,
    pub metadata_country_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieLookup {
    pub name: String,
    pub year: Option<i32>,
    pub metadata_language: Option<String>,
    pub metadata_country_code: Option<String>,
}

/// Remote metadata search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "searchInfo")]
pub enum RemoteSearchQuery {
    Series(SeriesLookup),
    Episode(EpisodeLookup),
    Movie(MovieLookup),
}

/// One remote metadata candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSearchResult {
    pub name: String,
    pub production_year: Option<i32>,
    pub provider_ids: ProviderIds,
    pub parent_index_number: Option<i32>,
    pub index_number: Option<i32>,
    pub index_number_end: Option<i32>,
}

/// Remote metadata search
///
/// Candidates come back ranked; the organizers only ever use the first.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search(&self, query: &RemoteSearchQuery) -> Result<Vec<RemoteSearchResult>>;
}
