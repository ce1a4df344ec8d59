//! Organization result records
//!
//! One record per processed (or attempted) file. Records are upserted at each
//! milestone of an organize attempt and only removed by explicit user action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of media an organize attempt decided the file was
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileOrganizerType {
    #[default]
    Unknown,
    Episode,
    Movie,
}

impl FileOrganizerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Episode => "Episode",
            Self::Movie => "Movie",
        }
    }
}

/// Outcome of an organize attempt
///
/// `Waiting` and `Processing` are transient; the rest are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileSortingStatus {
    Success,
    Failure,
    SkippedExisting,
    NewResolution,
    #[default]
    Processing,
    Waiting,
}

/// Organization result record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationResult {
    /// Stable id derived from the original path; `None` until first saved
    pub id: Option<String>,
    pub date: DateTime<Utc>,
    pub original_path: String,
    pub original_file_name: String,
    pub target_path: String,
    pub file_size: u64,
    #[serde(rename = "type")]
    pub organizer_type: FileOrganizerType,
    pub status: FileSortingStatus,
    pub status_message: String,
    pub extracted_name: Option<String>,
    pub extracted_year: Option<i32>,
    pub extracted_season_number: Option<i32>,
    pub extracted_episode_number: Option<i32>,
    pub extracted_ending_episode_number: Option<i32>,
    pub extracted_resolution: Option<String>,
    pub duplicate_paths: Vec<String>,
    pub is_in_progress: bool,
}

impl OrganizationResult {
    /// Start a fresh record for `path`
    pub fn new(path: &str, file_size: u64) -> Self {
        Self {
            date: Utc::now(),
            original_path: path.to_string(),
            original_file_name: file_name_of(path).to_string(),
            file_size,
            ..Default::default()
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.as_deref().is_none_or(|id| id.trim().is_empty())
    }

    /// Id this record has or will get once saved
    pub fn effective_id(&self) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => result_id_for_path(&self.original_path),
        }
    }

    /// Assign the stable id if the record has none yet
    pub fn ensure_id(&mut self) -> &str {
        if self.is_new() {
            self.id = Some(result_id_for_path(&self.original_path));
        }
        self.id.as_deref().unwrap_or_default()
    }

    /// Set a terminal or transient status together with its message
    pub fn set_status(&mut self, status: FileSortingStatus, message: impl Into<String>) {
        self.status = status;
        self.status_message = message.into();
    }
}

/// Result ids are the hex MD5 of the original path so retries of the same file share one record
pub fn result_id_for_path(path: &str) -> String {
    format!("{:x}", md5::compute(path.as_bytes()))
}

/// File name component of a path, accepting both separators
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Paging for result listings
#[derive(Debug, Clone, Default)]
pub struct ResultQuery {
    pub start_index: Option<usize>,
    pub limit: Option<usize>,
}

/// A page of records plus the unpaged total
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub total_record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_id_is_stable() {
        let a = result_id_for_path("/downloads/Show.S01E01.mkv");
        let b = result_id_for_path("/downloads/Show.S01E01.mkv");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert_ne!(a, result_id_for_path("/downloads/Show.S01E02.mkv"));
    }

    #[test]
    fn test_new_result_fields() {
        let result = OrganizationResult::new("/downloads/tv/Show.S01E01.mkv", 1024);
        assert!(result.is_new());
        assert_eq!(result.original_file_name, "Show.S01E01.mkv");
        assert_eq!(result.organizer_type, FileOrganizerType::Unknown);
        assert_eq!(result.status, FileSortingStatus::Processing);
        assert_eq!(result.file_size, 1024);
    }

    #[test]
    fn test_ensure_id_only_assigns_once() {
        let mut result = OrganizationResult::new(r"C:\downloads\Movie.mkv", 0);
        assert_eq!(result.original_file_name, "Movie.mkv");
        let id = result.ensure_id().to_string();
        result.original_path = "/elsewhere.mkv".to_string();
        assert_eq!(result.ensure_id(), id);
    }
}
