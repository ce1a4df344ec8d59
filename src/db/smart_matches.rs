//! Smart match records
//!
//! A smart match remembers that raw extracted names (e.g. "Shw Nm") map to a
//! canonical library item, so later files resolve without another correction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FileOrganizerType;

/// Raw strings shorter than this are too broad to remember
pub const MIN_MATCH_STRING_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartMatchResult {
    pub id: Uuid,
    pub item_name: String,
    pub display_name: String,
    pub organizer_type: FileOrganizerType,
    pub match_strings: Vec<String>,
}

impl SmartMatchResult {
    pub fn new(item_name: &str, organizer_type: FileOrganizerType) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_name: item_name.to_string(),
            display_name: item_name.to_string(),
            organizer_type,
            match_strings: Vec::new(),
        }
    }

    /// Case-insensitive membership test
    pub fn matches(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        self.match_strings.iter().any(|s| s.to_lowercase() == value)
    }

    /// Add a raw string; returns false if it was too short or already present
    pub fn add_match_string(&mut self, value: &str) -> bool {
        if value.chars().count() < MIN_MATCH_STRING_LEN || self.matches(value) {
            return false;
        }
        self.match_strings.push(value.to_string());
        true
    }

    /// Remove a raw string (case-insensitive); returns true if something was removed
    pub fn remove_match_string(&mut self, value: &str) -> bool {
        let before = self.match_strings.len();
        self.match_strings
            .retain(|s| s.to_lowercase() != value.to_lowercase());
        self.match_strings.len() != before
    }
}
