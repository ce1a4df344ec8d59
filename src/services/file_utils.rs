//! Shared file utility functions
//!
//! Extension checks, resolution tags, ignore rules, sanitization and the
//! string path helpers the organizers use. Paths stay `&str` end to end since
//! they come from (and go back into) persisted organization results.

use std::path::Path;

use regex::{NoExpand, Regex};

use super::naming::{VIDEO_FILE_EXTENSIONS, VIDEO_RESOLUTION_FLAGS};

/// Check if a file is a video file based on extension
///
/// # Arguments
/// * `path` - File path or filename to check
///
/// # Returns
/// `true` if the file has a video extension
///
/// # Example
/// ```
/// use auto_organize::services::file_utils::is_video_file;
/// assert!(is_video_file("movie.mkv"));
/// assert!(is_video_file("/path/to/video.M2TS"));
/// assert!(!is_video_file("music.mp3"));
/// ```
pub fn is_video_file(path: &str) -> bool {
    extension_with_dot(path)
        .is_some_and(|ext| VIDEO_FILE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Resolution tag found in a file name
///
/// Tags are checked in order and matched case-sensitively; the first one
/// contained anywhere in the name wins.
///
/// # Returns
/// The tag (e.g. "1080p"), or an empty string if the name carries none
pub fn get_stream_resolution_from_file_name(name: &str) -> &'static str {
    VIDEO_RESOLUTION_FLAGS
        .iter()
        .find(|flag| name.contains(*flag))
        .copied()
        .unwrap_or_default()
}

/// Whether a file name contains any of the configured ignore fragments (case-insensitive)
///
/// Empty fragments never match.
pub fn is_ignored_file_name(file_name: &str, ignored_contains: &[String]) -> bool {
    let lower = file_name.to_lowercase();
    ignored_contains
        .iter()
        .filter(|s| !s.is_empty())
        .any(|s| lower.contains(&s.to_lowercase()))
}

/// Sanitize a string for use as a filename
///
/// Uses the `sanitize_filename` crate which handles:
/// - Invalid characters for the current OS
/// - Reserved filenames (CON, PRN, etc. on Windows)
///
/// # Arguments
/// * `name` - The string to sanitize
///
/// # Returns
/// A sanitized string safe to use as a filename
pub fn sanitize_for_filename(name: &str) -> String {
    sanitize_filename::sanitize(name)
}

/// Extension including the leading dot, as written in the path
pub fn extension_with_dot(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

/// Extension without the dot, or an empty string
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string()
}

/// File name without directory or extension
pub fn file_stem_of(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Parent directory, or an empty string for bare names
pub fn directory_of(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Case-insensitive path comparison
pub fn same_path(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Replace every case-insensitive occurrence of `from` in `value`
pub fn replace_ignore_case(value: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return value.to_string();
    }
    match Regex::new(&format!("(?i){}", regex::escape(from))) {
        Ok(regex) => regex.replace_all(value, NoExpand(to)).into_owned(),
        Err(_) => value.to_string(),
    }
}

/// Join a relative name onto a directory
pub fn join_path(dir: &str, name: &str) -> String {
    Path::new(dir).join(name).to_string_lossy().into_owned()
}
