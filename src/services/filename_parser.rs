//! Episode path parser
//!
//! Runs a path through the ordered expression table in [naming] and returns
//! the first usable season/episode (or air date) it finds. Handles paths like:
//! - "Show Name (2020)/Season 1/Show Name - 1x05 - Title.mkv"
//! - "Show.S01E02-E03.720p.mkv"
//! - "The.Daily.Show.2021-03-04.mkv"
//! - "Show/Season 2/01 episode title.avi"

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::naming::{self, EPISODE_EXPRESSIONS, EpisodeExpression, MULTIPLE_EPISODE_EXPRESSIONS};

/// Characters after an ending episode that mark it as part of something else (1080p, 720i...)
const ENDING_EPISODE_BLOCKERS: &str = "0123456789iIpP";

/// Parsed episode information from a path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodePathParserResult {
    pub series_name: Option<String>,
    /// Year split off the series name while cleaning it
    pub series_year: Option<i32>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub ending_episode_number: Option<i32>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub is_by_date: bool,
    /// The winning expression was a named one
    pub is_named: bool,
    /// The winning expression was an optimistic fallback
    pub is_optimistic: bool,
    pub success: bool,
}

impl EpisodePathParserResult {
    pub fn has_series_name(&self) -> bool {
        self.series_name.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Season and episode, or an air date
    pub fn has_episode_identity(&self) -> bool {
        self.is_by_date || (self.season_number.is_some() && self.episode_number.is_some())
    }
}

/// Expression filters and post-processing switches
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// The path names a folder; it is parsed as if it were a video file inside it
    pub is_directory: bool,
    pub is_named: Option<bool>,
    pub is_optimistic: Option<bool>,
    pub supports_absolute_episode_numbers: Option<bool>,
    /// Look for a series name and ending episode with the remaining expressions, then clean the name
    pub fill_extended_info: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            is_directory: false,
            is_named: None,
            is_optimistic: None,
            supports_absolute_episode_numbers: None,
            fill_extended_info: true,
        }
    }
}

impl ParseOptions {
    fn accepts(&self, expression: &EpisodeExpression) -> bool {
        self.is_named.is_none_or(|v| v == expression.is_named)
            && self.is_optimistic.is_none_or(|v| v == expression.is_optimistic)
            && self
                .supports_absolute_episode_numbers
                .is_none_or(|v| v == expression.supports_absolute_episode_numbers)
    }
}

/// Parse a file path with default options
pub fn parse_episode(path: &str) -> EpisodePathParserResult {
    parse_episode_path(path, &ParseOptions::default())
}

/// Parse a path against the episode expression table
///
/// The first expression that yields an episode number (or a valid date) wins.
/// Unparseable input returns the default result, never an error.
pub fn parse_episode_path(path: &str, options: &ParseOptions) -> EpisodePathParserResult {
    let mut path = if path.contains(['/', '\\']) {
        path.to_string()
    } else {
        format!("/{path}")
    };
    if options.is_directory {
        path.push_str(".mp4");
    }

    let Some(mut result) = EPISODE_EXPRESSIONS
        .iter()
        .filter(|e| options.accepts(e))
        .map(|e| parse_with(&path, e))
        .find(|r| r.success)
    else {
        debug!(path = %path, "No episode expression matched");
        return EpisodePathParserResult::default();
    };

    if options.fill_extended_info {
        fill_additional(&path, &mut result);
        clean_series_name(&mut result);
    }

    debug!(
        path = %path,
        series = ?result.series_name,
        season = ?result.season_number,
        episode = ?result.episode_number,
        by_date = result.is_by_date,
        "Parsed episode path"
    );

    result
}

fn parse_with(name: &str, expression: &EpisodeExpression) -> EpisodePathParserResult {
    let mut result = EpisodePathParserResult {
        is_named: expression.is_named,
        is_optimistic: expression.is_optimistic,
        ..Default::default()
    };

    if expression.is_by_date {
        let name = name.replace('_', "-");
        let Some(found) = expression.regex.find(&name) else {
            return result;
        };

        if let Some(date) = expression
            .date_time_formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(found.as_str(), format).ok())
        {
            result.year = Some(date.year());
            result.month = Some(date.month());
            result.day = Some(date.day());
            result.is_by_date = true;
            result.success = true;
        }
        return result;
    }

    let Some(caps) = expression.regex.captures(name) else {
        return result;
    };

    if let (Some(guard), Some(series)) = (&expression.series_guard, caps.name("series"))
        && guard
            .find_at(name, series.start())
            .is_some_and(|hit| hit.start() < series.end())
    {
        return result;
    }

    result.season_number = caps.name("season").and_then(|m| m.as_str().parse().ok());
    result.episode_number = caps.name("episode").and_then(|m| {
        // "05a" or "05.5" is not a plain episode number unless more digits follow
        if let Some(part) = caps.name("part")
            && !part.as_str().is_empty()
            && !name[part.end()..].starts_with(|c: char| c.is_ascii_digit())
        {
            return None;
        }
        m.as_str().parse().ok()
    });

    if expression.is_named {
        result.series_name = caps
            .name("series")
            .map(|m| m.as_str().to_string())
            .filter(|s| !s.is_empty());
        result.ending_episode_number = caps
            .name("ending")
            .filter(|m| !name[m.end()..].starts_with(|c: char| ENDING_EPISODE_BLOCKERS.contains(c)))
            .and_then(|m| m.as_str().parse().ok());
    }

    result.success = result.episode_number.is_some();

    // Seasons 200-1927 and above 2500 are release numbers, not real seasons
    if let Some(season) = result.season_number
        && ((200..1928).contains(&season) || season > 2500)
    {
        result.success = false;
    }

    result
}

/// Borrow a series name and ending episode from other expressions that match the same path
fn fill_additional(path: &str, info: &mut EpisodePathParserResult) {
    let mut candidates: Vec<&EpisodeExpression> = Vec::new();
    if !info.has_series_name() {
        candidates.extend(EPISODE_EXPRESSIONS.iter().filter(|e| e.is_named));
    }
    candidates.extend(MULTIPLE_EPISODE_EXPRESSIONS.iter());

    for expression in candidates {
        let result = parse_with(path, expression);
        if !result.success {
            continue;
        }

        if !info.has_series_name() {
            info.series_name = result.series_name;
        }

        if info.ending_episode_number.is_none() && info.episode_number.is_some() {
            info.ending_episode_number = result.ending_episode_number;
        }

        if info.has_series_name()
            && (info.episode_number.is_none() || info.ending_episode_number.is_some())
        {
            break;
        }
    }
}

fn trim_series(name: &str) -> &str {
    name.trim()
        .trim_matches(|c: char| matches!(c, '_' | '.' | '-'))
        .trim()
}

fn clean_series_name(info: &mut EpisodePathParserResult) {
    let Some(raw) = info.series_name.take() else {
        return;
    };

    let trimmed = trim_series(&raw);
    let parsed = naming::parse_name(trimmed);
    let cleaned = trim_series(&parsed.name);

    if cleaned.is_empty() {
        info.series_name = (!trimmed.is_empty()).then(|| trimmed.to_string());
    } else {
        info.series_name = Some(cleaned.to_string());
        info.series_year = parsed.year;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_season_episode_marker() {
        let result = parse_episode("Show.S01E02.mkv");
        assert!(result.success);
        assert_eq!(result.series_name.as_deref(), Some("Show"));
        assert_eq!(result.season_number, Some(1));
        assert_eq!(result.episode_number, Some(2));
        assert!(result.is_named);
        assert!(!result.is_optimistic);
        assert!(!result.is_by_date);
    }

    #[test]
    fn test_parse_season_folder_with_cross_marker() {
        let result = parse_episode("Show Name (2020)/Season 1/Show Name - 1x05 - Title.mkv");
        assert_eq!(result.series_name.as_deref(), Some("Show Name"));
        assert_eq!(result.season_number, Some(1));
        assert_eq!(result.episode_number, Some(5));
        assert_eq!(result.ending_episode_number, None);
    }

    #[test]
    fn test_parse_unrecognized_file() {
        let result = parse_episode("randomfile.mkv");
        assert_eq!(result, EpisodePathParserResult::default());
        assert!(!result.has_episode_identity());
    }

    #[test]
    fn test_parse_by_date() {
        let result = parse_episode("Show.2021-03-04.mkv");
        assert!(result.is_by_date);
        assert_eq!(result.year, Some(2021));
        assert_eq!(result.month, Some(3));
        assert_eq!(result.day, Some(4));
        assert_eq!(result.episode_number, None);
        assert_eq!(result.series_name.as_deref(), Some("Show"));
    }

    #[test]
    fn test_parse_day_first_date() {
        let result = parse_episode("/tv/Show 04.03.2021.mkv");
        assert!(result.is_by_date);
        assert_eq!(
            (result.year, result.month, result.day),
            (Some(2021), Some(3), Some(4))
        );
    }

    #[test]
    fn test_parse_episode_range() {
        let result = parse_episode("/downloads/Show.S01E02-E03.mkv");
        assert_eq!(result.season_number, Some(1));
        assert_eq!(result.episode_number, Some(2));
        assert_eq!(result.ending_episode_number, Some(3));
    }

    #[test]
    fn test_ending_episode_ignored_before_resolution() {
        let result = parse_episode("/downloads/series-s09e14-1080p.mkv");
        assert_eq!(result.season_number, Some(9));
        assert_eq!(result.episode_number, Some(14));
        assert_eq!(result.ending_episode_number, None);
    }

    #[test]
    fn test_series_year_split_off() {
        let result = parse_episode("/downloads/Show Name (2020) S01E02.mkv");
        assert_eq!(result.series_name.as_deref(), Some("Show Name"));
        assert_eq!(result.series_year, Some(2020));
    }

    #[test]
    fn test_compact_number_after_series_with_digits() {
        let raw = ParseOptions {
            fill_extended_info: false,
            ..Default::default()
        };

        let result = parse_episode_path("/tv/Show 2019.103.mkv", &raw);
        assert_eq!(result.series_name.as_deref(), Some("Show 2019"));
        assert_eq!((result.season_number, result.episode_number), (Some(1), Some(3)));

        let result = parse_episode_path("/tv/Show 100.103.mkv", &raw);
        assert_eq!(result.series_name.as_deref(), Some("Show 100"));
        assert_eq!((result.season_number, result.episode_number), (Some(1), Some(3)));

        let cleaned = parse_episode("/tv/Show 2019.103.mkv");
        assert_eq!(cleaned.series_name.as_deref(), Some("Show"));
        assert_eq!(cleaned.series_year, Some(2019));
        assert_eq!(cleaned.episode_number, Some(3));
    }

    #[test]
    fn test_compact_number_series_may_not_start_with_three_digits() {
        let result = parse_episode_path(
            "/tv/123 Show.105.mkv",
            &ParseOptions {
                fill_extended_info: false,
                ..Default::default()
            },
        );
        assert_ne!(result.series_name.as_deref(), Some("123 Show"));
    }

    #[test]
    fn test_season_folder_with_numbered_file() {
        let result = parse_episode("/tv/Series/Season 2/01 episode title.avi");
        assert_eq!(result.season_number, Some(2));
        assert_eq!(result.episode_number, Some(1));
        assert!(result.is_optimistic);
    }

    #[test]
    fn test_implausible_season_rejected() {
        let result = parse_episode("/downloads/Show.S250E01.mkv");
        assert!(!result.success);
        assert_eq!(result.season_number, None);
    }

    #[test]
    fn test_optimistic_override() {
        let relaxed = parse_episode("/tv/01 - Title.mkv");
        assert_eq!(relaxed.episode_number, Some(1));
        assert!(relaxed.is_optimistic);

        let strict = parse_episode_path(
            "/tv/01 - Title.mkv",
            &ParseOptions {
                is_optimistic: Some(false),
                ..Default::default()
            },
        );
        assert!(!strict.success);
    }

    #[test]
    fn test_directory_path() {
        let result = parse_episode_path(
            "/tv/Show.S03E04",
            &ParseOptions {
                is_directory: true,
                ..Default::default()
            },
        );
        assert_eq!(result.season_number, Some(3));
        assert_eq!(result.episode_number, Some(4));
    }

    #[test]
    fn test_windows_separators() {
        let result = parse_episode(r"D:\tv\Show\Show.S02E10.mkv");
        assert_eq!(result.season_number, Some(2));
        assert_eq!(result.episode_number, Some(10));
        assert_eq!(result.series_name.as_deref(), Some("Show"));
    }
}
