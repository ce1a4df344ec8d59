//! Naming pattern templates
//!
//! Patterns are plain strings with `%` tokens. Each pattern family has its own
//! token table; expansion is a single left-to-right pass that always takes the
//! longest token at a position, so `%s.n` is never read as `%s` + `.n` and
//! substituted values are never expanded again.
//!
//! Supported tokens:
//! - Episode file: `%sn` `%s.n` `%s_n` `%s` `%0s` `%00s` `%en` `%e.n` `%e_n`
//!   `%e` `%0e` `%00e` `%ed` `%0ed` `%00ed` `%ext` `%fn`
//! - Season folder: `%s` `%0s` `%00s`
//! - Series folder: `%sn` `%s.n` `%s_n` `%fn` `%sy`
//! - Movie file and folder: `%mn` `%m.n` `%m_n` `%my` `%res` `%ext` `%fn`

use crate::error::{OrganizeError, Result};

use super::file_utils::{extension_of, file_stem_of, get_stream_resolution_from_file_name};
use super::naming;

/// Values substituted into an episode file name pattern
#[derive(Debug, Clone)]
pub struct EpisodeNameValues<'a> {
    pub series_name: &'a str,
    pub season_number: i32,
    pub episode_number: i32,
    pub ending_episode_number: Option<i32>,
    pub episode_title: &'a str,
    pub source_path: &'a str,
}

/// Values substituted into a movie file or folder pattern
#[derive(Debug, Clone)]
pub struct MovieNameValues<'a> {
    pub movie_name: &'a str,
    pub production_year: Option<i32>,
    pub source_path: &'a str,
}

/// Expand `pattern` with a token table in one pass
pub fn render_pattern(pattern: &str, tokens: &[(&str, String)]) -> String {
    let mut tokens: Vec<&(&str, String)> = tokens.iter().collect();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(index) = rest.find('%') {
        out.push_str(&rest[..index]);
        rest = &rest[index..];

        match tokens.iter().find(|(token, _)| rest.starts_with(token)) {
            Some((token, value)) => {
                out.push_str(value);
                rest = &rest[token.len()..];
            }
            None => {
                out.push('%');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn name_variants(prefix: char, name: &str) -> [(&'static str, String); 3] {
    let dotted = name.replace(' ', ".");
    let underscored = name.replace(' ', "_");
    match prefix {
        's' => [("%sn", name.to_string()), ("%s.n", dotted), ("%s_n", underscored)],
        'e' => [("%en", name.to_string()), ("%e.n", dotted), ("%e_n", underscored)],
        _ => [("%mn", name.to_string()), ("%m.n", dotted), ("%m_n", underscored)],
    }
}

fn padded(token: [&'static str; 3], value: i32) -> [(&'static str, String); 3] {
    [
        (token[0], value.to_string()),
        (token[1], format!("{value:02}")),
        (token[2], format!("{value:03}")),
    ]
}

/// Episode file name from a pattern
///
/// `%ed` tokens only exist when the file holds an episode range; without one
/// they read as `%e` followed by a literal `d`.
pub fn format_episode_file_name(
    pattern: &str,
    values: &EpisodeNameValues<'_>,
    sanitize: impl Fn(&str) -> String,
) -> Result<String> {
    if pattern.trim().is_empty() {
        return Err(OrganizeError::organization(
            "Configured episode name pattern is empty",
        ));
    }

    let series_name = sanitize(values.series_name).trim().to_string();
    let episode_title = sanitize(values.episode_title).trim().to_string();

    let mut tokens: Vec<(&str, String)> = Vec::new();
    tokens.extend(name_variants('s', &series_name));
    tokens.extend(padded(["%s", "%0s", "%00s"], values.season_number));
    tokens.extend(name_variants('e', &episode_title));
    tokens.extend(padded(["%e", "%0e", "%00e"], values.episode_number));
    if let Some(ending) = values.ending_episode_number {
        tokens.extend(padded(["%ed", "%0ed", "%00ed"], ending));
    }
    tokens.push(("%ext", extension_of(values.source_path)));
    tokens.push(("%fn", file_stem_of(values.source_path)));

    Ok(sanitize(&render_pattern(pattern, &tokens)).trim().to_string())
}

/// Season folder name; season 0 always uses the configured specials folder name
pub fn format_season_folder_name(
    pattern: &str,
    season_zero_folder_name: &str,
    season_number: i32,
    sanitize: impl Fn(&str) -> String,
) -> String {
    if season_number == 0 {
        return sanitize(season_zero_folder_name);
    }

    let tokens = padded(["%s", "%0s", "%00s"], season_number);
    sanitize(&render_pattern(pattern, &tokens))
}

/// Series folder name
///
/// `%fn` is "Name (Year)" when a year is known, with any year already in the
/// name stripped first. Trailing dots and spaces are removed since some
/// file systems cannot hold such folder names.
pub fn format_series_folder_name(
    pattern: &str,
    series_name: &str,
    series_year: Option<i32>,
    sanitize: impl Fn(&str) -> String,
) -> String {
    let full_name = match series_year {
        Some(year) => {
            let parsed = naming::parse_name(series_name);
            let name = if parsed.name.trim().is_empty() {
                series_name
            } else {
                parsed.name.as_str()
            };
            format!("{name} ({year})")
        }
        None => series_name.to_string(),
    };

    let mut tokens: Vec<(&str, String)> = name_variants('s', series_name).into();
    tokens.push(("%fn", full_name));
    tokens.push((
        "%sy",
        series_year.map(|y| y.to_string()).unwrap_or_default(),
    ));

    sanitize(&render_pattern(pattern, &tokens))
        .trim_end_matches(['.', ' '])
        .to_string()
}

/// Movie file or folder name from a pattern
pub fn format_movie_name(
    pattern: &str,
    values: &MovieNameValues<'_>,
    sanitize: impl Fn(&str) -> String,
) -> Result<String> {
    if pattern.trim().is_empty() {
        return Err(OrganizeError::organization(
            "Configured movie name pattern is empty",
        ));
    }

    let movie_name = sanitize(values.movie_name).trim().to_string();
    let source_file_name = crate::db::file_name_of(values.source_path);

    let mut tokens: Vec<(&str, String)> = name_variants('m', &movie_name).into();
    tokens.push((
        "%my",
        values
            .production_year
            .map(|y| y.to_string())
            .unwrap_or_default(),
    ));
    tokens.push((
        "%res",
        get_stream_resolution_from_file_name(source_file_name).to_string(),
    ));
    tokens.push(("%ext", extension_of(values.source_path)));
    tokens.push(("%fn", file_stem_of(values.source_path)));

    Ok(sanitize(&render_pattern(pattern, &tokens)).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::file_utils::sanitize_for_filename;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn episode<'a>(ending: Option<i32>) -> EpisodeNameValues<'a> {
        EpisodeNameValues {
            series_name: "Foo",
            season_number: 1,
            episode_number: 5,
            ending_episode_number: ending,
            episode_title: "Bar",
            source_path: "/downloads/foo.105.mkv",
        }
    }

    #[test]
    fn test_default_episode_pattern() {
        let name =
            format_episode_file_name("%sn - %sx%0e - %en.%ext", &episode(None), sanitize_for_filename)
                .unwrap();
        assert_eq!(name, "Foo - 1x05 - Bar.mkv");
    }

    #[test]
    fn test_multi_episode_pattern() {
        let name = format_episode_file_name(
            "%sn - %sx%0e-x%0ed - %en.%ext",
            &episode(Some(6)),
            sanitize_for_filename,
        )
        .unwrap();
        assert_eq!(name, "Foo - 1x05-x06 - Bar.mkv");
    }

    #[test]
    fn test_ending_tokens_without_range() {
        let name =
            format_episode_file_name("%0e-%0ed", &episode(None), sanitize_for_filename).unwrap();
        assert_eq!(name, "05-05d");
    }

    #[test]
    fn test_name_variants_and_padding() {
        let values = EpisodeNameValues {
            series_name: "The Show",
            season_number: 2,
            episode_number: 7,
            ending_episode_number: None,
            episode_title: "A Title",
            source_path: "/dl/orig name.avi",
        };
        let name = format_episode_file_name(
            "%s.n.S%0sE%00e.%e_n [%fn].%ext",
            &values,
            sanitize_for_filename,
        )
        .unwrap();
        assert_eq!(name, "The.Show.S02E007.A_Title [orig name].avi");
    }

    #[test]
    fn test_substituted_values_are_not_expanded() {
        let values = EpisodeNameValues {
            series_name: "100%sure",
            ..episode(None)
        };
        let name = format_episode_file_name("%sn %e", &values, sanitize_for_filename).unwrap();
        assert_eq!(name, "100%sure 5");
    }

    #[test]
    fn test_empty_episode_pattern() {
        let err = format_episode_file_name("  ", &episode(None), sanitize_for_filename).unwrap_err();
        assert_matches!(err, OrganizeError::Organization(_));
        assert_eq!(
            err.to_string(),
            "Configured episode name pattern is empty"
        );
    }

    #[test]
    fn test_season_folder_names() {
        assert_eq!(
            format_season_folder_name("Season %s", "Specials", 3, sanitize_for_filename),
            "Season 3"
        );
        assert_eq!(
            format_season_folder_name("S%0s", "Specials", 3, sanitize_for_filename),
            "S03"
        );
        assert_eq!(
            format_season_folder_name("Season %s", "Specials", 0, sanitize_for_filename),
            "Specials"
        );
    }

    #[test]
    fn test_series_folder_names() {
        assert_eq!(
            format_series_folder_name("%fn", "Doctor Who", Some(2005), sanitize_for_filename),
            "Doctor Who (2005)"
        );
        assert_eq!(
            format_series_folder_name("%fn", "Lost", None, sanitize_for_filename),
            "Lost"
        );
        assert_eq!(
            format_series_folder_name("%s.n [%sy]", "Mr Robot", None, sanitize_for_filename),
            "Mr.Robot []"
        );
        assert_eq!(
            format_series_folder_name("%sn.", "Marvel's Agents of S.H.I.E.L.D", None, sanitize_for_filename),
            "Marvel's Agents of S.H.I.E.L.D"
        );
    }

    #[test]
    fn test_movie_names() {
        let values = MovieNameValues {
            movie_name: "Blade Runner: 2049",
            production_year: Some(2017),
            source_path: "/dl/Blade.Runner.2049.2160p.mkv",
        };
        assert_eq!(
            format_movie_name("%mn (%my)", &values, sanitize_for_filename).unwrap(),
            "Blade Runner 2049 (2017)"
        );
        assert_eq!(
            format_movie_name("%m.n.%res.%ext", &values, sanitize_for_filename).unwrap(),
            "Blade.Runner.2049.2160p.mkv"
        );
        assert_eq!(
            format_movie_name("%fn.%ext", &values, sanitize_for_filename).unwrap(),
            "Blade.Runner.2049.2160p.mkv"
        );
    }

    #[test]
    fn test_empty_movie_pattern() {
        let values = MovieNameValues {
            movie_name: "Heat",
            production_year: None,
            source_path: "/dl/Heat.mkv",
        };
        let err = format_movie_name("", &values, sanitize_for_filename).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configured movie name pattern is empty"
        );
    }
}
