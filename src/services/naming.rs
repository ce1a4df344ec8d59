//! Naming tables
//!
//! Extension lists, resolution tags, the ordered episode expression table and
//! the cleaning expressions used to normalise names pulled out of file names.
//!
//! Every expression is compiled case-insensitively. The episode table is a
//! first-match-wins list: its order is the tie-break between expressions that
//! could both match the same path, so entries must not be reordered.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Video file extensions (lowercase, with leading dot)
pub const VIDEO_FILE_EXTENSIONS: &[&str] = &[
    ".m4v", ".3gp", ".nsv", ".ts", ".ty", ".strm", ".rm", ".rmvb", ".ifo", ".mov", ".qt",
    ".divx", ".xvid", ".bivx", ".vob", ".nrg", ".img", ".iso", ".pva", ".wmv", ".asf", ".asx",
    ".ogm", ".m2v", ".avi", ".bin", ".dvr-ms", ".mpg", ".mpeg", ".mp4", ".mkv", ".avc", ".vp3",
    ".svq3", ".nuv", ".viv", ".dv", ".fli", ".flv", ".001", ".tp", ".m2t", ".m2ts", ".mk3d",
    ".wtv", ".ogv", ".f4v", ".webm", ".mts", ".rec", ".mxf",
];

/// Audio file extensions (lowercase, with leading dot)
pub const AUDIO_FILE_EXTENSIONS: &[&str] = &[
    ".nsv", ".m4a", ".flac", ".aac", ".strm", ".pls", ".rm", ".mpa", ".wav", ".wma", ".ogg",
    ".opus", ".mp3", ".mp2", ".mod", ".amf", ".669", ".dmf", ".dsm", ".far", ".gdm", ".imf",
    ".it", ".m15", ".med", ".okt", ".s3m", ".stm", ".sfx", ".ult", ".uni", ".xm", ".sid", ".ac3",
    ".dts", ".cue", ".aif", ".aiff", ".ape", ".mac", ".mpc", ".mp+", ".mpp", ".shn", ".wv",
    ".nsf", ".spc", ".gym", ".adplug", ".adx", ".dsp", ".adp", ".ymf", ".ast", ".afc", ".hps",
    ".xsp", ".acc", ".m4b", ".oga", ".dsf", ".mka",
];

/// Resolution tags, scanned in this order
pub const VIDEO_RESOLUTION_FLAGS: &[&str] = &["480p", "720p", "1080p", "2160p", "4K"];

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("naming expression should compile")
}

/// One entry of the episode expression table
///
/// Capture groups are looked up by name: `series`, `season`, `episode`,
/// `ending` and `part`. An expression simply omits the groups it does not
/// extract.
#[derive(Debug)]
pub struct EpisodeExpression {
    pub regex: Regex,
    /// Extracts a series name and ending episode in addition to the numbers
    pub is_named: bool,
    /// Permissive fallback that may fire on incidental numbers
    pub is_optimistic: bool,
    pub is_by_date: bool,
    pub supports_absolute_episode_numbers: bool,
    /// chrono formats tried in order against the whole match of a by-date expression
    pub date_time_formats: &'static [&'static str],
    /// A match is rejected when this pattern starts anywhere inside the captured series name
    pub series_guard: Option<Regex>,
}

impl EpisodeExpression {
    fn new(pattern: &str) -> Self {
        Self {
            regex: compile(pattern),
            is_named: false,
            is_optimistic: false,
            is_by_date: false,
            supports_absolute_episode_numbers: false,
            date_time_formats: &[],
            series_guard: None,
        }
    }

    fn named(mut self) -> Self {
        self.is_named = true;
        self
    }

    fn optimistic(mut self) -> Self {
        self.is_optimistic = true;
        self
    }

    fn absolute(mut self) -> Self {
        self.supports_absolute_episode_numbers = true;
        self
    }

    fn by_date(mut self, formats: &'static [&'static str]) -> Self {
        self.is_by_date = true;
        self.date_time_formats = formats;
        self
    }

    fn series_guard(mut self, pattern: &str) -> Self {
        self.series_guard = Some(compile(pattern));
        self
    }
}

/// Ordered episode expressions
///
/// Series names that must stop at the first season/episode marker use a lazy
/// capture. In the "foo.103" entry the series name may not start with three
/// or more digits.
/// A trailing `part` group holds an `a`-`i` or `.N` suffix; when it is present
/// and not followed by a digit the episode number is not a plain integer.
pub static EPISODE_EXPRESSIONS: Lazy<Vec<EpisodeExpression>> = Lazy::new(|| {
    vec![
        // foo.s01.e01, foo.s01_e01, S01E02 foo, S01 - E02
        EpisodeExpression::new(
            r".*[\\/](?P<series>[^\\/]*?)s(?P<season>[0-9]+)[\[\] ._-]*e(?P<episode>[0-9]+)[^\\/]*$",
        )
        .named(),
        // foo.ep01, foo.EP_01
        EpisodeExpression::new(r"[._ -]ep_?(?P<episode>[0-9]+)[^\\/]*$"),
        EpisodeExpression::new(r"([0-9]{4})[.-]([0-9]{2})[.-]([0-9]{2})")
            .by_date(&["%Y.%m.%d", "%Y-%m-%d", "%Y_%m_%d"]),
        EpisodeExpression::new(r"([0-9]{2})[.-]([0-9]{2})[.-]([0-9]{4})")
            .by_date(&["%d.%m.%Y", "%d-%m-%Y", "%d_%m_%Y"]),
        // foo.1x05, foo [1x05]
        EpisodeExpression::new(
            r"[\\/._ \[(-](?P<season>[0-9]+)x(?P<episode>[0-9]+)(?P<part>[a-i]|\.[1-9])?[^\\/]*$",
        )
        .absolute(),
        // foo.103
        EpisodeExpression::new(
            r"[\\/._ -](?P<series>[0-9]{0,2}(?:[^\\/0-9][^\\/]*)?)[\\/._ -](?P<season>[0-9]+)(?P<episode>[0-9]{2})(?P<part>[a-i]|\.[1-9])?[._ -][^\\/]*$",
        )
        .named()
        .optimistic(),
        // foo.part.2, foo.pt.iv
        EpisodeExpression::new(r"[\\/._ -]p(?:ar)?t[_. -](?P<episode>[ivx]+|[0-9]+)[._ -][^\\/]*$")
            .absolute(),
        EpisodeExpression::new(r".*[\\/]s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})[^\\/]*$")
            .named(),
        EpisodeExpression::new(r".*[\\/]s(?P<season>\d{1,4})[x,]?e(?P<episode>\d{1,3})[^\\/]*$")
            .named(),
        EpisodeExpression::new(
            r".*[\\/](?P<series>[^\\/]*?)s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})[^\\/]*$",
        )
        .named(),
        EpisodeExpression::new(
            r".*[\\/](?P<series>[^\\/]*)s(?P<season>\d{1,4})[x.]?e(?P<episode>\d{1,3})[^\\/]*$",
        )
        .named(),
        // 01.avi
        EpisodeExpression::new(r".*[\\/](?P<episode>\d{1,3})(?:-(?P<ending>\d{2,3}))*\.\w+$")
            .named()
            .optimistic(),
        // 1-12 episode title
        EpisodeExpression::new(r"(?P<season>[0-9]+)-(?P<episode>[0-9]+)"),
        // 01 - blah.avi, 01-blah.avi
        EpisodeExpression::new(
            r".*[\\/](?P<episode>\d{1,3})(?:-(?P<ending>\d{2,3}))*\s?-\s?[^\\/]*$",
        )
        .named()
        .optimistic(),
        // 01.blah.avi
        EpisodeExpression::new(r".*[\\/](?P<episode>\d{1,3})(?:-(?P<ending>\d{2,3}))*\.[^\\/]+$")
            .named()
            .optimistic(),
        // blah - 01.avi, blah 2 - 01 - blah.avi
        EpisodeExpression::new(
            r".*[\\/][^\\/]* - (?P<episode>\d{1,3})(?:-(?P<ending>\d{2,3}))*[^\\/]*$",
        )
        .named()
        .optimistic(),
        // Season 2/01 episode title.avi
        EpisodeExpression::new(r"season[._ ](?P<season>[0-9]+)[\\/](?P<episode>\d{1,3})[^\\/]*$")
            .named()
            .optimistic(),
        // Episode 16, Episode 16 - Title
        EpisodeExpression::new(
            r".*[\\/][^\\/]* (?P<episode>\d{1,3})(?:-(?P<ending>\d{2,3}))*[^\\/]*$",
        )
        .named()
        .optimistic(),
    ]
});

const SEASON_EPISODE_MARKER: &str = r"s?\d{1,4}x\d{1,3}";

/// Expressions that pick up an ending episode from ranges such as `S01E02-E05`
pub static MULTIPLE_EPISODE_EXPRESSIONS: Lazy<Vec<EpisodeExpression>> = Lazy::new(|| {
    vec![
        EpisodeExpression::new(
            r".*[\\/]s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})(?:(?:-| - )\d{1,4}[ex](?P<ending>\d{1,3}))+[^\\/]*$",
        ),
        EpisodeExpression::new(
            r".*[\\/]s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})(?:(?:-| - )\d{1,4}xe(?P<ending>\d{1,3}))+[^\\/]*$",
        ),
        EpisodeExpression::new(
            r".*[\\/]s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})(?:(?:-| - )?[xe](?P<ending>\d{1,3}))+[^\\/]*$",
        ),
        EpisodeExpression::new(
            r".*[\\/]s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})(?:-x?e?(?P<ending>\d{1,3}))+[^\\/]*$",
        ),
        EpisodeExpression::new(
            r".*[\\/](?P<series>[^\\/]*?)s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})(?:(?:-| - )\d{1,4}[xe](?P<ending>\d{1,3}))+[^\\/]*$",
        )
        .series_guard(SEASON_EPISODE_MARKER),
        EpisodeExpression::new(
            r".*[\\/](?P<series>[^\\/]*?)s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})(?:(?:-| - )\d{1,4}xe(?P<ending>\d{1,3}))+[^\\/]*$",
        )
        .series_guard(SEASON_EPISODE_MARKER),
        EpisodeExpression::new(
            r".*[\\/](?P<series>[^\\/]*?)s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})(?:(?:-| - )?[xe](?P<ending>\d{1,3}))+[^\\/]*$",
        )
        .series_guard(SEASON_EPISODE_MARKER),
        EpisodeExpression::new(
            r".*[\\/](?P<series>[^\\/]*?)s?(?P<season>\d{1,4})x(?P<episode>\d{1,3})(?:-x?e?(?P<ending>\d{1,3}))+[^\\/]*$",
        )
        .series_guard(SEASON_EPISODE_MARKER),
        EpisodeExpression::new(
            r".*[\\/](?P<series>[^\\/]*)s(?P<season>\d{1,4})[x.]?e(?P<episode>\d{1,3})(?:(?:-| - )?[xe](?P<ending>\d{1,3}))+[^\\/]*$",
        ),
        EpisodeExpression::new(
            r".*[\\/](?P<series>[^\\/]*)s(?P<season>\d{1,4})[x.]?e(?P<episode>\d{1,3})(?:-x?e?(?P<ending>\d{1,3}))+[^\\/]*$",
        ),
    ]
    .into_iter()
    .map(EpisodeExpression::named)
    .collect()
});

/// Release junk: everything from the first match onwards is dropped
static CLEAN_STRING_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[ _,.()\[\]\-](ac3|dts|custom|dc|divx|divx5|dsr|dsrip|dutch|dvd|dvdrip|dvdscr|dvdscreener|screener|dvdivx|cam|fragment|fs|hdtv|hdrip|hdtvrip|internal|limited|multisubs|ntsc|ogg|ogm|pal|pdtv|proper|repack|rerip|retail|cd[1-9]|r3|r5|bd5|se|svcd|swedish|german|read.nfo|nfofix|unrated|ws|telesync|ts|telecine|tc|brrip|bdrip|480p|480i|576p|576i|720p|720i|1080p|1080i|2160p|4k|uhd|ultrahd|hdc|hdr|hrhd|hrhdtv|hddvd|bluray|x264|h264|xvid|xvidvd|xxx|www.www|\[.*\])([ _,.()\[\]\-]|$)",
        r"[ _,.()\[\]\-](3d|sbs|tab|hsbs|htab|mvc|\[.*\])([ _,.()\[\]\-]|$)",
        r"(\[.*\])",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

/// Name followed by a year: group 1 is the name, group 2 the year
static CLEAN_DATE_TIME_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![compile(
        r"(.+[^ _,.()\[\]\-])[ _.()\[\]\-]+(19[0-9][0-9]|20[0-9][0-9])([ _,.()\[\]\-][^0-9]|$)",
    )]
});

/// A name split into its clean title and optional year
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    pub name: String,
    pub year: Option<i32>,
}

/// Cut release junk (quality tags, bracketed groups...) off a name
///
/// Expressions are applied in order; a match at position 0 is ignored so a
/// name is never cleaned down to nothing. Returns the cleaned name and
/// whether anything was removed.
pub fn clean_string(name: &str) -> (String, bool) {
    let mut name = name.to_string();
    let mut changed = false;

    for regex in CLEAN_STRING_REGEXES.iter() {
        let cut = regex.find(&name).map(|m| m.start()).filter(|start| *start > 0);
        if let Some(start) = cut {
            name.truncate(start);
            changed = true;
        }
    }

    (name, changed)
}

/// Split a trailing year off a name
///
/// The expressions need something after the year, so names that do not end
/// in a known media extension get a dummy `.mkv` first. If nothing matches
/// directly the name is run through [clean_string] and tried once more.
pub fn clean_date_time(name: &str) -> ParsedName {
    let candidate = if has_media_extension(name) {
        name.to_string()
    } else {
        format!("{name}.mkv")
    };

    if let Some(parsed) = match_date_time(&candidate) {
        return parsed;
    }

    let (cleaned, changed) = clean_string(&candidate);
    if changed && let Some(parsed) = match_date_time(&cleaned) {
        return parsed;
    }

    ParsedName {
        name: name.to_string(),
        year: None,
    }
}

/// Default name parser: strip the year, then the release junk
pub fn parse_name(name: &str) -> ParsedName {
    let dated = clean_date_time(name);
    let (name, _) = clean_string(&dated.name);

    ParsedName {
        name,
        year: dated.year,
    }
}

fn match_date_time(name: &str) -> Option<ParsedName> {
    CLEAN_DATE_TIME_REGEXES.iter().find_map(|regex| {
        let caps = regex.captures(name)?;
        let title = caps.get(1)?.as_str();
        let year = caps.get(2)?.as_str().parse().ok()?;

        Some(ParsedName {
            name: title.trim_end().to_string(),
            year: Some(year),
        })
    })
}

fn has_media_extension(name: &str) -> bool {
    let Some(index) = name.rfind('.') else {
        return false;
    };
    let extension = name[index..].to_lowercase();

    VIDEO_FILE_EXTENSIONS.contains(&extension.as_str())
        || AUDIO_FILE_EXTENSIONS.contains(&extension.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tables_compile() {
        assert_eq!(EPISODE_EXPRESSIONS.len(), 18);
        assert_eq!(MULTIPLE_EPISODE_EXPRESSIONS.len(), 10);
        assert!(MULTIPLE_EPISODE_EXPRESSIONS.iter().all(|e| e.is_named));
        assert!(EPISODE_EXPRESSIONS[0].is_named && !EPISODE_EXPRESSIONS[0].is_optimistic);
    }

    #[test]
    fn test_clean_string_drops_release_tags() {
        let (name, changed) = clean_string("Movie Name 1080p BluRay x264");
        assert!(changed);
        assert_eq!(name, "Movie Name");

        let (name, changed) = clean_string("Plain Title");
        assert!(!changed);
        assert_eq!(name, "Plain Title");
    }

    #[test]
    fn test_clean_string_ignores_match_at_start() {
        let (name, _) = clean_string("[Group] Show");
        assert_eq!(name, "[Group] Show");
    }

    #[test]
    fn test_clean_date_time_extracts_year() {
        assert_eq!(
            clean_date_time("St. Vincent (2014)"),
            ParsedName {
                name: "St. Vincent".to_string(),
                year: Some(2014),
            }
        );
        assert_eq!(clean_date_time("Show Name (2020)").year, Some(2020));
        assert_eq!(clean_date_time("Show Name").year, None);
        assert_eq!(clean_date_time("Show Name").name, "Show Name");
    }

    #[test]
    fn test_parse_name_with_release_junk() {
        let parsed = parse_name("Movie.Name.2019.1080p.BluRay");
        assert_eq!(parsed.name, "Movie.Name");
        assert_eq!(parsed.year, Some(2019));
    }
}
