//! Episode file organizer
//!
//! Takes a downloaded file, works out series/season/episode from its path,
//! finds (or creates) the matching library entries and sorts the file into
//! the series folder using the configured naming patterns.

use std::collections::HashSet;
use std::io;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::TvFileOrganizationOptions;
use crate::db::{
    FileOrganizerType, FileSortingStatus, MIN_MATCH_STRING_LEN, OrganizationResult,
    SmartMatchResult, file_name_of,
};
use crate::error::{OrganizeError, Result};

use super::file_utils::{
    directory_of, extension_with_dot, file_stem_of, join_path, replace_ignore_case, same_path,
};
use super::filename_parser::{ParseOptions, parse_episode_path};
use super::library::{
    Episode, EpisodeLookup, ItemQuery, LibraryFolder, LocationType, ProviderIds,
    RemoteSearchQuery, Season, Series, SeriesLookup,
};
use super::naming_pattern::{
    EpisodeNameValues, format_episode_file_name, format_season_folder_name,
    format_series_folder_name,
};
use super::organizer::{
    InUsePolicy, OrganizerContext, PATH_LOCKED_MESSAGE, cancellable, missing_result,
};

/// User correction for a logged episode result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EpisodeFileOrganizationRequest {
    pub result_id: String,
    /// Existing library series; ignored when new series provider ids are given
    pub series_id: Option<i64>,
    pub season_number: i32,
    pub episode_number: i32,
    pub ending_episode_number: Option<i32>,
    /// Remember the extracted name as an alias of the chosen series
    pub remember_correction: bool,
    pub new_series_name: Option<String>,
    pub new_series_year: Option<i32>,
    /// Library folder a new series is created in
    pub target_folder: Option<String>,
    pub new_series_provider_ids: ProviderIds,
    /// Overrides `overwrite_existing_episodes` for this correction
    pub request_to_overwrite_existing_file: Option<bool>,
}

/// Season/episode identity carried from parsing (or a correction) into the lookups
#[derive(Debug, Clone, Copy, Default)]
struct EpisodeNumbers {
    season: Option<i32>,
    episode: Option<i32>,
    ending: Option<i32>,
    premiere_date: Option<NaiveDate>,
}

pub struct EpisodeFileOrganizer {
    ctx: OrganizerContext,
}

impl EpisodeFileOrganizer {
    pub fn new(ctx: OrganizerContext) -> Self {
        Self { ctx }
    }

    /// Organize one episode file
    ///
    /// Never fails: every outcome, including errors, is reported through the
    /// returned result. A repeat of an unchanged failure returns the logged
    /// result instead of saving a new one.
    pub async fn organize_episode_file(
        &self,
        path: &str,
        options: &TvFileOrganizationOptions,
        token: &CancellationToken,
    ) -> OrganizationResult {
        info!(path = %path, "Sorting episode file");

        let mut result = OrganizationResult::new(path, self.ctx.source_file_size(path).await);

        if self.ctx.monitor.is_path_locked(path) {
            info!(path = %path, "Path is locked by other processes");
            result.set_status(FileSortingStatus::Failure, PATH_LOCKED_MESSAGE);
            return result;
        }

        match self.organize_parsed(path, options, &mut result, token).await {
            Ok(Some(previous)) => return previous,
            Ok(None) => {}
            Err(e) => {
                error!(path = %path, error = %e, "Error organizing episode file");
                result.set_status(FileSortingStatus::Failure, e.to_string());
            }
        }

        self.ctx.save(&mut result);
        result
    }

    /// Organize a logged result into a user-chosen series
    pub async fn organize_with_correction(
        &self,
        request: &EpisodeFileOrganizationRequest,
        options: &TvFileOrganizationOptions,
        token: &CancellationToken,
    ) -> OrganizationResult {
        let mut result = match self.ctx.store.get_result(&request.result_id) {
            Ok(Some(result)) => result,
            Ok(None) => {
                return missing_result(
                    &request.result_id,
                    format!("No organization result found with id {}", request.result_id),
                );
            }
            Err(e) => return missing_result(&request.result_id, e.to_string()),
        };

        let options = TvFileOrganizationOptions {
            overwrite_existing_episodes: request
                .request_to_overwrite_existing_file
                .unwrap_or(options.overwrite_existing_episodes),
            ..options.clone()
        };

        if let Err(e) = self.correct(request, &options, &mut result, token).await {
            error!(path = %result.original_path, error = %e, "Error organizing episode file");
            result.set_status(FileSortingStatus::Failure, e.to_string());
        }

        result
    }

    async fn organize_parsed(
        &self,
        path: &str,
        options: &TvFileOrganizationOptions,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<Option<OrganizationResult>> {
        let info = parse_episode_path(path, &ParseOptions::default());
        let raw_series_name = info.series_name.clone().unwrap_or_default();

        // The parser already split a trailing year off the series name
        let mut series_name = raw_series_name.clone();
        let mut series_year = info.series_year;
        if !series_name.is_empty() {
            let parsed = self.ctx.library.parse_name(&series_name);
            series_name = parsed.name;
            series_year = parsed.year.or(series_year);
        }
        if series_name.trim().is_empty() {
            series_name = raw_series_name;
        }

        if series_name.is_empty() {
            let message = format!("Unable to determine series name from {path}");
            warn!(path = %path, "Unable to determine series name");
            result.set_status(FileSortingStatus::Failure, message);
        } else if info.has_episode_identity() {
            result.extracted_season_number = info.season_number;
            result.extracted_episode_number = info.episode_number;
            result.extracted_ending_episode_number = info.ending_episode_number;
            result.organizer_type = FileOrganizerType::Episode;

            let premiere_date = if info.is_by_date {
                info.year
                    .zip(info.month.zip(info.day))
                    .and_then(|(y, (m, d))| NaiveDate::from_ymd_opt(y, m, d))
            } else {
                None
            };

            debug!(
                path = %path,
                series = %series_name,
                season = ?info.season_number,
                episode = ?info.episode_number,
                date = ?premiere_date,
                "Extracted episode information"
            );

            let numbers = EpisodeNumbers {
                season: info.season_number,
                episode: info.episode_number,
                ending: info.ending_episode_number,
                premiere_date,
            };

            self.organize_by_name(path, &series_name, series_year, numbers, options, result, token)
                .await?;
        } else {
            let message = format!("Unable to determine episode number from {path}");
            warn!(path = %path, "Unable to determine episode number");
            result.set_status(FileSortingStatus::Failure, message);
        }

        self.ctx.unchanged_previous_result(result)
    }

    async fn correct(
        &self,
        request: &EpisodeFileOrganizationRequest,
        options: &TvFileOrganizationOptions,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<()> {
        let series = if !request.new_series_provider_ids.is_empty() {
            let target_folder = self.default_library_folder(options);
            self.create_new_series(request, target_folder.as_ref(), options, token)
                .await?
        } else {
            let id = request
                .series_id
                .ok_or_else(|| OrganizeError::organization("No series selected for correction"))?;
            self.ctx
                .library
                .get_series_by_id(id)
                .ok_or_else(|| OrganizeError::organization(format!("Unable to find series with id {id}")))?
        };

        result.organizer_type = FileOrganizerType::Episode;

        let numbers = EpisodeNumbers {
            season: Some(request.season_number),
            episode: Some(request.episode_number),
            ending: request.ending_episode_number,
            premiere_date: None,
        };

        let source = result.original_path.clone();
        self.organize_with_series(
            &source,
            &series,
            numbers,
            options,
            request.remember_correction,
            result,
            token,
        )
        .await?;

        self.ctx.save(result);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn organize_by_name(
        &self,
        source: &str,
        series_name: &str,
        series_year: Option<i32>,
        numbers: EpisodeNumbers,
        options: &TvFileOrganizationOptions,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<()> {
        let mut series = self
            .get_matching_series(series_name, series_year, None, Some(&mut *result), token)
            .await?;

        if series.is_none() {
            series = self
                .auto_detect_series(series_name, series_year, options, token)
                .await?;
        }

        let Some(series) = series else {
            let message = format!("Unable to find series in library matching name {series_name}");
            warn!(series = %series_name, "Unable to find series in library");
            result.set_status(FileSortingStatus::Failure, message);
            return Ok(());
        };

        self.organize_with_series(source, &series, numbers, options, false, result, token)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn organize_with_series(
        &self,
        source: &str,
        series: &Series,
        numbers: EpisodeNumbers,
        options: &TvFileOrganizationOptions,
        remember_correction: bool,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<()> {
        let mut episode = self.get_matching_episode(series, numbers, source, token).await?;

        let season = match episode
            .season
            .clone()
            .filter(|s| s.path.as_deref().is_some_and(|p| !p.is_empty()))
        {
            Some(season) => season,
            None => self.get_matching_season(series, &episode, options)?,
        };

        if episode.path.as_deref().is_none_or(str::is_empty) {
            episode.path = Some(self.episode_file_path(source, &series.name, &season, &episode, options)?);
        }

        self.sort_episode(source, series, &episode, options, remember_correction, result)
            .await;
        Ok(())
    }

    /// Library series by name and year, then through a remembered alias
    async fn get_matching_series(
        &self,
        name: &str,
        year: Option<i32>,
        target_folder: Option<&LibraryFolder>,
        result: Option<&mut OrganizationResult>,
        token: &CancellationToken,
    ) -> Result<Option<Series>> {
        if let Some(result) = result {
            result.extracted_name = Some(name.to_string());
            result.extracted_year = year;
        }

        let ancestor_id = target_folder.map(|f| f.internal_id);
        let query = ItemQuery {
            search_term: Some(name.to_string()),
            years: year.into_iter().collect(),
            ancestor_id,
            ..Default::default()
        };

        let found = cancellable(token, self.ctx.library.find_series(&query)).await?;
        if let Some(series) = found.into_iter().next() {
            return Ok(Some(series));
        }

        let smart_match = self
            .ctx
            .store
            .get_smart_matches()?
            .into_iter()
            .find(|m| m.matches(name));

        let Some(smart_match) = smart_match else {
            return Ok(None);
        };

        debug!(name = %name, series = %smart_match.item_name, "Using smart match");

        let query = ItemQuery {
            name: Some(smart_match.item_name),
            ancestor_id,
            ..Default::default()
        };
        let found = cancellable(token, self.ctx.library.find_series(&query)).await?;
        Ok(found.into_iter().next())
    }

    async fn auto_detect_series(
        &self,
        name: &str,
        year: Option<i32>,
        options: &TvFileOrganizationOptions,
        token: &CancellationToken,
    ) -> Result<Option<Series>> {
        if !options.auto_detect_series {
            return Ok(None);
        }

        let target_folder = self.default_library_folder(options);
        let lookup = SeriesLookup {
            name: name.to_string(),
            year,
            metadata_language: target_folder
                .as_ref()
                .and_then(|f| f.preferred_metadata_language.clone()),
            metadata_country_code: target_folder
                .as_ref()
                .and_then(|f| f.preferred_metadata_country_code.clone()),
        };

        let candidates = self
            .ctx
            .search_remote(RemoteSearchQuery::Series(lookup), token)
            .await?;
        let Some(found) = candidates.into_iter().next() else {
            debug!(name = %name, "No remote series found");
            return Ok(None);
        };

        info!(name = %name, series = %found.name, "Auto-detected series");

        let request = EpisodeFileOrganizationRequest {
            new_series_name: Some(found.name),
            new_series_year: found.production_year,
            new_series_provider_ids: found.provider_ids,
            target_folder: options.default_series_library_path.clone(),
            ..Default::default()
        };

        self.create_new_series(&request, target_folder.as_ref(), options, token)
            .await
            .map(Some)
    }

    /// Existing series with the requested name, or an unsaved one under the target folder
    async fn create_new_series(
        &self,
        request: &EpisodeFileOrganizationRequest,
        target_folder: Option<&LibraryFolder>,
        options: &TvFileOrganizationOptions,
        token: &CancellationToken,
    ) -> Result<Series> {
        let name = request.new_series_name.clone().unwrap_or_default();

        if let Some(series) = self
            .get_matching_series(&name, request.new_series_year, target_folder, None, token)
            .await?
        {
            return Ok(series);
        }

        let Some(root) = request.target_folder.as_deref().filter(|p| !p.is_empty()) else {
            return Err(OrganizeError::organization(format!(
                "Unable to create series {name} because no target folder is set"
            )));
        };

        let folder_name = format_series_folder_name(
            &options.series_folder_pattern,
            &name,
            request.new_series_year,
            |s| self.ctx.fs.get_valid_filename(s),
        );

        Ok(Series {
            path: join_path(root, &folder_name),
            name,
            production_year: request.new_series_year,
            provider_ids: request.new_series_provider_ids.clone(),
            ..Default::default()
        })
    }

    async fn get_matching_episode(
        &self,
        series: &Series,
        numbers: EpisodeNumbers,
        source: &str,
        token: &CancellationToken,
    ) -> Result<Episode> {
        if !series.is_new() {
            let source_extension = extension_with_dot(source);
            let existing = self.ctx.library.get_episodes(series).into_iter().find(|e| {
                e.parent_index_number == numbers.season
                    && e.index_number == numbers.episode
                    && e.index_number_end == numbers.ending
                    && e.location_type == LocationType::FileSystem
                    && e.path.as_deref().and_then(extension_with_dot) == source_extension
            });

            if let Some(episode) = existing {
                return Ok(episode);
            }
        }

        self.create_new_episode(series, numbers, token).await
    }

    async fn create_new_episode(
        &self,
        series: &Series,
        numbers: EpisodeNumbers,
        token: &CancellationToken,
    ) -> Result<Episode> {
        let lookup = EpisodeLookup {
            parent_index_number: numbers.season,
            index_number: numbers.episode,
            index_number_end: numbers.ending,
            premiere_date: numbers.premiere_date,
            series_provider_ids: series.provider_ids.clone(),
            metadata_language: series.preferred_metadata_language.clone(),
            metadata_country_code: series.preferred_metadata_country_code.clone(),
        };

        let candidates = self
            .ctx
            .search_remote(RemoteSearchQuery::Episode(lookup), token)
            .await?;

        let Some(found) = candidates.into_iter().next() else {
            let message = format!(
                "No provider metadata found for {} Season {} Episode {}",
                series.name,
                display_number(numbers.season),
                display_number(numbers.episode)
            );
            warn!(series = %series.name, "{message}");
            return Err(OrganizeError::Organization(message));
        };

        Ok(Episode {
            series_id: series.internal_id,
            name: found.name,
            parent_index_number: numbers.season.or(found.parent_index_number),
            index_number: numbers.episode.or(found.index_number),
            index_number_end: numbers.ending.or(found.index_number_end),
            provider_ids: found.provider_ids,
            ..Default::default()
        })
    }

    fn get_matching_season(
        &self,
        series: &Series,
        episode: &Episode,
        options: &TvFileOrganizationOptions,
    ) -> Result<Season> {
        let mut season = match episode.season.clone() {
            Some(season) => season,
            None => {
                let existing = if series.is_new() {
                    None
                } else {
                    self.ctx.library.get_seasons(series).into_iter().find(|s| {
                        s.index_number == episode.parent_index_number
                            && s.location_type == LocationType::FileSystem
                    })
                };

                match (existing, episode.parent_index_number) {
                    (Some(season), _) => season,
                    (None, Some(index)) => Season {
                        series_id: series.internal_id,
                        index_number: Some(index),
                        ..Default::default()
                    },
                    (None, None) => return Err(no_season_found(series, episode)),
                }
            }
        };

        if season.path.as_deref().is_none_or(str::is_empty) {
            let season_number = episode
                .parent_index_number
                .ok_or_else(|| no_season_found(series, episode))?;
            season.path = Some(self.season_folder_path(series, season_number, options));
        }

        Ok(season)
    }

    fn season_folder_path(
        &self,
        series: &Series,
        season_number: i32,
        options: &TvFileOrganizationOptions,
    ) -> String {
        // Series kept flat in the library stay flat
        if !series.is_new() && self.ctx.library.has_direct_video_children(series) {
            return series.path.clone();
        }

        let folder = format_season_folder_name(
            &options.season_folder_pattern,
            &options.season_zero_folder_name,
            season_number,
            |s| self.ctx.fs.get_valid_filename(s),
        );
        join_path(&series.path, &folder)
    }

    fn episode_file_path(
        &self,
        source: &str,
        series_name: &str,
        season: &Season,
        episode: &Episode,
        options: &TvFileOrganizationOptions,
    ) -> Result<String> {
        let title = self.ctx.fs.get_valid_filename(&episode.name);
        if !options.allow_tba && title.trim() == "TBA" {
            return Err(OrganizeError::organization(
                "Returned metadata title is 'TBA'. Current settings prevent this file from being moved.",
            ));
        }

        let (Some(episode_number), Some(season_number)) = (episode.index_number, season.index_number)
        else {
            return Err(OrganizeError::organization(
                "Season and episode number are required to name the episode file",
            ));
        };

        let pattern = if episode.index_number_end.is_some() {
            &options.multi_episode_name_pattern
        } else {
            &options.episode_name_pattern
        };

        let values = EpisodeNameValues {
            series_name,
            season_number,
            episode_number,
            ending_episode_number: episode.index_number_end,
            episode_title: &episode.name,
            source_path: source,
        };
        let file_name = format_episode_file_name(pattern, &values, |s| self.ctx.fs.get_valid_filename(s))?;

        Ok(join_path(season.path.as_deref().unwrap_or_default(), &file_name))
    }

    /// Final stage: claim the result, apply the duplicate policy and move the file
    async fn sort_episode(
        &self,
        source: &str,
        series: &Series,
        episode: &Episode,
        options: &TvFileOrganizationOptions,
        remember_correction: bool,
        result: &mut OrganizationResult,
    ) {
        info!(path = %source, series = %series.path, "Sorting file into series");

        let original_extracted_name = result.extracted_name.clone();

        let is_new = result.is_new();
        if is_new {
            self.ctx.save(result);
        }

        let Some(guard) = self.ctx.registry.try_add(result, is_new) else {
            let message = format!(
                "File {source} is currently processed otherwise. Please try again later."
            );
            warn!(path = %source, "File is already being organized, stopping organization");
            result.set_status(FileSortingStatus::Failure, message);
            return;
        };

        let placed = self
            .place_episode_file(source, series, episode, options, result)
            .await;
        guard.release(result);

        match placed {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                error!(path = ?episode.path, error = %e, "Error sorting episode");
                result.set_status(
                    FileSortingStatus::Failure,
                    format!("Error sorting episode: '{e}'."),
                );
                return;
            }
        }

        if remember_correction
            && let Some(extracted) = original_extracted_name.as_deref()
            && let Err(e) = self.save_smart_match_string(extracted, &series.name)
        {
            error!(name = %extracted, error = %e, "Failed to save smart match");
        }
    }

    /// Returns false when organization stopped before the file was sorted
    async fn place_episode_file(
        &self,
        source: &str,
        series: &Series,
        episode: &Episode,
        options: &TvFileOrganizationOptions,
        result: &mut OrganizationResult,
    ) -> Result<bool> {
        let Some(new_path) = episode.path.clone().filter(|p| !p.is_empty()) else {
            let message =
                format!("Unable to sort {source} because target path could not be determined.");
            info!(path = %source, "Target path could not be determined, stopping organization");
            result.set_status(FileSortingStatus::Failure, message);
            return Ok(false);
        };

        info!(path = %source, target = %new_path, "Sorting file to new path");
        result.target_path = new_path.clone();

        let file_exists = self.ctx.fs.file_exists(&new_path).await;

        if options.single_episode_version {
            result.duplicate_paths = self
                .other_duplicate_paths(&new_path, series, episode)
                .await;
            debug!(duplicates = ?result.duplicate_paths, "Other duplicate paths");
        }

        if !options.overwrite_existing_episodes {
            if options.copy_original_file
                && file_exists
                && self.is_same_size(source, &new_path).await
                && result.duplicate_paths.len() == 1
            {
                let message = format!("File '{source}' already copied to new path '{new_path}.'");
                info!(path = %source, "File already copied, stopping organization");
                result.set_status(FileSortingStatus::SkippedExisting, message);
                return Ok(false);
            }

            if !result.duplicate_paths.is_empty() {
                let message = format!(
                    "File '{source}' already exists as: '{}'.",
                    result.duplicate_paths.join("', '")
                );
                info!(path = %source, "Duplicate episode exists, stopping organization");
                result.set_status(FileSortingStatus::SkippedExisting, message);
                return Ok(false);
            }

            if file_exists {
                let message = format!("File '{source}' already exists as '{new_path}'.");
                info!(path = %source, "Target exists, stopping organization");
                result.set_status(FileSortingStatus::SkippedExisting, message);
                return Ok(false);
            }
        }

        let sorted = self
            .ctx
            .perform_file_sorting(result, options.copy_original_file, InUsePolicy::Fail)
            .await?;

        if options.single_episode_version && sorted {
            self.remove_duplicates(&new_path, result).await;
        }

        Ok(true)
    }

    async fn remove_duplicates(&self, new_path: &str, result: &OrganizationResult) {
        let mut renamed_related = false;

        for path in &result.duplicate_paths {
            if same_path(path, new_path) {
                continue;
            }

            info!(path = %path, "Removing duplicate episode");
            self.ctx.monitor.report_file_system_change_beginning(path);

            let rename_related =
                !renamed_related && same_path(&directory_of(path), &directory_of(new_path));
            if rename_related {
                renamed_related = true;
            }

            if let Err(e) = self.delete_library_file(path, rename_related, new_path).await {
                error!(path = %path, error = %e, "Error removing duplicate episode");
            }

            self.ctx.monitor.report_file_system_change_complete(path, true);
        }
    }

    /// Delete a library file, optionally renaming its sidecar files after the new target
    async fn delete_library_file(
        &self,
        path: &str,
        rename_related: bool,
        target: &str,
    ) -> io::Result<()> {
        self.ctx.fs.delete_file(path).await?;

        if !rename_related {
            return Ok(());
        }

        let original_stem = file_stem_of(path);
        let directory = directory_of(path);
        if original_stem.trim().is_empty() || directory.trim().is_empty() {
            return Ok(());
        }

        let target_stem = file_stem_of(target);
        let prefix = original_stem.to_lowercase();

        for file in self.ctx.fs.get_file_paths(&directory).await? {
            if !file_stem_of(&file).to_lowercase().starts_with(&prefix) {
                continue;
            }

            let renamed = replace_ignore_case(file_name_of(&file), &original_stem, &target_stem);
            let destination = join_path(&directory_of(&file), &renamed);
            if same_path(&file, &destination) {
                continue;
            }

            debug!(source = %file, target = %destination, "Renaming related file");
            self.ctx.fs.move_file(&file, &destination).await?;
        }

        Ok(())
    }

    /// Other files holding the same episode: library copies plus video siblings of the target
    async fn other_duplicate_paths(
        &self,
        target: &str,
        series: &Series,
        episode: &Episode,
    ) -> Vec<String> {
        let (Some(season), Some(number)) = (episode.parent_index_number, episode.index_number) else {
            return Vec::new();
        };

        if series.is_new() {
            return Vec::new();
        }

        let mut paths: Vec<String> = self
            .ctx
            .library
            .get_episodes(series)
            .into_iter()
            .filter(|e| {
                e.location_type != LocationType::Virtual
                    && e.parent_index_number == Some(season)
                    && e.index_number == Some(number)
                    && e.index_number_end == episode.index_number_end
            })
            .filter_map(|e| e.path)
            .collect();

        let target_stem = file_stem_of(target).to_lowercase();
        match self.ctx.fs.get_file_paths(&directory_of(target)).await {
            Ok(files) => paths.extend(files.into_iter().filter(|f| {
                self.ctx.library.is_video_file(f) && file_stem_of(f).to_lowercase() == target_stem
            })),
            // The season folder may not exist yet
            Err(e) => debug!(path = %target, error = %e, "Could not list target folder"),
        }

        let mut seen = HashSet::new();
        paths.retain(|p| seen.insert(p.to_lowercase()));
        paths
    }

    async fn is_same_size(&self, source: &str, target: &str) -> bool {
        let source = self.ctx.fs.get_file_info(source).await;
        let target = self.ctx.fs.get_file_info(target).await;
        match (source, target) {
            (Ok(a), Ok(b)) => a.length == b.length,
            _ => false,
        }
    }

    fn save_smart_match_string(&self, match_string: &str, series_name: &str) -> Result<()> {
        if match_string.chars().count() < MIN_MATCH_STRING_LEN {
            return Ok(());
        }

        let lower_name = series_name.to_lowercase();
        let mut record = self
            .ctx
            .store
            .get_smart_matches()?
            .into_iter()
            .find(|r| r.item_name.to_lowercase() == lower_name)
            .unwrap_or_else(|| SmartMatchResult::new(series_name, FileOrganizerType::Episode));

        if record.add_match_string(match_string) {
            info!(name = %match_string, series = %series_name, "Remembering smart match");
            self.ctx.store.save_smart_match(&record)?;
        }

        Ok(())
    }

    fn default_library_folder(&self, options: &TvFileOrganizationOptions) -> Option<LibraryFolder> {
        options
            .default_series_library_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .and_then(|p| self.ctx.library.find_folder_by_path(p))
    }
}

fn no_season_found(series: &Series, episode: &Episode) -> OrganizeError {
    let message = format!(
        "No season found for {} season {} episode {}",
        series.name,
        display_number(episode.parent_index_number),
        display_number(episode.index_number)
    );
    warn!(series = %series.name, "{message}");
    OrganizeError::Organization(message)
}

fn display_number(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
