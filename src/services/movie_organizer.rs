//! Movie file organizer
//!
//! Same pipeline as episodes without the season hierarchy. Movies treat a
//! locked or in-use source as Waiting so the next scan retries, and an
//! existing copy in a different resolution is reported as NewResolution
//! instead of being overwritten.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::MovieFileOrganizationOptions;
use crate::db::{FileOrganizerType, FileSortingStatus, OrganizationResult, file_name_of};
use crate::error::{OrganizeError, Result};

use super::file_utils::{extension_with_dot, get_stream_resolution_from_file_name, join_path};
use super::library::{
    CollectionType, ItemQuery, LibraryFolder, Movie, MovieLookup, ProviderIds, RemoteSearchQuery,
};
use super::naming::ParsedName;
use super::naming_pattern::{MovieNameValues, format_movie_name};
use super::organizer::{
    InUsePolicy, OrganizerContext, PATH_LOCKED_MESSAGE, cancellable, missing_result,
};

/// User correction for a logged movie result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieFileOrganizationRequest {
    pub result_id: String,
    /// Existing library movie; ignored when new movie provider ids are given
    pub movie_id: Option<i64>,
    pub new_movie_name: Option<String>,
    pub new_movie_year: Option<i32>,
    /// Library folder a new movie is created in
    pub target_folder: Option<String>,
    pub new_movie_provider_ids: ProviderIds,
    /// Overrides `overwrite_existing_files` for this correction
    pub request_to_overwrite_existing_file: Option<bool>,
}

pub struct MovieFileOrganizer {
    ctx: OrganizerContext,
}

impl MovieFileOrganizer {
    pub fn new(ctx: OrganizerContext) -> Self {
        Self { ctx }
    }

    /// Organize one movie file; every outcome is reported through the returned result
    pub async fn organize_movie_file(
        &self,
        path: &str,
        options: &MovieFileOrganizationOptions,
        token: &CancellationToken,
    ) -> OrganizationResult {
        info!(path = %path, "Sorting movie file");

        let mut result = OrganizationResult::new(path, self.ctx.source_file_size(path).await);
        result.extracted_resolution = resolution_of(file_name_of(path));

        if self.ctx.monitor.is_path_locked(path) {
            info!(path = %path, "Path is locked by other processes");
            result.set_status(FileSortingStatus::Waiting, PATH_LOCKED_MESSAGE);
            return result;
        }

        result.status = FileSortingStatus::Processing;

        match self.organize_parsed(path, options, &mut result, token).await {
            Ok(Some(previous)) => return previous,
            Ok(None) => {}
            Err(e) => record_error(&mut result, &e),
        }

        self.ctx.save(&mut result);
        result
    }

    /// Organize a logged result as a user-chosen movie
    pub async fn organize_with_correction(
        &self,
        request: &MovieFileOrganizationRequest,
        options: &MovieFileOrganizationOptions,
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

        let options = MovieFileOrganizationOptions {
            overwrite_existing_files: request
                .request_to_overwrite_existing_file
                .unwrap_or(options.overwrite_existing_files),
            ..options.clone()
        };

        if let Err(e) = self.correct(request, &options, &mut result, token).await {
            record_error(&mut result, &e);
        }

        result
    }

    async fn organize_parsed(
        &self,
        path: &str,
        options: &MovieFileOrganizationOptions,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<Option<OrganizationResult>> {
        let movie_info = if self.ctx.library.is_video_file(path) {
            self.ctx.library.parse_name(file_name_of(path))
        } else {
            ParsedName::default()
        };

        if movie_info.name.is_empty() {
            let message = format!("Unable to determine movie name from {path}");
            warn!(path = %path, "Unable to determine movie name");
            result.set_status(FileSortingStatus::Failure, message);
        } else {
            debug!(path = %path, movie = %movie_info.name, year = ?movie_info.year, "Extracted movie information");
            self.organize_by_name(path, &movie_info.name, movie_info.year, options, result, token)
                .await?;
        }

        self.ctx.unchanged_previous_result(result)
    }

    async fn correct(
        &self,
        request: &MovieFileOrganizationRequest,
        options: &MovieFileOrganizationOptions,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<()> {
        let movie = if !request.new_movie_provider_ids.is_empty() {
            let target_folder = self.default_library_folder(options);
            self.create_new_movie(request, target_folder.as_ref(), options, result, token)
                .await?
        } else {
            let id = request
                .movie_id
                .ok_or_else(|| OrganizeError::organization("No movie selected for correction"))?;
            let mut movie = self
                .ctx
                .library
                .get_movie_by_id(id)
                .ok_or_else(|| OrganizeError::organization(format!("Unable to find movie with id {id}")))?;

            let relative = self.movie_path(&result.original_path, &movie, options)?;
            let root = self
                .ctx
                .library
                .get_virtual_folders()
                .into_iter()
                .find(|f| f.collection_type == CollectionType::Movies)
                .and_then(|f| {
                    f.locations
                        .into_iter()
                        .find(|location| movie.path.contains(location.as_str()))
                })
                .ok_or_else(|| {
                    OrganizeError::organization(format!(
                        "Unable to find a movie library folder containing {}",
                        movie.path
                    ))
                })?;

            movie.path = join_path(&root, &relative);
            movie
        };

        result.organizer_type = FileOrganizerType::Movie;

        let source = result.original_path.clone();
        self.sort_movie(&source, &movie, options, result).await?;

        self.ctx.save(result);
        Ok(())
    }

    async fn organize_by_name(
        &self,
        source: &str,
        name: &str,
        year: Option<i32>,
        options: &MovieFileOrganizationOptions,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<()> {
        let mut movie = self.get_matching_movie(name, year, None, result, token).await?;

        if movie.is_none() {
            movie = self.auto_detect_movie(name, year, options, result, token).await?;
        }

        let Some(movie) = movie else {
            let message = format!("Unable to find movie in library matching name {name}");
            warn!(movie = %name, "Unable to find movie in library");
            result.set_status(FileSortingStatus::Failure, message);
            return Ok(());
        };

        result.organizer_type = FileOrganizerType::Movie;
        self.sort_movie(source, &movie, options, result).await
    }

    /// Library movie by name and year with the same container as the source
    async fn get_matching_movie(
        &self,
        name: &str,
        year: Option<i32>,
        target_folder: Option<&LibraryFolder>,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<Option<Movie>> {
        let (name_without_year, year) = self.split_name(name, year);

        result.extracted_name = Some(name_without_year.clone());
        result.extracted_year = year;
        result.extracted_resolution = resolution_of(name);

        let query = ItemQuery {
            search_term: Some(name_without_year),
            years: year.into_iter().collect(),
            ancestor_id: target_folder.map(|f| f.internal_id),
            ..Default::default()
        };

        let source_extension = extension_with_dot(&result.original_path);
        let found = cancellable(token, self.ctx.library.find_movies(&query)).await?;

        Ok(found
            .into_iter()
            .find(|m| extension_with_dot(&m.path) == source_extension))
    }

    async fn auto_detect_movie(
        &self,
        name: &str,
        year: Option<i32>,
        options: &MovieFileOrganizationOptions,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<Option<Movie>> {
        if !options.auto_detect_movie {
            return Ok(None);
        }

        let (name_without_year, year) = self.split_name(name, year);
        let target_folder = self.default_library_folder(options);

        let lookup = MovieLookup {
            name: name_without_year,
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
            .search_remote(RemoteSearchQuery::Movie(lookup), token)
            .await?;
        let Some(found) = candidates.into_iter().next() else {
            debug!(name = %name, "No remote movie found");
            return Ok(None);
        };

        info!(name = %name, movie = %found.name, "Auto-detected movie");

        let request = MovieFileOrganizationRequest {
            new_movie_name: Some(found.name),
            new_movie_year: found.production_year,
            new_movie_provider_ids: found.provider_ids,
            target_folder: options.default_movie_library_path.clone(),
            ..Default::default()
        };

        self.create_new_movie(&request, target_folder.as_ref(), options, result, token)
            .await
            .map(Some)
    }

    /// Existing movie with the requested name, or an unsaved one under the target folder
    async fn create_new_movie(
        &self,
        request: &MovieFileOrganizationRequest,
        target_folder: Option<&LibraryFolder>,
        options: &MovieFileOrganizationOptions,
        result: &mut OrganizationResult,
        token: &CancellationToken,
    ) -> Result<Movie> {
        let name = request.new_movie_name.clone().unwrap_or_default();

        if let Some(movie) = self
            .get_matching_movie(&name, request.new_movie_year, target_folder, result, token)
            .await?
        {
            return Ok(movie);
        }

        let mut movie = Movie {
            name,
            production_year: request.new_movie_year,
            is_in_mixed_folder: !options.create_movie_in_folder,
            provider_ids: request.new_movie_provider_ids.clone(),
            ..Default::default()
        };

        let relative = self.movie_path(&result.original_path, &movie, options)?;
        let Some(root) = request.target_folder.as_deref().filter(|p| !p.is_empty()) else {
            return Err(undetermined_target(&result.original_path));
        };

        movie.path = join_path(root, &relative);
        Ok(movie)
    }

    /// Path of the movie file relative to its library folder
    fn movie_path(
        &self,
        source: &str,
        movie: &Movie,
        options: &MovieFileOrganizationOptions,
    ) -> Result<String> {
        let sanitize = |s: &str| self.ctx.fs.get_valid_filename(s);
        let values = MovieNameValues {
            movie_name: &movie.name,
            production_year: movie.production_year,
            source_path: source,
        };

        let file_name = format_movie_name(&options.movie_pattern, &values, sanitize)?;
        let path = if options.create_movie_in_folder {
            let folder = format_movie_name(&options.movie_folder_pattern, &values, sanitize)?;
            join_path(&folder, &file_name)
        } else {
            file_name
        };

        if path.is_empty() {
            return Err(undetermined_target(source));
        }

        Ok(path)
    }

    /// Final stage: claim the result, apply the overwrite policy and move the file
    ///
    /// Only a registry conflict is returned as an error; everything after
    /// the claim is recorded on the result.
    async fn sort_movie(
        &self,
        source: &str,
        movie: &Movie,
        options: &MovieFileOrganizationOptions,
        result: &mut OrganizationResult,
    ) -> Result<()> {
        let is_new = result.is_new();
        if is_new {
            self.ctx.save(result);
        }

        let Some(guard) = self.ctx.registry.try_add(result, is_new) else {
            return Err(OrganizeError::organization(
                "File is currently processed otherwise. Please try again later.",
            ));
        };

        let placed = self.place_movie_file(source, movie, options, result).await;
        guard.release(result);

        if let Err(e) = placed {
            record_error(result, &e);
        }

        Ok(())
    }

    async fn place_movie_file(
        &self,
        source: &str,
        movie: &Movie,
        options: &MovieFileOrganizationOptions,
        result: &mut OrganizationResult,
    ) -> Result<()> {
        info!(path = %source, movie = %movie.path, "Sorting file into movie");

        result.target_path = movie.path.clone();
        result.extracted_resolution = resolution_of(source);

        let file_exists = self.ctx.fs.file_exists(&movie.path).await;

        if !options.overwrite_existing_files {
            if options.copy_original_file
                && file_exists
                && self.is_same_movie(source, &movie.path).await
            {
                let message = format!(
                    "File '{source}' already copied to new path '{}', stopping organization",
                    movie.path
                );
                info!(path = %source, "File already copied");
                result.set_status(FileSortingStatus::SkippedExisting, message);
                return Ok(());
            }

            if file_exists {
                let resolution = result.extracted_resolution.clone().unwrap_or_default();

                if has_stream_resolution(movie, &resolution) {
                    let message = format!(
                        "File '{source}' already exists as '{}', stopping organization",
                        movie.path
                    );
                    info!(path = %source, "Movie already exists");
                    result.set_status(FileSortingStatus::SkippedExisting, message);
                } else {
                    let message = format!(
                        "The library currently contains the movie {}, but it has a different resolution than the current source file.",
                        movie.name
                    );
                    info!(path = %source, resolution = %resolution, "New resolution of an existing movie");
                    result.set_status(FileSortingStatus::NewResolution, message);
                    result.target_path = String::new();
                }
                return Ok(());
            }
        }

        self.ctx
            .perform_file_sorting(result, options.copy_original_file, InUsePolicy::Wait)
            .await?;
        Ok(())
    }

    async fn is_same_movie(&self, source: &str, target: &str) -> bool {
        let source = self.ctx.fs.get_file_info(source).await;
        let target = self.ctx.fs.get_file_info(target).await;
        match (source, target) {
            (Ok(a), Ok(b)) => a.length == b.length && a.extension == b.extension,
            _ => false,
        }
    }

    /// Parsed title (falling back to the raw name) and year (falling back to `year`)
    fn split_name(&self, name: &str, year: Option<i32>) -> (String, Option<i32>) {
        let parsed = self.ctx.library.parse_name(name);
        let title = if parsed.name.trim().is_empty() {
            name.to_string()
        } else {
            parsed.name
        };
        (title, parsed.year.or(year))
    }

    fn default_library_folder(&self, options: &MovieFileOrganizationOptions) -> Option<LibraryFolder> {
        options
            .default_movie_library_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .and_then(|p| self.ctx.library.find_folder_by_path(p))
    }
}

/// Whether any stream of the library movie already reports `resolution`
///
/// An empty resolution is contained in every title, so a movie with streams
/// never counts as a new resolution of an untagged source. A movie without
/// streams (media info not read yet) always counts as a new resolution.
fn has_stream_resolution(movie: &Movie, resolution: &str) -> bool {
    movie
        .media_streams
        .iter()
        .any(|s| s.display_title.contains(resolution))
}

fn resolution_of(name: &str) -> Option<String> {
    let resolution = get_stream_resolution_from_file_name(name);
    (!resolution.is_empty()).then(|| resolution.to_string())
}

fn undetermined_target(source: &str) -> OrganizeError {
    OrganizeError::organization(format!(
        "Unable to sort {source} because target path could not be determined."
    ))
}

/// In-use errors leave the file for the next scan; everything else is a failure
fn record_error(result: &mut OrganizationResult, e: &OrganizeError) {
    if e.is_transient() {
        let message = format!(
            "Waiting to move file from {} to {}: {e}",
            result.original_path, result.target_path
        );
        warn!(path = %result.original_path, error = %e, "Movie file is in use");
        result.set_status(FileSortingStatus::Waiting, message);
    } else {
        error!(path = %result.original_path, error = %e, "Error organizing movie file");
        result.set_status(FileSortingStatus::Failure, e.to_string());
    }
}
