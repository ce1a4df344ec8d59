//! File organization service
//!
//! Owns the result store, the in-progress registry and both organizers, and
//! exposes the operations a UI or scheduler needs on top of them: organizing,
//! replaying logged results and maintaining the log and smart matches.

use std::io;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{AutoOrganizeOptions, MovieFileOrganizationOptions, TvFileOrganizationOptions};
use crate::db::{
    FileOrganizerType, OrganizationResult, QueryResult, ResultQuery, ResultStore,
    SmartMatchResult,
};
use crate::error::{OrganizeError, Result};

use super::episode_organizer::{EpisodeFileOrganizationRequest, EpisodeFileOrganizer};
use super::filesystem::FileSystem;
use super::library::{LibraryManager, LibraryMonitor, MetadataProvider};
use super::movie_organizer::{MovieFileOrganizationRequest, MovieFileOrganizer};
use super::organizer::OrganizerContext;
use super::progress::{InProgressRegistry, OrganizationEvent};

pub struct FileOrganizationService {
    ctx: OrganizerContext,
    episodes: EpisodeFileOrganizer,
    movies: MovieFileOrganizer,
}

impl FileOrganizationService {
    pub fn new(
        store: Arc<dyn ResultStore>,
        library: Arc<dyn LibraryManager>,
        monitor: Arc<dyn LibraryMonitor>,
        provider: Arc<dyn MetadataProvider>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self::from_context(OrganizerContext {
            store,
            registry: Arc::new(InProgressRegistry::new()),
            library,
            monitor,
            provider,
            fs,
        })
    }

    pub fn from_context(ctx: OrganizerContext) -> Self {
        Self {
            episodes: EpisodeFileOrganizer::new(ctx.clone()),
            movies: MovieFileOrganizer::new(ctx.clone()),
            ctx,
        }
    }

    pub fn context(&self) -> &OrganizerContext {
        &self.ctx
    }

    /// Subscribe to result log events
    pub fn subscribe(&self) -> broadcast::Receiver<OrganizationEvent> {
        self.ctx.registry.subscribe()
    }

    pub async fn organize_episode_file(
        &self,
        path: &str,
        options: &TvFileOrganizationOptions,
        token: &CancellationToken,
    ) -> OrganizationResult {
        self.episodes.organize_episode_file(path, options, token).await
    }

    pub async fn organize_movie_file(
        &self,
        path: &str,
        options: &MovieFileOrganizationOptions,
        token: &CancellationToken,
    ) -> OrganizationResult {
        self.movies.organize_movie_file(path, options, token).await
    }

    pub async fn organize_episode_with_correction(
        &self,
        request: &EpisodeFileOrganizationRequest,
        options: &TvFileOrganizationOptions,
        token: &CancellationToken,
    ) -> OrganizationResult {
        self.episodes
            .organize_with_correction(request, options, token)
            .await
    }

    pub async fn organize_movie_with_correction(
        &self,
        request: &MovieFileOrganizationRequest,
        options: &MovieFileOrganizationOptions,
        token: &CancellationToken,
    ) -> OrganizationResult {
        self.movies
            .organize_with_correction(request, options, token)
            .await
    }

    /// Re-run a logged result from its original path
    ///
    /// Movies go through the movie organizer; everything else is retried as
    /// an episode.
    pub async fn perform_organization(
        &self,
        result_id: &str,
        options: &AutoOrganizeOptions,
        token: &CancellationToken,
    ) -> Result<OrganizationResult> {
        let result = self.require_result(result_id)?;

        if !self.ctx.fs.file_exists(&result.original_path).await {
            return Err(OrganizeError::organization(format!(
                "File {} no longer exists",
                result.original_path
            )));
        }

        info!(result_id = %result_id, path = %result.original_path, "Re-running organization");

        let organized = match result.organizer_type {
            FileOrganizerType::Movie => {
                self.movies
                    .organize_movie_file(&result.original_path, &options.movie, token)
                    .await
            }
            FileOrganizerType::Episode | FileOrganizerType::Unknown => {
                self.episodes
                    .organize_episode_file(&result.original_path, &options.tv, token)
                    .await
            }
        };

        Ok(organized)
    }

    /// Delete the source file of a logged result and drop the log entry
    pub async fn delete_original_file(&self, result_id: &str) -> Result<()> {
        let result = self.require_result(result_id)?;
        let path = &result.original_path;

        info!(result_id = %result_id, path = %path, "Deleting original file");

        self.ctx.monitor.report_file_system_change_beginning(path);
        let deleted = self.ctx.fs.delete_file(path).await;
        self.ctx.monitor.report_file_system_change_complete(path, false);

        match deleted {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path, "Original file was already gone");
            }
            Err(e) => return Err(OrganizeError::from_io(e)),
        }

        self.ctx.store.delete(result_id)
    }

    pub fn get_result(&self, result_id: &str) -> Result<Option<OrganizationResult>> {
        self.ctx.store.get_result(result_id)
    }

    /// Logged results, newest first
    pub fn get_results(&self, query: &ResultQuery) -> Result<QueryResult<OrganizationResult>> {
        self.ctx.store.get_results(query)
    }

    /// Remove every logged result
    pub fn clear_log(&self) -> Result<()> {
        self.ctx.store.delete_all()?;
        self.ctx.registry.notify(OrganizationEvent::LogCleared);
        info!("Cleared organization log");
        Ok(())
    }

    /// Remove the successfully organized results
    pub fn clear_completed(&self) -> Result<()> {
        self.ctx.store.delete_completed()?;
        self.ctx.registry.notify(OrganizationEvent::LogCleared);
        info!("Cleared completed organization results");
        Ok(())
    }

    pub fn get_smart_matches(&self) -> Result<Vec<SmartMatchResult>> {
        self.ctx.store.get_smart_matches()
    }

    pub fn delete_smart_match(&self, id: Uuid) -> Result<()> {
        self.ctx.store.delete_smart_match(id)
    }

    /// Forget one alias; the record goes once it has none left
    pub fn delete_smart_match_string(&self, id: Uuid, match_string: &str) -> Result<()> {
        self.ctx.store.delete_smart_match_string(id, match_string)
    }

    pub fn delete_all_smart_matches(&self) -> Result<()> {
        self.ctx.store.delete_all_smart_matches()
    }

    fn require_result(&self, result_id: &str) -> Result<OrganizationResult> {
        self.ctx.store.get_result(result_id)?.ok_or_else(|| {
            OrganizeError::organization(format!("No organization result found with id {result_id}"))
        })
    }
}
