//! Watch folder scan
//!
//! One pass over the configured watch locations: every eligible video file
//! is handed to the matching organizer, then leftover files and (optionally)
//! empty sub-folders are removed. The watch location itself is never removed.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{AutoOrganizeOptions, MovieFileOrganizationOptions, TvFileOrganizationOptions};
use crate::db::{FileSortingStatus, file_name_of};

use super::file_utils::{extension_of, is_ignored_file_name};
use super::organization_service::FileOrganizationService;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Counts for one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Skipped, new resolution or waiting
    pub skipped: usize,
    pub cancelled: bool,
}

impl ScanSummary {
    fn record(&mut self, status: FileSortingStatus) {
        self.processed += 1;
        match status {
            FileSortingStatus::Success => self.succeeded += 1,
            FileSortingStatus::Failure => self.failed += 1,
            _ => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Episode,
    Movie,
}

/// Folder rules shared by the episode and movie options
struct WatchRules<'a> {
    watch_locations: &'a [String],
    min_file_size_mb: u64,
    ignored_file_name_contains: &'a [String],
    left_over_file_extensions_to_delete: &'a [String],
    delete_empty_folders: bool,
}

impl<'a> From<&'a TvFileOrganizationOptions> for WatchRules<'a> {
    fn from(options: &'a TvFileOrganizationOptions) -> Self {
        Self {
            watch_locations: &options.watch_locations,
            min_file_size_mb: options.min_file_size_mb,
            ignored_file_name_contains: &options.ignored_file_name_contains,
            left_over_file_extensions_to_delete: &options.left_over_file_extensions_to_delete,
            delete_empty_folders: options.delete_empty_folders,
        }
    }
}

impl<'a> From<&'a MovieFileOrganizationOptions> for WatchRules<'a> {
    fn from(options: &'a MovieFileOrganizationOptions) -> Self {
        Self {
            watch_locations: &options.watch_locations,
            min_file_size_mb: options.min_file_size_mb,
            ignored_file_name_contains: &options.ignored_file_name_contains,
            left_over_file_extensions_to_delete: &options.left_over_file_extensions_to_delete,
            delete_empty_folders: options.delete_empty_folders,
        }
    }
}

pub struct FolderOrganizer {
    service: Arc<FileOrganizationService>,
}

impl FolderOrganizer {
    pub fn new(service: Arc<FileOrganizationService>) -> Self {
        Self { service }
    }

    /// Scan the enabled watch locations once
    ///
    /// Cancellation is checked between files; a file that has started
    /// organizing is finished first.
    pub async fn organize(
        &self,
        options: &AutoOrganizeOptions,
        token: &CancellationToken,
    ) -> ScanSummary {
        let mut summary = ScanSummary::default();

        if options.tv.is_enabled {
            self.scan(MediaKind::Episode, WatchRules::from(&options.tv), options, token, &mut summary)
                .await;
        }

        if options.movie.is_enabled && !summary.cancelled {
            self.scan(MediaKind::Movie, WatchRules::from(&options.movie), options, token, &mut summary)
                .await;
        }

        info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            "Watch folder scan complete"
        );

        summary
    }

    async fn scan(
        &self,
        kind: MediaKind,
        rules: WatchRules<'_>,
        options: &AutoOrganizeOptions,
        token: &CancellationToken,
        summary: &mut ScanSummary,
    ) {
        for location in rules.watch_locations {
            if !Path::new(location).is_dir() {
                warn!(path = %location, "Watch location does not exist");
                continue;
            }

            let files = self.eligible_files(location, &rules);
            info!(path = %location, count = files.len(), kind = ?kind, "Scanning watch location");

            for path in files {
                if token.is_cancelled() {
                    info!("Watch folder scan cancelled");
                    summary.cancelled = true;
                    return;
                }

                let result = match kind {
                    MediaKind::Episode => {
                        self.service
                            .organize_episode_file(&path, &options.tv, token)
                            .await
                    }
                    MediaKind::Movie => {
                        self.service
                            .organize_movie_file(&path, &options.movie, token)
                            .await
                    }
                };
                summary.record(result.status);
            }

            self.delete_left_over_files(location, rules.left_over_file_extensions_to_delete)
                .await;

            if rules.delete_empty_folders {
                delete_empty_folders(Path::new(location)).await;
            }
        }
    }

    /// Video files big enough, not ignored and not already organized
    fn eligible_files(&self, location: &str, rules: &WatchRules<'_>) -> Vec<String> {
        let ctx = self.service.context();
        let min_size = rules.min_file_size_mb * BYTES_PER_MB;

        let mut files = Vec::new();
        for entry in WalkDir::new(location)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path().to_string_lossy().into_owned();
            if !ctx.library.is_video_file(&path) {
                continue;
            }

            if is_ignored_file_name(file_name_of(&path), rules.ignored_file_name_contains) {
                debug!(path = %path, "Ignoring file by name");
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if size < min_size {
                debug!(path = %path, size, "Skipping file below minimum size");
                continue;
            }

            let organized = ctx
                .store
                .get_result_by_source_path(&path)
                .ok()
                .flatten()
                .is_some_and(|r| r.status == FileSortingStatus::Success);
            if organized {
                debug!(path = %path, "Skipping already organized file");
                continue;
            }

            files.push(path);
        }

        files.sort();
        files
    }

    async fn delete_left_over_files(&self, location: &str, extensions: &[String]) {
        let extensions: Vec<String> = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if extensions.is_empty() {
            return;
        }

        let fs = &self.service.context().fs;
        for entry in WalkDir::new(location)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path().to_string_lossy().into_owned();
            if !extensions.contains(&extension_of(&path).to_lowercase()) {
                continue;
            }

            match fs.delete_file(&path).await {
                Ok(()) => debug!(path = %path, "Deleted leftover file"),
                Err(e) => warn!(path = %path, error = %e, "Could not delete leftover file"),
            }
        }
    }
}

/// Remove empty folders below `root`, deepest first; `root` itself stays
async fn delete_empty_folders(root: &Path) {
    let mut folders: Vec<_> = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect();

    folders.sort_by_key(|folder| std::cmp::Reverse(folder.components().count()));

    for folder in folders {
        // remove_dir refuses non-empty folders
        match tokio::fs::remove_dir(&folder).await {
            Ok(()) => debug!(path = %folder.display(), "Removed empty folder"),
            Err(e) => debug!(path = %folder.display(), error = %e, "Folder kept"),
        }
    }
}
