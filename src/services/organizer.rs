//! Shared organizer plumbing
//!
//! [OrganizerContext] bundles the capabilities both organizers work through.
//! The physical file sorting step, previous-result suppression and
//! cancellable remote calls live here so the episode and movie flows only
//! differ where their policies differ.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::db::{FileOrganizerType, FileSortingStatus, OrganizationResult, ResultStore};
use crate::error::{OrganizeError, Result, is_in_use};

use super::file_utils::{directory_of, same_path};
use super::filesystem::FileSystem;
use super::library::{LibraryManager, LibraryMonitor, MetadataProvider, RemoteSearchQuery, RemoteSearchResult};
use super::progress::InProgressRegistry;

pub(crate) const PATH_LOCKED_MESSAGE: &str =
    "Path is locked by other processes. Please try again later.";

/// Capabilities an organize attempt runs against
#[derive(Clone)]
pub struct OrganizerContext {
    pub store: Arc<dyn ResultStore>,
    pub registry: Arc<InProgressRegistry>,
    pub library: Arc<dyn LibraryManager>,
    pub monitor: Arc<dyn LibraryMonitor>,
    pub provider: Arc<dyn MetadataProvider>,
    pub fs: Arc<dyn FileSystem>,
}

/// How the sorting step treats a source file held open elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InUsePolicy {
    /// Record a Failure like any other error
    Fail,
    /// Record Waiting so the next scan retries
    Wait,
}

impl OrganizerContext {
    /// Size of the source file, 0 if it cannot be read
    pub(crate) async fn source_file_size(&self, path: &str) -> u64 {
        match self.fs.get_file_info(path).await {
            Ok(info) => info.length,
            Err(e) => {
                warn!(path = %path, error = %e, "Could not read source file info");
                0
            }
        }
    }

    /// Previous log entry to return instead of saving `result` again
    ///
    /// A new Unknown-type result never replaces an existing entry, and a
    /// repeated non-success outcome with the same message is not re-logged.
    pub(crate) fn unchanged_previous_result(
        &self,
        result: &OrganizationResult,
    ) -> Result<Option<OrganizationResult>> {
        let Some(previous) = self.store.get_result_by_source_path(&result.original_path)? else {
            return Ok(None);
        };

        let unknown = result.organizer_type == FileOrganizerType::Unknown;
        let repeated = previous.status == result.status
            && previous.status_message == result.status_message
            && result.status != FileSortingStatus::Success;

        Ok((unknown || repeated).then_some(previous))
    }

    /// Persist `result`, logging rather than surfacing store failures
    pub(crate) fn save(&self, result: &mut OrganizationResult) {
        if let Err(e) = self.store.save_result(result) {
            error!(path = %result.original_path, error = %e, "Failed to save organization result");
        }
    }

    /// Remote metadata search that gives up as soon as `token` is cancelled
    pub(crate) async fn search_remote(
        &self,
        query: RemoteSearchQuery,
        token: &CancellationToken,
    ) -> Result<Vec<RemoteSearchResult>> {
        cancellable(token, self.provider.search(&query)).await
    }

    /// Copy or move the source onto `result.target_path`
    ///
    /// The target is copied over (and the source removed afterwards) when it
    /// already exists; with `copy_original_file` the source always stays.
    /// Returns whether the file landed. Sorting failures are recorded on the
    /// result; only a failure to create the target folder is returned as an
    /// error.
    pub(crate) async fn perform_file_sorting(
        &self,
        result: &mut OrganizationResult,
        copy_original_file: bool,
        in_use: InUsePolicy,
    ) -> Result<bool> {
        let source = result.original_path.clone();
        let target = result.target_path.clone();

        if same_path(&source, &target) {
            return Ok(false);
        }

        self.monitor.report_file_system_change_beginning(&target);

        let prepared = self
            .fs
            .create_directory(&directory_of(&target))
            .await
            .map_err(OrganizeError::from_io);
        if let Err(e) = prepared {
            self.monitor.report_file_system_change_complete(&target, true);
            return Err(e);
        }

        let target_exists = self.fs.file_exists(&target).await;

        let outcome = if target_exists || copy_original_file {
            self.fs.copy_file(&source, &target, true).await
        } else {
            self.fs.move_file(&source, &target).await
        };

        let landed = match outcome {
            Ok(()) => {
                info!(source = %source, target = %target, copied = target_exists || copy_original_file, "Sorted file");
                result.set_status(FileSortingStatus::Success, "");
                true
            }
            Err(e) if in_use == InUsePolicy::Wait && is_in_use(&e) => {
                let message = format!("Waiting to move file from {source} to {target}: {e}");
                warn!(source = %source, target = %target, error = %e, "Source file is in use");
                result.set_status(FileSortingStatus::Waiting, message);
                false
            }
            Err(e) => {
                let message = format!("Failed to move file from {source} to {target}: {e}");
                error!(source = %source, target = %target, error = %e, "Failed to sort file");
                result.set_status(FileSortingStatus::Failure, message);
                false
            }
        };

        self.monitor.report_file_system_change_complete(&target, true);

        if landed
            && target_exists
            && !copy_original_file
            && let Err(e) = self.fs.delete_file(&source).await
        {
            error!(path = %source, error = %e, "Error deleting source file");
        }

        Ok(landed)
    }
}

/// Unsaved failure for a correction whose result could not be loaded
pub(crate) fn missing_result(result_id: &str, message: String) -> OrganizationResult {
    warn!(result_id = %result_id, "{message}");
    let mut result = OrganizationResult {
        id: Some(result_id.to_string()),
        ..Default::default()
    };
    result.set_status(FileSortingStatus::Failure, message);
    result
}

/// Run `fut` unless `token` is cancelled first
pub(crate) async fn cancellable<T>(
    token: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(OrganizeError::Cancelled),
        value = fut => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let value = cancellable(&token, async { Ok(1) }).await;
        assert!(matches!(value, Err(OrganizeError::Cancelled)));
    }

    #[tokio::test]
    async fn test_live_token_passes_value_through() {
        let token = CancellationToken::new();
        let value = cancellable(&token, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
