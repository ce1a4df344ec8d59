//! Episode duplicate, overwrite and naming policy

mod common;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use auto_organize::config::TvFileOrganizationOptions;
use auto_organize::db::{FileSortingStatus, OrganizationResult};
use auto_organize::services::EpisodeFileOrganizationRequest;
use auto_organize::services::library::{Episode, LocationType, RemoteSearchResult};

use common::{Harness, MemoryFileSystem, MemoryLibrary, StaticProvider, show};

const MB: u64 = 1024 * 1024;
const SOURCE: &str = "/downloads/Show.S01E02.mkv";
const TARGET: &str = "/tv/Show/Season 1/Show - 1x02 - Episode 2.mkv";
const OLD_VERSION: &str = "/tv/Show/Season 1/Show.S01E02.avi";

fn harness_with(files: &[(&str, u64)]) -> Harness {
    Harness::new(
        MemoryLibrary::with_series(show()),
        StaticProvider::default(),
        MemoryFileSystem::with_files(files),
    )
}

/// Library already holds episode 1x02 as an .avi next to its subtitles
fn harness_with_old_version() -> Harness {
    let library = MemoryLibrary::with_series(show());
    library.episodes.lock().push(Episode {
        internal_id: 5,
        series_id: 1,
        name: "Episode 2".to_string(),
        path: Some(OLD_VERSION.to_string()),
        parent_index_number: Some(1),
        index_number: Some(2),
        location_type: LocationType::FileSystem,
        ..Default::default()
    });

    Harness::new(
        library,
        StaticProvider::default(),
        MemoryFileSystem::with_files(&[
            (SOURCE, 300 * MB),
            (OLD_VERSION, 200 * MB),
            ("/tv/Show/Season 1/Show.S01E02.en.srt", 1),
        ]),
    )
}

async fn organize(
    harness: &Harness,
    source: &str,
    options: &TvFileOrganizationOptions,
) -> OrganizationResult {
    let token = CancellationToken::new();
    harness
        .service
        .organize_episode_file(source, options, &token)
        .await
}

#[tokio::test]
async fn test_existing_target_is_skipped_without_overwrite() {
    let harness = harness_with(&[(SOURCE, 300 * MB), (TARGET, 100 * MB)]);

    let result = organize(&harness, SOURCE, &TvFileOrganizationOptions::default()).await;

    assert_eq!(result.status, FileSortingStatus::SkippedExisting);
    assert_eq!(
        result.status_message,
        format!("File '{SOURCE}' already exists as '{TARGET}'.")
    );
    assert_eq!(result.target_path, TARGET);
    assert!(harness.fs.exists(SOURCE));
    assert_eq!(harness.fs.size_of(TARGET), Some(100 * MB));
}

#[tokio::test]
async fn test_overwrite_replaces_existing_target() {
    let harness = harness_with(&[(SOURCE, 300 * MB), (TARGET, 100 * MB)]);
    let options = TvFileOrganizationOptions {
        overwrite_existing_episodes: true,
        ..Default::default()
    };

    let result = organize(&harness, SOURCE, &options).await;

    assert_eq!(result.status, FileSortingStatus::Success);
    assert_eq!(harness.fs.size_of(TARGET), Some(300 * MB));
    assert!(!harness.fs.exists(SOURCE));
}

#[tokio::test]
async fn test_copy_original_keeps_source() {
    let harness = harness_with(&[(SOURCE, 300 * MB)]);
    let options = TvFileOrganizationOptions {
        copy_original_file: true,
        ..Default::default()
    };

    let result = organize(&harness, SOURCE, &options).await;

    assert_eq!(result.status, FileSortingStatus::Success);
    assert!(harness.fs.exists(SOURCE));
    assert_eq!(harness.fs.size_of(TARGET), Some(300 * MB));
}

#[tokio::test]
async fn test_copy_original_already_copied_is_skipped() {
    let harness = harness_with(&[(SOURCE, 300 * MB), (TARGET, 300 * MB)]);
    let options = TvFileOrganizationOptions {
        copy_original_file: true,
        single_episode_version: true,
        ..Default::default()
    };

    let result = organize(&harness, SOURCE, &options).await;

    assert_eq!(result.status, FileSortingStatus::SkippedExisting);
    assert_eq!(
        result.status_message,
        format!("File '{SOURCE}' already copied to new path '{TARGET}.'")
    );
    assert_eq!(result.duplicate_paths, vec![TARGET.to_string()]);
    assert!(harness.fs.exists(SOURCE));
}

#[tokio::test]
async fn test_other_version_in_library_is_reported_as_duplicate() {
    let harness = harness_with_old_version();
    let options = TvFileOrganizationOptions {
        single_episode_version: true,
        ..Default::default()
    };

    let result = organize(&harness, SOURCE, &options).await;

    assert_eq!(result.status, FileSortingStatus::SkippedExisting);
    assert_eq!(
        result.status_message,
        format!("File '{SOURCE}' already exists as: '{OLD_VERSION}'.")
    );
    assert_eq!(result.duplicate_paths, vec![OLD_VERSION.to_string()]);
    assert!(harness.fs.exists(SOURCE));
    assert!(harness.fs.exists(OLD_VERSION));
}

#[tokio::test]
async fn test_single_version_removes_old_file_and_renames_sidecars() {
    let harness = harness_with_old_version();
    let options = TvFileOrganizationOptions {
        single_episode_version: true,
        overwrite_existing_episodes: true,
        ..Default::default()
    };

    let result = organize(&harness, SOURCE, &options).await;

    assert_eq!(result.status, FileSortingStatus::Success);
    assert!(harness.fs.exists(TARGET));
    assert!(!harness.fs.exists(SOURCE));
    assert!(!harness.fs.exists(OLD_VERSION));
    assert!(!harness.fs.exists("/tv/Show/Season 1/Show.S01E02.en.srt"));
    assert!(harness.fs.exists("/tv/Show/Season 1/Show - 1x02 - Episode 2.en.srt"));
    assert!(harness.monitor.began.lock().contains(&OLD_VERSION.to_string()));
}

#[tokio::test]
async fn test_tba_title_blocks_move_unless_allowed() {
    let provider = || StaticProvider {
        episode_title: Some("TBA".to_string()),
        ..Default::default()
    };
    let token = CancellationToken::new();

    let blocked = Harness::new(
        MemoryLibrary::with_series(show()),
        provider(),
        MemoryFileSystem::with_files(&[(SOURCE, 300 * MB)]),
    );
    let result = blocked
        .service
        .organize_episode_file(SOURCE, &TvFileOrganizationOptions::default(), &token)
        .await;
    assert_eq!(result.status, FileSortingStatus::Failure);
    assert_eq!(
        result.status_message,
        "Returned metadata title is 'TBA'. Current settings prevent this file from being moved."
    );
    assert!(blocked.fs.exists(SOURCE));

    let allowed = Harness::new(
        MemoryLibrary::with_series(show()),
        provider(),
        MemoryFileSystem::with_files(&[(SOURCE, 300 * MB)]),
    );
    let options = TvFileOrganizationOptions {
        allow_tba: true,
        ..Default::default()
    };
    let result = allowed
        .service
        .organize_episode_file(SOURCE, &options, &token)
        .await;
    assert_eq!(result.status, FileSortingStatus::Success);
    assert_eq!(result.target_path, "/tv/Show/Season 1/Show - 1x02 - TBA.mkv");
}

#[tokio::test]
async fn test_dated_episode_is_resolved_through_provider() {
    let source = "/downloads/Show.2021-03-04.mkv";
    let provider = StaticProvider {
        dated: vec![RemoteSearchResult {
            name: "Pilot".to_string(),
            parent_index_number: Some(3),
            index_number: Some(7),
            ..Default::default()
        }],
        ..Default::default()
    };
    let harness = Harness::new(
        MemoryLibrary::with_series(show()),
        provider,
        MemoryFileSystem::with_files(&[(source, 300 * MB)]),
    );

    let result = organize(&harness, source, &TvFileOrganizationOptions::default()).await;

    assert_eq!(result.status, FileSortingStatus::Success);
    assert_eq!(result.extracted_name.as_deref(), Some("Show"));
    assert_eq!(result.target_path, "/tv/Show/Season 3/Show - 3x07 - Pilot.mkv");
    assert!(harness.fs.exists("/tv/Show/Season 3/Show - 3x07 - Pilot.mkv"));
}

#[tokio::test]
async fn test_unknown_series_is_auto_detected() {
    let source = "/downloads/Found Show S01E02.mkv";
    let provider = StaticProvider {
        series: vec![RemoteSearchResult {
            name: "Found Show".to_string(),
            production_year: Some(2019),
            ..Default::default()
        }],
        ..Default::default()
    };
    let harness = Harness::new(
        MemoryLibrary::with_series(show()),
        provider,
        MemoryFileSystem::with_files(&[(source, 300 * MB)]),
    );
    let options = TvFileOrganizationOptions {
        auto_detect_series: true,
        default_series_library_path: Some("/tv".to_string()),
        ..Default::default()
    };

    let result = organize(&harness, source, &options).await;

    let target = "/tv/Found Show (2019)/Season 1/Found Show - 1x02 - Episode 2.mkv";
    assert_eq!(result.status, FileSortingStatus::Success);
    assert_eq!(result.target_path, target);
    assert!(harness.fs.exists(target));
}

#[tokio::test]
async fn test_episode_range_uses_multi_episode_pattern() {
    let source = "/downloads/Show.S01E02-E03.mkv";
    let harness = harness_with(&[(source, 300 * MB)]);

    let result = organize(&harness, source, &TvFileOrganizationOptions::default()).await;

    assert_eq!(result.status, FileSortingStatus::Success);
    assert_eq!(result.extracted_ending_episode_number, Some(3));
    assert_eq!(result.target_path, "/tv/Show/Season 1/Show - 1x02-x03 - Episode 2.mkv");
}

#[tokio::test]
async fn test_correction_can_request_overwrite() {
    let source = "/downloads/Shw.S01E02.mkv";
    let harness = harness_with(&[(source, 300 * MB), (TARGET, 100 * MB)]);
    let options = TvFileOrganizationOptions::default();
    let token = CancellationToken::new();

    let failed = organize(&harness, source, &options).await;
    assert_eq!(failed.status, FileSortingStatus::Failure);

    let mut request = EpisodeFileOrganizationRequest {
        result_id: failed.id.clone().unwrap(),
        series_id: Some(1),
        season_number: 1,
        episode_number: 2,
        ..Default::default()
    };

    let skipped = harness
        .service
        .organize_episode_with_correction(&request, &options, &token)
        .await;
    assert_eq!(skipped.status, FileSortingStatus::SkippedExisting);
    assert_eq!(harness.fs.size_of(TARGET), Some(100 * MB));

    request.request_to_overwrite_existing_file = Some(true);
    let replaced = harness
        .service
        .organize_episode_with_correction(&request, &options, &token)
        .await;
    assert_eq!(replaced.status, FileSortingStatus::Success);
    assert_eq!(harness.fs.size_of(TARGET), Some(300 * MB));
    assert!(!harness.fs.exists(source));
}
