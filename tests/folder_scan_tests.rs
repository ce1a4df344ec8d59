//! Watch folder scans against a real directory tree

mod common;

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use auto_organize::config::{AutoOrganizeOptions, TvFileOrganizationOptions};
use auto_organize::db::{FileSortingStatus, MemoryResultStore, ResultStore};
use auto_organize::services::library::Series;
use auto_organize::services::{
    FileOrganizationService, FolderOrganizer, LocalFileSystem, NullLibraryMonitor, ScanSummary,
};

use common::{MemoryLibrary, StaticProvider};

struct Scan {
    _dir: tempfile::TempDir,
    downloads: std::path::PathBuf,
    tv: std::path::PathBuf,
    store: Arc<MemoryResultStore>,
    organizer: FolderOrganizer,
}

fn setup() -> Scan {
    let dir = tempfile::tempdir().unwrap();
    let downloads = dir.path().join("downloads");
    let tv = dir.path().join("tv");
    fs::create_dir_all(downloads.join("Show.S01E02")).unwrap();
    fs::create_dir_all(downloads.join("empty/nested")).unwrap();
    fs::create_dir_all(&tv).unwrap();

    fs::write(downloads.join("Show.S01E02/Show.S01E02.mkv"), b"video").unwrap();
    fs::write(downloads.join("Show.S01E02/Show.S01E02.nfo"), b"info").unwrap();
    fs::write(downloads.join("Show.S01E03.sample.mkv"), b"sample").unwrap();

    let library = MemoryLibrary::with_series(Series {
        internal_id: 1,
        name: "Show".to_string(),
        path: tv.join("Show").to_string_lossy().into_owned(),
        ..Default::default()
    });

    let store = Arc::new(MemoryResultStore::new());
    let service = FileOrganizationService::new(
        store.clone(),
        Arc::new(library),
        Arc::new(NullLibraryMonitor),
        Arc::new(StaticProvider::default()),
        Arc::new(LocalFileSystem::new()),
    );

    Scan {
        _dir: dir,
        downloads,
        tv,
        store,
        organizer: FolderOrganizer::new(Arc::new(service)),
    }
}

fn options(scan: &Scan) -> AutoOrganizeOptions {
    AutoOrganizeOptions {
        tv: TvFileOrganizationOptions {
            is_enabled: true,
            min_file_size_mb: 0,
            watch_locations: vec![scan.downloads.to_string_lossy().into_owned()],
            ignored_file_name_contains: vec!["sample".to_string()],
            left_over_file_extensions_to_delete: vec![".nfo".to_string()],
            delete_empty_folders: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_scan_organizes_and_cleans_watch_folder() {
    let scan = setup();
    let options = options(&scan);
    let token = CancellationToken::new();

    let summary = scan.organizer.organize(&options, &token).await;

    assert_eq!(
        summary,
        ScanSummary {
            processed: 1,
            succeeded: 1,
            failed: 0,
            skipped: 0,
            cancelled: false,
        }
    );

    let target = scan.tv.join("Show/Season 1/Show - 1x02 - Episode 2.mkv");
    assert!(target.is_file());
    assert!(!scan.downloads.join("Show.S01E02").exists());
    assert!(!scan.downloads.join("empty").exists());
    assert!(scan.downloads.join("Show.S01E03.sample.mkv").is_file());
    assert!(scan.downloads.is_dir());
}

#[tokio::test]
async fn test_scan_skips_small_and_organized_files() {
    let scan = setup();
    let mut options = options(&scan);
    options.tv.min_file_size_mb = 1;
    let token = CancellationToken::new();

    let summary = scan.organizer.organize(&options, &token).await;
    assert_eq!(summary.processed, 0);

    options.tv.min_file_size_mb = 0;
    options.tv.delete_empty_folders = false;
    let first = scan.organizer.organize(&options, &token).await;
    assert_eq!(first.succeeded, 1);

    let source = scan
        .downloads
        .join("Show.S01E02/Show.S01E02.mkv")
        .to_string_lossy()
        .into_owned();
    let logged = scan.store.get_result_by_source_path(&source).unwrap().unwrap();
    assert_eq!(logged.status, FileSortingStatus::Success);

    // Same name dropped in again is left alone once logged as organized
    fs::write(&source, b"video").unwrap();
    let again = scan.organizer.organize(&options, &token).await;
    assert_eq!(again.processed, 0);
}

#[tokio::test]
async fn test_cancelled_scan_stops_before_first_file() {
    let scan = setup();
    let options = options(&scan);
    let token = CancellationToken::new();
    token.cancel();

    let summary = scan.organizer.organize(&options, &token).await;

    assert!(summary.cancelled);
    assert_eq!(summary.processed, 0);
    assert!(scan.downloads.join("Show.S01E02/Show.S01E02.mkv").is_file());
}
