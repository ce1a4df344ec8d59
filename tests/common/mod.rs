//! In-memory capabilities for driving the organizers in tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use auto_organize::Result;
use auto_organize::db::{MemoryResultStore, ResultStore};
use auto_organize::services::FileOrganizationService;
use auto_organize::services::file_utils::{directory_of, extension_of};
use auto_organize::services::filesystem::{FileInfo, FileSystem};
use auto_organize::services::library::{
    Episode, ItemQuery, LibraryFolder, LibraryManager, LibraryMonitor, MetadataProvider, Movie,
    RemoteSearchQuery, RemoteSearchResult, Season, Series, VirtualFolder,
};

#[derive(Default)]
pub struct MemoryLibrary {
    pub series: Mutex<Vec<Series>>,
    pub movies: Mutex<Vec<Movie>>,
    pub episodes: Mutex<Vec<Episode>>,
    pub virtual_folders: Mutex<Vec<VirtualFolder>>,
}

impl MemoryLibrary {
    pub fn with_series(series: Series) -> Self {
        let library = Self::default();
        library.series.lock().push(series);
        library
    }

    pub fn add_movie(&self, movie: Movie) {
        self.movies.lock().push(movie);
    }
}

fn matches_query(name: &str, year: Option<i32>, query: &ItemQuery) -> bool {
    let name = name.to_lowercase();
    let by_term = query
        .search_term
        .as_deref()
        .is_none_or(|term| name.contains(&term.to_lowercase()));
    let by_name = query
        .name
        .as_deref()
        .is_none_or(|exact| name == exact.to_lowercase());
    let by_year = query.years.is_empty() || year.is_some_and(|y| query.years.contains(&y));
    by_term && by_name && by_year
}

#[async_trait]
impl LibraryManager for MemoryLibrary {
    async fn find_series(&self, query: &ItemQuery) -> Result<Vec<Series>> {
        Ok(self
            .series
            .lock()
            .iter()
            .filter(|s| matches_query(&s.name, s.production_year, query))
            .cloned()
            .collect())
    }

    async fn find_movies(&self, query: &ItemQuery) -> Result<Vec<Movie>> {
        Ok(self
            .movies
            .lock()
            .iter()
            .filter(|m| matches_query(&m.name, m.production_year, query))
            .cloned()
            .collect())
    }

    fn get_series_by_id(&self, id: i64) -> Option<Series> {
        self.series.lock().iter().find(|s| s.internal_id == id).cloned()
    }

    fn get_movie_by_id(&self, id: i64) -> Option<Movie> {
        self.movies.lock().iter().find(|m| m.internal_id == id).cloned()
    }

    fn get_episodes(&self, series: &Series) -> Vec<Episode> {
        self.episodes
            .lock()
            .iter()
            .filter(|e| e.series_id == series.internal_id)
            .cloned()
            .collect()
    }

    fn get_seasons(&self, _series: &Series) -> Vec<Season> {
        Vec::new()
    }

    fn has_direct_video_children(&self, _series: &Series) -> bool {
        false
    }

    fn find_folder_by_path(&self, _path: &str) -> Option<LibraryFolder> {
        None
    }

    fn get_virtual_folders(&self) -> Vec<VirtualFolder> {
        self.virtual_folders.lock().clone()
    }
}

/// Episodes are titled "Episode N" unless `episode_title` is set; series,
/// movies and by-date episodes come from fixed lists
#[derive(Default)]
pub struct StaticProvider {
    pub series: Vec<RemoteSearchResult>,
    pub movies: Vec<RemoteSearchResult>,
    pub dated: Vec<RemoteSearchResult>,
    pub episode_title: Option<String>,
}

#[async_trait]
impl MetadataProvider for StaticProvider {
    async fn search(&self, query: &RemoteSearchQuery) -> Result<Vec<RemoteSearchResult>> {
        Ok(match query {
            RemoteSearchQuery::Series(_) => self.series.clone(),
            RemoteSearchQuery::Movie(_) => self.movies.clone(),
            RemoteSearchQuery::Episode(lookup) => match (lookup.index_number, lookup.premiere_date) {
                (Some(number), _) => vec![RemoteSearchResult {
                    name: self
                        .episode_title
                        .clone()
                        .unwrap_or_else(|| format!("Episode {number}")),
                    parent_index_number: lookup.parent_index_number,
                    index_number: Some(number),
                    index_number_end: lookup.index_number_end,
                    ..Default::default()
                }],
                (None, Some(_)) => self.dated.clone(),
                (None, None) => Vec::new(),
            },
        })
    }
}

#[derive(Default)]
pub struct RecordingMonitor {
    pub locked: Mutex<HashSet<String>>,
    pub began: Mutex<Vec<String>>,
    pub completed: Mutex<Vec<String>>,
}

impl LibraryMonitor for RecordingMonitor {
    fn is_path_locked(&self, path: &str) -> bool {
        self.locked.lock().contains(path)
    }

    fn report_file_system_change_beginning(&self, path: &str) {
        self.began.lock().push(path.to_string());
    }

    fn report_file_system_change_complete(&self, path: &str, _refresh_path: bool) {
        self.completed.lock().push(path.to_string());
    }
}

/// Flat path -> size map; paths listed in `busy` fail to move as in-use
#[derive(Default)]
pub struct MemoryFileSystem {
    pub files: Mutex<HashMap<String, u64>>,
    pub busy: Mutex<HashSet<String>>,
}

impl MemoryFileSystem {
    pub fn with_files(files: &[(&str, u64)]) -> Self {
        let fs = Self::default();
        for (path, size) in files {
            fs.files.lock().insert(path.to_string(), *size);
        }
        fs
    }

    pub fn exists(&self, path: &str) -> bool {
        self.files.lock().contains_key(path)
    }

    pub fn size_of(&self, path: &str) -> Option<u64> {
        self.files.lock().get(path).copied()
    }
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{path} not found"))
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn file_exists(&self, path: &str) -> bool {
        self.exists(path)
    }

    async fn get_file_info(&self, path: &str) -> io::Result<FileInfo> {
        let length = *self.files.lock().get(path).ok_or_else(|| not_found(path))?;
        Ok(FileInfo {
            length,
            extension: extension_of(path),
        })
    }

    async fn copy_file(&self, source: &str, target: &str, overwrite: bool) -> io::Result<()> {
        let mut files = self.files.lock();
        let size = *files.get(source).ok_or_else(|| not_found(source))?;
        if !overwrite && files.contains_key(target) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, target.to_string()));
        }
        files.insert(target.to_string(), size);
        Ok(())
    }

    async fn move_file(&self, source: &str, target: &str) -> io::Result<()> {
        if self.busy.lock().contains(source) {
            return Err(io::Error::other(
                "The process cannot access the file because it is being used by another process.",
            ));
        }
        let mut files = self.files.lock();
        let size = files.remove(source).ok_or_else(|| not_found(source))?;
        files.insert(target.to_string(), size);
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> io::Result<()> {
        self.files
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    async fn create_directory(&self, _path: &str) -> io::Result<()> {
        Ok(())
    }

    async fn get_file_paths(&self, dir: &str) -> io::Result<Vec<String>> {
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|p| directory_of(p) == dir)
            .cloned()
            .collect())
    }
}

pub struct Harness {
    pub service: Arc<FileOrganizationService>,
    pub store: Arc<MemoryResultStore>,
    pub library: Arc<MemoryLibrary>,
    pub monitor: Arc<RecordingMonitor>,
    pub fs: Arc<MemoryFileSystem>,
}

impl Harness {
    pub fn new(library: MemoryLibrary, provider: StaticProvider, fs: MemoryFileSystem) -> Self {
        let store = Arc::new(MemoryResultStore::new());
        let library = Arc::new(library);
        let monitor = Arc::new(RecordingMonitor::default());
        let fs = Arc::new(fs);

        let service = FileOrganizationService::new(
            store.clone() as Arc<dyn ResultStore>,
            library.clone(),
            monitor.clone(),
            Arc::new(provider),
            fs.clone(),
        );

        Self {
            service: Arc::new(service),
            store,
            library,
            monitor,
            fs,
        }
    }
}

pub fn show() -> Series {
    Series {
        internal_id: 1,
        name: "Show".to_string(),
        path: "/tv/Show".to_string(),
        ..Default::default()
    }
}
