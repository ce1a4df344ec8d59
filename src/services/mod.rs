//! Organizer services

pub mod episode_organizer;
pub mod file_utils;
pub mod filename_parser;
pub mod filesystem;
pub mod folder_scanner;
pub mod library;
pub mod logging;
pub mod movie_organizer;
pub mod naming;
pub mod naming_pattern;
pub mod organization_service;
pub mod organizer;
pub mod progress;

pub use episode_organizer::{EpisodeFileOrganizationRequest, EpisodeFileOrganizer};
pub use filesystem::{FileInfo, FileSystem, LocalFileSystem};
pub use folder_scanner::{FolderOrganizer, ScanSummary};
pub use library::{
    LibraryManager, LibraryMonitor, MetadataProvider, NullLibraryMonitor, RemoteSearchQuery,
    RemoteSearchResult,
};
pub use logging::init_tracing;
pub use movie_organizer::{MovieFileOrganizationRequest, MovieFileOrganizer};
pub use organization_service::FileOrganizationService;
pub use organizer::{InUsePolicy, OrganizerContext};
pub use progress::{InProgressGuard, InProgressRegistry, OrganizationEvent};
