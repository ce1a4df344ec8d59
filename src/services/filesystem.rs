//! File system capability
//!
//! The organizers do every file operation through [FileSystem] so tests can
//! run against an in-memory tree. [LocalFileSystem] is the real thing over
//! `tokio::fs`. A move or copy that has started runs to completion or fails;
//! it is never cut off by cancellation.

use std::io;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::file_utils::{extension_of, sanitize_for_filename};

/// Size and extension of an existing file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub length: u64,
    /// Extension without the dot
    pub extension: String,
}

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn file_exists(&self, path: &str) -> bool;

    async fn get_file_info(&self, path: &str) -> io::Result<FileInfo>;

    async fn copy_file(&self, source: &str, target: &str, overwrite: bool) -> io::Result<()>;

    async fn move_file(&self, source: &str, target: &str) -> io::Result<()>;

    async fn delete_file(&self, path: &str) -> io::Result<()>;

    /// Create a directory and any missing parents
    async fn create_directory(&self, path: &str) -> io::Result<()>;

    /// Files directly inside `dir`
    async fn get_file_paths(&self, dir: &str) -> io::Result<Vec<String>>;

    fn get_valid_filename(&self, name: &str) -> String {
        sanitize_for_filename(name)
    }
}

/// [FileSystem] over the local disk
#[derive(Debug, Default, Clone)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn file_exists(&self, path: &str) -> bool {
        tokio::fs::metadata(path)
            .await
            .is_ok_and(|metadata| metadata.is_file())
    }

    async fn get_file_info(&self, path: &str) -> io::Result<FileInfo> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(FileInfo {
            length: metadata.len(),
            extension: extension_of(path),
        })
    }

    async fn copy_file(&self, source: &str, target: &str, overwrite: bool) -> io::Result<()> {
        if !overwrite && tokio::fs::try_exists(target).await.unwrap_or(false) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Target file already exists: {target}"),
            ));
        }
        tokio::fs::copy(source, target).await?;
        debug!(source = %source, target = %target, "Copied file");
        Ok(())
    }

    async fn move_file(&self, source: &str, target: &str) -> io::Result<()> {
        // Try rename first (fast, same filesystem)
        if let Err(e) = tokio::fs::rename(source, target).await {
            debug!(
                source = %source,
                target = %target,
                error = %e,
                "Rename failed, falling back to copy and delete"
            );
            tokio::fs::copy(source, target).await?;
            if let Err(e) = tokio::fs::remove_file(source).await {
                warn!(path = %source, error = %e, "Copied file but could not remove the source");
                return Err(e);
            }
        }
        debug!(source = %source, target = %target, "Moved file");
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn create_directory(&self, path: &str) -> io::Result<()> {
        if path.is_empty() {
            return Ok(());
        }
        tokio::fs::create_dir_all(path).await
    }

    async fn get_file_paths(&self, dir: &str) -> io::Result<Vec<String>> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(entry.path().to_string_lossy().into_owned());
            }
        }
        paths.sort();
        Ok(paths)
    }
}
