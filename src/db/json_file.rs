//! JSON file backed result store
//!
//! Holds the same [StoreState] as the memory store and rewrites the file after
//! every mutation (write to a sibling temp file, then rename).

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    OrganizationResult, QueryResult, ResultQuery, ResultStore, SmartMatchResult, StoreState,
};
use crate::error::{OrganizeError, Result};

pub struct JsonResultStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonResultStore {
    /// Open the store at `path`, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let state = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                StoreState::default()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            StoreState::default()
        };

        info!(
            path = %path.display(),
            results = state.results.len(),
            smart_matches = state.smart_matches.len(),
            "Opened organization log"
        );

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply a mutation to a staged copy, flush it, then commit it in memory
    ///
    /// The write lock is held throughout. A failed flush leaves both the file
    /// and the in-memory state as they were.
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> Result<T> {
        let mut state = self.state.write();
        let mut staged = state.clone();
        let value = f(&mut staged);
        self.flush(&staged)?;
        *state = staged;
        Ok(value)
    }

    fn flush(&self, state: &StoreState) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(OrganizeError::Store(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            )));
        }

        debug!(path = %self.path.display(), "Flushed organization log");
        Ok(())
    }
}

impl ResultStore for JsonResultStore {
    fn save_result(&self, result: &mut OrganizationResult) -> Result<()> {
        self.mutate(|state| state.save_result(result))
    }

    fn get_result(&self, id: &str) -> Result<Option<OrganizationResult>> {
        Ok(self.state.read().results.get(id).cloned())
    }

    fn get_result_by_source_path(&self, path: &str) -> Result<Option<OrganizationResult>> {
        Ok(self.state.read().get_result_by_source_path(path))
    }

    fn get_results(&self, query: &ResultQuery) -> Result<QueryResult<OrganizationResult>> {
        Ok(self.state.read().get_results(query))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.mutate(|state| {
            state.results.remove(id);
        })
    }

    fn delete_all(&self) -> Result<()> {
        self.mutate(|state| state.results.clear())
    }

    fn delete_completed(&self) -> Result<()> {
        self.mutate(|state| state.delete_completed())
    }

    fn get_smart_matches(&self) -> Result<Vec<SmartMatchResult>> {
        Ok(self.state.read().smart_matches.values().cloned().collect())
    }

    fn get_smart_match(&self, id: Uuid) -> Result<Option<SmartMatchResult>> {
        Ok(self.state.read().smart_matches.get(&id).cloned())
    }

    fn save_smart_match(&self, record: &SmartMatchResult) -> Result<()> {
        self.mutate(|state| {
            state.smart_matches.insert(record.id, record.clone());
        })
    }

    fn delete_smart_match(&self, id: Uuid) -> Result<()> {
        self.mutate(|state| {
            state.smart_matches.remove(&id);
        })
    }

    fn delete_all_smart_matches(&self) -> Result<()> {
        self.mutate(|state| state.smart_matches.clear())
    }
}
