//! In-process result store

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    FileSortingStatus, OrganizationResult, QueryResult, ResultQuery, ResultStore,
    SmartMatchResult,
};
use crate::error::Result;

/// Everything a result store holds; shared by the memory and JSON stores
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreState {
    pub results: HashMap<String, OrganizationResult>,
    pub smart_matches: HashMap<Uuid, SmartMatchResult>,
}

impl StoreState {
    pub fn save_result(&mut self, result: &mut OrganizationResult) {
        let id = result.ensure_id().to_string();
        self.results.insert(id, result.clone());
    }

    pub fn get_result_by_source_path(&self, path: &str) -> Option<OrganizationResult> {
        self.results
            .values()
            .filter(|r| r.original_path == path)
            .max_by_key(|r| r.date)
            .cloned()
    }

    pub fn get_results(&self, query: &ResultQuery) -> QueryResult<OrganizationResult> {
        let mut items: Vec<OrganizationResult> = self.results.values().cloned().collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));

        let total_record_count = items.len();
        let items = items
            .into_iter()
            .skip(query.start_index.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        QueryResult {
            items,
            total_record_count,
        }
    }

    pub fn delete_completed(&mut self) {
        self.results
            .retain(|_, r| r.status != FileSortingStatus::Success);
    }
}

/// Result store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    state: RwLock<StoreState>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn save_result(&self, result: &mut OrganizationResult) -> Result<()> {
        self.state.write().save_result(result);
        Ok(())
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
        self.state.write().results.remove(id);
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.state.write().results.clear();
        Ok(())
    }

    fn delete_completed(&self) -> Result<()> {
        self.state.write().delete_completed();
        Ok(())
    }

    fn get_smart_matches(&self) -> Result<Vec<SmartMatchResult>> {
        Ok(self.state.read().smart_matches.values().cloned().collect())
    }

    fn get_smart_match(&self, id: Uuid) -> Result<Option<SmartMatchResult>> {
        Ok(self.state.read().smart_matches.get(&id).cloned())
    }

    fn save_smart_match(&self, record: &SmartMatchResult) -> Result<()> {
        self.state
            .write()
            .smart_matches
            .insert(record.id, record.clone());
        Ok(())
    }

    fn delete_smart_match(&self, id: Uuid) -> Result<()> {
        self.state.write().smart_matches.remove(&id);
        Ok(())
    }

    fn delete_all_smart_matches(&self) -> Result<()> {
        self.state.write().smart_matches.clear();
        Ok(())
    }
}
