//! Organization log storage
//!
//! The organizer only needs a generic persisted-result store: upsert and query
//! organization results plus the smart-match memory. [MemoryResultStore] keeps
//! everything in process; [JsonResultStore] persists the same state to disk.

pub mod json_file;
pub mod memory;
pub mod organization_results;
pub mod smart_matches;

use uuid::Uuid;

use crate::error::Result;

pub use json_file::JsonResultStore;
pub use memory::{MemoryResultStore, StoreState};
pub use organization_results::{
    FileOrganizerType, FileSortingStatus, OrganizationResult, QueryResult, ResultQuery,
    file_name_of, result_id_for_path,
};
pub use smart_matches::{MIN_MATCH_STRING_LEN, SmartMatchResult};

/// Persisted organization log and smart-match memory
///
/// Implementations serialize their own writes; callers treat every method as
/// one atomic call.
pub trait ResultStore: Send + Sync {
    /// Upsert a result, assigning its stable id if it has none
    fn save_result(&self, result: &mut OrganizationResult) -> Result<()>;

    fn get_result(&self, id: &str) -> Result<Option<OrganizationResult>>;

    fn get_result_by_source_path(&self, path: &str) -> Result<Option<OrganizationResult>>;

    /// Results newest first
    fn get_results(&self, query: &ResultQuery) -> Result<QueryResult<OrganizationResult>>;

    fn delete(&self, id: &str) -> Result<()>;

    fn delete_all(&self) -> Result<()>;

    /// Remove every result whose status is Success
    fn delete_completed(&self) -> Result<()>;

    fn get_smart_matches(&self) -> Result<Vec<SmartMatchResult>>;

    fn get_smart_match(&self, id: Uuid) -> Result<Option<SmartMatchResult>>;

    fn save_smart_match(&self, record: &SmartMatchResult) -> Result<()>;

    fn delete_smart_match(&self, id: Uuid) -> Result<()>;

    fn delete_all_smart_matches(&self) -> Result<()>;

    /// Remove one raw string from a smart match, dropping the record once it is empty
    fn delete_smart_match_string(&self, id: Uuid, match_string: &str) -> Result<()> {
        let Some(mut record) = self.get_smart_match(id)? else {
            return Ok(());
        };

        record.remove_match_string(match_string);

        if record.match_strings.is_empty() {
            self.delete_smart_match(id)
        } else {
            self.save_smart_match(&record)
        }
    }
}
