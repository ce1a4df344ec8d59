//! In-progress registry and organization events
//!
//! One registry is shared by every organizer of a service. Membership is keyed
//! by result id (derived from the source path), and the check-and-insert
//! happens under a single lock, so at most one organize attempt runs per
//! source file. Distinct sources that resolve to the same target are not
//! excluded by this.

use std::collections::HashSet;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

use crate::db::OrganizationResult;

/// Change notification for result log listeners
#[derive(Debug, Clone)]
pub enum OrganizationEvent {
    ResultAdded(OrganizationResult),
    ResultUpdated(OrganizationResult),
    LogCleared,
}

pub struct InProgressRegistry {
    ids: Mutex<HashSet<String>>,
    event_tx: broadcast::Sender<OrganizationEvent>,
}

impl Default for InProgressRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InProgressRegistry {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            ids: Mutex::new(HashSet::new()),
            event_tx,
        }
    }

    /// Subscribe to result log events
    pub fn subscribe(&self) -> broadcast::Receiver<OrganizationEvent> {
        self.event_tx.subscribe()
    }

    pub fn notify(&self, event: OrganizationEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.lock().contains(id)
    }

    /// Claim a result for processing
    ///
    /// Returns `None` if another attempt already holds it. On success the
    /// result is flagged in progress and an added/updated event goes out.
    pub fn try_add(&self, result: &mut OrganizationResult, is_new: bool) -> Option<InProgressGuard<'_>> {
        let id = result.effective_id();
        if !self.ids.lock().insert(id.clone()) {
            debug!(result_id = %id, "Result already in progress");
            return None;
        }

        result.is_in_progress = true;
        self.notify(if is_new {
            OrganizationEvent::ResultAdded(result.clone())
        } else {
            OrganizationEvent::ResultUpdated(result.clone())
        });

        Some(InProgressGuard {
            registry: self,
            id: Some(id),
        })
    }

    fn remove(&self, id: &str) {
        self.ids.lock().remove(id);
    }
}

/// Holds a registry entry; the entry is dropped with the guard even on early return
#[must_use = "dropping the guard releases the in-progress entry immediately"]
pub struct InProgressGuard<'a> {
    registry: &'a InProgressRegistry,
    id: Option<String>,
}

impl InProgressGuard<'_> {
    /// Release the entry, clear the flag on `result` and announce the update
    pub fn release(mut self, result: &mut OrganizationResult) {
        if let Some(id) = self.id.take() {
            self.registry.remove(&id);
        }
        result.is_in_progress = false;
        self.registry
            .notify(OrganizationEvent::ResultUpdated(result.clone()));
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.registry.remove(&id);
        }
    }
}
