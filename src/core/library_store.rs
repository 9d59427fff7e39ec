//! Client-side owner of the library snapshot and the selection.
//!
//! Writes follow refetch-after-write: after the backend accepts a create,
//! update or delete, the whole snapshot is fetched again and replaces the
//! local copy. When that follow-up fetch fails the write still counts as a
//! success and the store reconciles from the write's own response instead.
//!
//! State lives behind a plain mutex that is never held across an `.await`, so
//! concurrent calls interleave between requests. The last snapshot to land
//! wins; selection pruning always happens under the same lock as the snapshot
//! change it follows.

use crate::api::transport::{Transport, TransportError};
use crate::core::error::ClientError;
use crate::core::library::{LibraryDraft, LibraryPatch, LibraryResource};
use crate::core::selection::SelectionSet;
use crate::utils::url::{libraries_url, library_url, normalize_base_url};
use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

#[derive(Default)]
struct StoreState {
    resources: Vec<LibraryResource>,
    selection: SelectionSet,
}

impl StoreState {
    fn replace(&mut self, resources: Vec<LibraryResource>) -> Vec<i64> {
        self.resources = resources;
        self.selection.retain_known(&self.resources)
    }

    fn upsert(&mut self, resource: LibraryResource) {
        match self.resources.iter_mut().find(|r| r.id == resource.id) {
            Some(existing) => *existing = resource,
            None => self.resources.push(resource),
        }
    }

    fn drop_resource(&mut self, id: i64) -> bool {
        let before = self.resources.len();
        self.resources.retain(|r| r.id != id);
        self.selection.forget(id);
        before != self.resources.len()
    }
}

pub struct LibraryStore {
    transport: Arc<dyn Transport>,
    base_url: String,
    state: Mutex<StoreState>,
}

fn decode<T: DeserializeOwned>(json: Value, what: &str) -> Result<T, ClientError> {
    serde_json::from_value(json).map_err(|err| ClientError::unexpected_payload(what, err))
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|err| ClientError::Unknown(err.to_string()))
}

/// A 404 on a single-library route means the id is gone.
fn not_found_or(err: TransportError, id: i64) -> ClientError {
    match err {
        TransportError::Status { status: 404, .. } => ClientError::NotFound(id),
        other => other.into(),
    }
}

impl LibraryStore {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: normalize_base_url(base_url),
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last fetched snapshot. Never triggers a request.
    pub fn list(&self) -> Vec<LibraryResource> {
        self.state().resources.clone()
    }

    pub fn find(&self, id: i64) -> Option<LibraryResource> {
        self.state().resources.iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().resources.is_empty()
    }

    /// Replaces the snapshot with the backend's collection. On failure the
    /// snapshot and selection are left exactly as they were.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let url = libraries_url(&self.base_url);
        debug!(url = %url, "Refreshing library snapshot");
        let response = self.transport.get(&url).await?;
        let resources: Vec<LibraryResource> = decode(response.json, "library list")?;
        let count = resources.len();
        let pruned = self.state().replace(resources);
        if !pruned.is_empty() {
            debug!(pruned = ?pruned, "Dropped selections for libraries that no longer exist");
        }
        debug!(count, "Library snapshot replaced");
        Ok(())
    }

    /// Fetches one library straight from the backend without touching the
    /// snapshot.
    pub async fn fetch(&self, id: i64) -> Result<LibraryResource, ClientError> {
        let response = self
            .transport
            .get(&library_url(&self.base_url, id))
            .await
            .map_err(|err| not_found_or(err, id))?;
        decode(response.json, "library")
    }

    pub async fn add(&self, draft: &LibraryDraft) -> Result<LibraryResource, ClientError> {
        draft.validate()?;
        let body = encode(draft)?;
        let response = self
            .transport
            .post(&libraries_url(&self.base_url), &body)
            .await?;

        // The row exists on the backend from here on, whatever the body says.
        let refreshed = self.refresh().await;
        let created = match decode::<LibraryResource>(response.json, "created library") {
            Ok(created) => created,
            Err(err) => {
                let found = refreshed
                    .is_ok()
                    .then(|| self.newest_matching(draft))
                    .flatten();
                match found {
                    Some(resource) => {
                        debug!(id = resource.id, "Create reply was not a row; matched it in the snapshot");
                        resource
                    }
                    None => return Err(err),
                }
            }
        };
        info!(id = created.id, name = %created.name, "Library created");

        if let Err(err) = refreshed {
            warn!(id = created.id, error = %err, "Refresh after create failed; keeping the server copy");
            self.state().upsert(created.clone());
        }
        Ok(created)
    }

    /// Highest-id snapshot row carrying exactly the draft's fields.
    fn newest_matching(&self, draft: &LibraryDraft) -> Option<LibraryResource> {
        self.state()
            .resources
            .iter()
            .filter(|r| r.matches_draft(draft))
            .max_by_key(|r| r.id)
            .cloned()
    }

    pub async fn update(&self, id: i64, patch: &LibraryPatch) -> Result<(), ClientError> {
        patch.validate()?;
        let body = encode(patch)?;
        let response = self
            .transport
            .put(&library_url(&self.base_url, id), &body)
            .await
            .map_err(|err| not_found_or(err, id))?;
        info!(id, "Library updated");

        if let Err(err) = self.refresh().await {
            warn!(id, error = %err, "Refresh after update failed; merging locally");
            let acknowledged = serde_json::from_value::<LibraryResource>(response.json)
                .ok()
                .filter(|resource| resource.id == id);
            let mut state = self.state();
            match acknowledged {
                Some(resource) => state.upsert(resource),
                None => {
                    if let Some(existing) = state.resources.iter_mut().find(|r| r.id == id) {
                        existing.apply_patch(patch);
                    }
                }
            }
        }
        Ok(())
    }

    /// Deletes a library. A 404 counts as success: the library is gone either
    /// way. The id leaves the snapshot and the selection together before the
    /// follow-up refresh starts.
    pub async fn remove(&self, id: i64) -> Result<(), ClientError> {
        match self.transport.delete(&library_url(&self.base_url, id)).await {
            Ok(_) => info!(id, "Library deleted"),
            Err(TransportError::Status { status: 404, .. }) => {
                debug!(id, "Library already absent on the backend")
            }
            Err(err) => return Err(err.into()),
        }

        self.state().drop_resource(id);

        if let Err(err) = self.refresh().await {
            warn!(id, error = %err, "Refresh after delete failed; local removal stands");
        }
        Ok(())
    }

    /// Deletes several libraries concurrently and reports each outcome.
    pub async fn remove_many(&self, ids: &[i64]) -> Vec<(i64, Result<(), ClientError>)> {
        join_all(ids.iter().map(|&id| async move { (id, self.remove(id).await) })).await
    }

    pub fn selected(&self) -> BTreeSet<i64> {
        self.state().selection.get_selected()
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.state().selection.ids()
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.state().selection.contains(id)
    }

    /// Replaces the selection; ids without a library are dropped and returned.
    pub fn set_selected<I>(&self, ids: I) -> Vec<i64>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut state = self.state();
        let StoreState {
            resources,
            selection,
        } = &mut *state;
        selection.set_selected(ids, resources)
    }

    pub fn toggle_selected(&self, id: i64) -> Option<bool> {
        let mut state = self.state();
        let StoreState {
            resources,
            selection,
        } = &mut *state;
        selection.toggle(id, resources)
    }

    pub fn clear_selection(&self) {
        self.state().selection.clear();
    }
}
