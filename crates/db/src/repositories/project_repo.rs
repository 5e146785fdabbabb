//! Repository for the project collection.
//!
//! Every operation is a whole-collection read-modify-write of the JSON
//! array stored under [`STORAGE_KEY`]. Concurrent writers race and the
//! last full write wins.

use canvas_core::types;

use crate::error::StorageError;
use crate::kv::KeyValueStore;
use crate::models::project::Project;

/// Key holding the serialized project collection.
pub const STORAGE_KEY: &str = "canvas-ai-projects";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// All projects, most recently updated first.
    ///
    /// Missing, unreadable or corrupt storage yields an empty list; the
    /// failure is logged, never returned.
    pub fn list(store: &dyn KeyValueStore) -> Vec<Project> {
        let mut projects = match Self::load(store) {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(error = %e, key = STORAGE_KEY, "Failed to load projects, treating storage as empty");
                Vec::new()
            }
        };
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        projects
    }

    /// Find a project by id.
    pub fn find_by_id(store: &dyn KeyValueStore, id: &str) -> Option<Project> {
        Self::list(store).into_iter().find(|p| p.id == id)
    }

    /// Insert or replace `project` by id, refreshing `updated_at`.
    ///
    /// Returns the record as stored.
    pub fn save(store: &dyn KeyValueStore, project: &Project) -> Result<Project, StorageError> {
        let mut projects = Self::load_for_update(store)?;

        let mut saved = project.clone();
        saved.updated_at = types::now().max(saved.created_at);

        match projects.iter_mut().find(|p| p.id == saved.id) {
            Some(existing) => *existing = saved.clone(),
            None => projects.push(saved.clone()),
        }

        Self::write(store, &projects)?;
        tracing::info!(project_id = %saved.id, edits = saved.history.len(), "Project saved");
        Ok(saved)
    }

    /// Delete a project by id. Returns `true` if a record was removed.
    pub fn delete(store: &dyn KeyValueStore, id: &str) -> Result<bool, StorageError> {
        let mut projects = Self::load_for_update(store)?;
        let before = projects.len();
        projects.retain(|p| p.id != id);
        let removed = projects.len() != before;

        Self::write(store, &projects)?;
        if removed {
            tracing::info!(project_id = %id, "Project deleted");
        }
        Ok(removed)
    }

    // ---- private helpers ----

    /// Read and parse the collection, in stored order.
    fn load(store: &dyn KeyValueStore) -> Result<Vec<Project>, StorageError> {
        let Some(raw) = store.get(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: STORAGE_KEY.to_string(),
            source,
        })
    }

    /// Like [`load`](Self::load) but only forgives corruption, so a
    /// backend read failure cannot cause the collection to be rewritten
    /// from nothing.
    fn load_for_update(store: &dyn KeyValueStore) -> Result<Vec<Project>, StorageError> {
        match Self::load(store) {
            Err(e @ StorageError::Corrupt { .. }) => {
                tracing::warn!(error = %e, "Overwriting corrupt project collection");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn write(store: &dyn KeyValueStore, projects: &[Project]) -> Result<(), StorageError> {
        let json = serde_json::to_string(projects).map_err(StorageError::Serialize)?;
        store.set(STORAGE_KEY, &json)
    }
}
