//! Repository for the project collection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::models::project::{Project, ProjectPatch};
use crate::store::{JsonStore, StoreError};
use crate::PROJECTS_FILE;

/// Record-level CRUD over `projects.json`.
///
/// The repository knows nothing about image files; removing a record
/// never touches the assets it references.
#[derive(Debug)]
pub struct ProjectRepo {
    store: JsonStore<Project>,
}

impl ProjectRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(path),
        }
    }

    /// Open the collection inside `data_dir`.
    pub fn open(data_dir: &Path) -> Self {
        Self::new(data_dir.join(PROJECTS_FILE))
    }

    /// All records, in storage order.
    pub async fn list(&self) -> Result<Vec<Project>, StoreError> {
        self.store.load().await
    }

    /// Find a record by id. Returns `None` when absent.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.store.load().await?.into_iter().find(|p| p.id == id))
    }

    /// Append a fully-formed record and return it.
    pub async fn insert(&self, project: Project) -> Result<Project, StoreError> {
        self.store
            .mutate(|items| {
                items.push(project.clone());
                Some(())
            })
            .await?;
        Ok(project)
    }

    /// Merge `patch` into the record with `id`, stamping `updated_at`.
    ///
    /// Returns `None` if no record with the given `id` exists.
    pub async fn replace(
        &self,
        id: &str,
        patch: &ProjectPatch,
    ) -> Result<Option<Project>, StoreError> {
        let now = Utc::now();
        self.store
            .mutate(|items| {
                let project = items.iter_mut().find(|p| p.id == id)?;
                project.apply(patch, now);
                Some(project.clone())
            })
            .await
    }

    /// Set `order` on every record named in `positions` in a single write.
    ///
    /// Records not named keep their order. Returns how many records were
    /// updated; unknown ids are skipped.
    pub async fn assign_orders(&self, positions: &HashMap<&str, i64>) -> Result<usize, StoreError> {
        let now = Utc::now();
        let updated = self
            .store
            .mutate(|items| {
                let mut updated = 0;
                for project in items.iter_mut() {
                    if let Some(&order) = positions.get(project.id.as_str()) {
                        project.order = Some(order);
                        project.updated_at = Some(now);
                        updated += 1;
                    }
                }
                (updated > 0).then_some(updated)
            })
            .await?;
        Ok(updated.unwrap_or(0))
    }

    /// Delete the record with `id`. Returns `true` if one was removed.
    pub async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self
            .store
            .mutate(|items| {
                let index = items.iter().position(|p| p.id == id)?;
                items.remove(index);
                Some(())
            })
            .await?;
        Ok(removed.is_some())
    }
}
