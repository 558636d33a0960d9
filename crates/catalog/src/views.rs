//! Read-side projections of the catalog.

use rioframe_core::error::CoreError;
use rioframe_core::ordering::sort_for_display;
use rioframe_db::models::project::Project;

use crate::error::CatalogResult;
use crate::service::CatalogService;

impl CatalogService {
    /// Active projects in display order.
    pub async fn public_list(&self) -> CatalogResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects()
            .list()
            .await?
            .into_iter()
            .filter(Project::active)
            .collect();
        sort_for_display(&mut projects);
        Ok(projects)
    }

    /// Every project, inactive ones included, in display order.
    pub async fn admin_list(&self) -> CatalogResult<Vec<Project>> {
        let mut projects = self.projects().list().await?;
        sort_for_display(&mut projects);
        Ok(projects)
    }

    /// A single project by id, regardless of visibility.
    pub async fn get_detail(&self, id: &str) -> CatalogResult<Project> {
        let project = self
            .projects()
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))?;
        Ok(project)
    }
}
