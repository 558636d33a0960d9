//! Catalog write path and upload orchestration.

use chrono::Utc;
use rioframe_core::error::CoreError;
use rioframe_core::image_ref::AssetRef;
use rioframe_core::ordering::{next_order, reorder_positions};
use rioframe_core::sanitize::{escape_all, escape_text};
use rioframe_core::transcode::{self, TranscodeConstraints};
use rioframe_core::types::new_record_id;
use rioframe_db::models::project::{CreateProject, Project, ProjectPatch, UpdateProject};
use rioframe_db::repositories::ProjectRepo;
use tokio::sync::Mutex;
use validator::Validate;

use crate::asset_store::AssetStore;
use crate::error::CatalogResult;

/// One file from an upload request.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub bytes: Vec<u8>,
    pub name_hint: String,
}

/// Result of a batch upload. Failed entries are omitted from `assets`.
#[derive(Debug, Clone, Default)]
pub struct BatchUpload {
    pub assets: Vec<AssetRef>,
    pub failed: usize,
}

/// What cascade deletion managed to clean up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub files_removed: usize,
    pub failures: usize,
}

/// Business rules over the project collection and the asset store.
///
/// Every mutation of the collection goes through this type. Multi-step
/// mutations (read the collection, decide, write) hold `writer` for their
/// whole duration so concurrent admin requests are applied one after
/// another rather than racing. Reads never take the lock.
#[derive(Debug)]
pub struct CatalogService {
    projects: ProjectRepo,
    assets: AssetStore,
    constraints: TranscodeConstraints,
    writer: Mutex<()>,
}

impl CatalogService {
    pub fn new(projects: ProjectRepo, assets: AssetStore, constraints: TranscodeConstraints) -> Self {
        Self {
            projects,
            assets,
            constraints,
            writer: Mutex::new(()),
        }
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn constraints(&self) -> &TranscodeConstraints {
        &self.constraints
    }

    pub(crate) fn projects(&self) -> &ProjectRepo {
        &self.projects
    }

    /// Create a visible project at the end of the display order.
    pub async fn create_project(&self, input: CreateProject) -> CatalogResult<Project> {
        input.validate()?;

        let _writer = self.writer.lock().await;
        let existing = self.projects.list().await?;
        let order = next_order(existing.iter().map(|p| p.order));

        let project = Project {
            id: new_record_id(),
            title: escape_text(&input.title),
            category: escape_text(&input.category),
            client: escape_text(&input.client),
            description: escape_text(&input.description),
            about_text: input.about_text.as_deref().map(escape_text),
            services: escape_all(&input.services),
            main_image: input.main_image,
            gallery: input.gallery,
            is_active: Some(true),
            order: Some(order),
            created_at: Utc::now(),
            updated_at: None,
            extra: Default::default(),
        };

        let project = self.projects.insert(project).await?;
        tracing::info!(project_id = %project.id, order, "Project created");
        Ok(project)
    }

    /// Merge sanitized fields into an existing project.
    pub async fn update_project(&self, id: &str, input: UpdateProject) -> CatalogResult<Project> {
        input.validate()?;
        let patch = sanitized_patch(input);

        let _writer = self.writer.lock().await;
        let project = self
            .projects
            .replace(id, &patch)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))?;

        tracing::info!(project_id = %id, "Project updated");
        Ok(project)
    }

    /// Delete a project and, best-effort, every file its images occupy.
    ///
    /// Asset cleanup runs first and never blocks removal of the record:
    /// individual failures are logged and counted in the report.
    pub async fn delete_project(&self, id: &str) -> CatalogResult<CascadeReport> {
        let _writer = self.writer.lock().await;
        let project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))?;

        let report = self.cascade_assets(&project).await;

        if !self.projects.remove(id).await? {
            return Err(CoreError::not_found("Project", id).into());
        }

        tracing::info!(
            project_id = %id,
            files_removed = report.files_removed,
            cleanup_failures = report.failures,
            "Project deleted"
        );
        Ok(report)
    }

    /// Flip visibility (unset counts as active). Returns the new state.
    pub async fn toggle_active(&self, id: &str) -> CatalogResult<bool> {
        let _writer = self.writer.lock().await;
        let project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))?;

        let is_active = !project.active();
        let patch = ProjectPatch {
            is_active: Some(is_active),
            ..Default::default()
        };
        self.projects
            .replace(id, &patch)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))?;

        tracing::info!(project_id = %id, is_active, "Project visibility toggled");
        Ok(is_active)
    }

    /// Give each listed id the order `position + 1`. Ids not listed keep
    /// their order; unknown ids are ignored. Returns how many records
    /// changed.
    pub async fn reorder(&self, ordered_ids: &[String]) -> CatalogResult<usize> {
        let positions = reorder_positions(ordered_ids)?;
        if positions.is_empty() {
            return Ok(0);
        }

        let _writer = self.writer.lock().await;
        let updated = self.projects.assign_orders(&positions).await?;
        tracing::info!(requested = ordered_ids.len(), updated, "Projects reordered");
        Ok(updated)
    }

    /// Transcode one upload and store both representations.
    pub async fn upload_asset(&self, item: UploadItem) -> CatalogResult<AssetRef> {
        let UploadItem { bytes, name_hint } = item;
        let constraints = self.constraints;

        let (bytes, transcoded) = tokio::task::spawn_blocking(move || {
            let result = transcode::transcode(&bytes, &constraints);
            (bytes, result)
        })
        .await
        .map_err(|e| CoreError::Internal(format!("Transcode task failed: {e}")))?;
        let transcoded = transcoded?;

        let asset = self
            .assets
            .store(&bytes, &transcoded.bytes, &name_hint)
            .await?;

        tracing::info!(
            optimized = %asset.optimized_url,
            width = transcoded.width,
            height = transcoded.height,
            "Image uploaded"
        );
        Ok(asset)
    }

    /// Upload several files one after another. A failing entry is logged
    /// and left out of the result; it never aborts the rest.
    pub async fn upload_asset_batch(&self, items: Vec<UploadItem>) -> BatchUpload {
        let mut outcome = BatchUpload::default();
        for (index, item) in items.into_iter().enumerate() {
            match self.upload_asset(item).await {
                Ok(asset) => outcome.assets.push(asset),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping failed batch upload entry");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    async fn cascade_assets(&self, project: &Project) -> CascadeReport {
        let mut report = CascadeReport::default();
        for image in project.images() {
            match self.assets.delete(image).await {
                Ok(removed) => report.files_removed += removed,
                Err(e) => {
                    tracing::warn!(project_id = %project.id, error = %e, "Asset cleanup failed");
                    report.failures += 1;
                }
            }
        }
        report
    }
}

fn sanitized_patch(input: UpdateProject) -> ProjectPatch {
    ProjectPatch {
        title: input.title.as_deref().map(escape_text),
        category: input.category.as_deref().map(escape_text),
        client: input.client.as_deref().map(escape_text),
        description: input.description.as_deref().map(escape_text),
        about_text: input
            .about_text
            .map(|about| about.as_deref().map(escape_text)),
        services: input.services.as_deref().map(escape_all),
        main_image: input.main_image,
        gallery: input.gallery,
        is_active: None,
        order: None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use assert_matches::assert_matches;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use rioframe_core::image_ref::ImageRef;

    use super::*;
    use crate::error::CatalogError;

    fn service(dir: &Path) -> CatalogService {
        CatalogService::new(
            ProjectRepo::open(&dir.join("data")),
            AssetStore::new(dir.join("uploads"), "/uploads"),
            TranscodeConstraints::new(100, None, 80).unwrap(),
        )
    }

    fn titled(title: &str) -> CreateProject {
        CreateProject {
            title: title.into(),
            ..Default::default()
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10])))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn upload(bytes: Vec<u8>) -> UploadItem {
        UploadItem {
            bytes,
            name_hint: "photo.png".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_next_order_and_activates() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());

        let a = catalog.create_project(titled("A")).await.unwrap();
        let b = catalog.create_project(titled("B")).await.unwrap();

        assert_eq!(a.order, Some(1));
        assert_eq!(b.order, Some(2));
        assert_eq!(a.is_active, Some(true));
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn create_sanitizes_text() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());

        let input = CreateProject {
            title: "<script>x</script>".into(),
            services: vec!["A & B".into()],
            about_text: Some("\"quoted\"".into()),
            ..Default::default()
        };
        let p = catalog.create_project(input).await.unwrap();
        assert_eq!(p.title, "&lt;script&gt;x&lt;&#x2F;script&gt;");
        assert_eq!(p.services, vec!["A &amp; B"]);
        assert_eq!(p.about_text.as_deref(), Some("&quot;quoted&quot;"));
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_without_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());

        let input = titled(&"x".repeat(500));
        assert_matches!(
            catalog.create_project(input).await,
            Err(CatalogError::Core(CoreError::Validation(_)))
        );
        assert!(catalog.projects().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        assert_matches!(
            catalog.update_project("nope", UpdateProject::default()).await,
            Err(CatalogError::Core(CoreError::NotFound { .. }))
        );
    }

    #[tokio::test]
    async fn update_changes_only_named_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        let original = catalog
            .create_project(CreateProject {
                title: "Before".into(),
                client: "Acme".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = catalog
            .update_project(
                &original.id,
                UpdateProject {
                    title: Some("X".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "X");
        assert_eq!(updated.client, "Acme");
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.order, original.order);
        assert_eq!(updated.is_active, original.is_active);
    }

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        let p = catalog.create_project(titled("A")).await.unwrap();

        assert!(!catalog.toggle_active(&p.id).await.unwrap());
        assert!(catalog.toggle_active(&p.id).await.unwrap());
        assert_matches!(
            catalog.toggle_active("missing").await,
            Err(CatalogError::Core(CoreError::NotFound { .. }))
        );
    }

    #[tokio::test]
    async fn reorder_is_partial() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        let a = catalog.create_project(titled("A")).await.unwrap();
        let b = catalog.create_project(titled("B")).await.unwrap();
        let c = catalog.create_project(titled("C")).await.unwrap();

        let updated = catalog
            .reorder(&[b.id.clone(), a.id.clone(), "unknown".into()])
            .await
            .unwrap();
        assert_eq!(updated, 2);

        let find = |id: &str| {
            let id = id.to_string();
            let repo = catalog.projects();
            async move { repo.find_by_id(&id).await.unwrap().unwrap() }
        };
        assert_eq!(find(&b.id).await.order, Some(1));
        assert_eq!(find(&a.id).await.order, Some(2));
        assert_eq!(find(&c.id).await.order, Some(3));
    }

    #[tokio::test]
    async fn reorder_rejects_duplicates() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        assert_matches!(
            catalog.reorder(&["a".into(), "a".into()]).await,
            Err(CatalogError::Core(CoreError::Validation(_)))
        );
    }

    #[tokio::test]
    async fn upload_keeps_original_and_bounds_optimized() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        let raw = png(400, 200);

        let asset = catalog.upload_asset(upload(raw.clone())).await.unwrap();

        let original_path = catalog.assets().resolve(&asset.original_url).unwrap();
        assert_eq!(std::fs::read(original_path).unwrap(), raw);

        let optimized_path = catalog.assets().resolve(&asset.optimized_url).unwrap();
        let optimized = image::open(optimized_path).unwrap();
        assert!(optimized.width() <= 100);
        assert!(optimized.height() <= 100);
    }

    #[tokio::test]
    async fn upload_rejects_non_images() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        assert_matches!(
            catalog.upload_asset(upload(b"plain text".to_vec())).await,
            Err(CatalogError::Core(CoreError::UnsupportedFormat(_)))
        );
        let uploads = tmp.path().join("uploads");
        let stored = std::fs::read_dir(&uploads).map(|d| d.count()).unwrap_or(0);
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn batch_omits_corrupt_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());

        let outcome = catalog
            .upload_asset_batch(vec![
                upload(png(50, 50)),
                upload(b"corrupt".to_vec()),
                upload(png(300, 30)),
            ])
            .await;

        assert_eq!(outcome.assets.len(), 2);
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn delete_cascades_to_assets() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        let main = catalog.upload_asset(upload(png(20, 20))).await.unwrap();
        let extra = catalog.upload_asset(upload(png(20, 20))).await.unwrap();

        let p = catalog
            .create_project(CreateProject {
                title: "With images".into(),
                main_image: Some(ImageRef::Asset(main.clone())),
                gallery: vec![
                    ImageRef::Asset(main.clone()),
                    ImageRef::Asset(extra.clone()),
                    ImageRef::Legacy("https://placehold.co/600x400".into()),
                ],
                ..Default::default()
            })
            .await
            .unwrap();

        let report = catalog.delete_project(&p.id).await.unwrap();
        assert_eq!(report.files_removed, 4);
        assert_eq!(report.failures, 0);

        for url in [
            &main.original_url,
            &main.optimized_url,
            &extra.original_url,
            &extra.optimized_url,
        ] {
            assert!(!catalog.assets().resolve(url).unwrap().exists());
        }
        assert!(catalog.projects().find_by_id(&p.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_record_even_when_asset_cleanup_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        let kept = catalog.upload_asset(upload(png(20, 20))).await.unwrap();

        // A directory where a file is expected cannot be removed as a file.
        std::fs::create_dir_all(catalog.assets().root().join("stuck.jpg")).unwrap();

        let p = catalog
            .create_project(CreateProject {
                title: "Partly broken".into(),
                main_image: Some(ImageRef::Legacy("/uploads/stuck.jpg".into())),
                gallery: vec![ImageRef::Asset(kept.clone())],
                ..Default::default()
            })
            .await
            .unwrap();

        let report = catalog.delete_project(&p.id).await.unwrap();
        assert_eq!(
            report,
            CascadeReport {
                files_removed: 2,
                failures: 1,
            }
        );
        assert!(catalog.projects().find_by_id(&p.id).await.unwrap().is_none());
        assert!(!catalog.assets().resolve(&kept.original_url).unwrap().exists());
        assert_matches!(
            catalog.get_detail(&p.id).await,
            Err(CatalogError::Core(CoreError::NotFound { .. }))
        );
    }

    #[tokio::test]
    async fn delete_succeeds_when_files_are_already_gone() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = service(tmp.path());
        let p = catalog
            .create_project(CreateProject {
                main_image: Some(ImageRef::Legacy("/uploads/missing.jpg".into())),
                ..Default::default()
            })
            .await
            .unwrap();

        let report = catalog.delete_project(&p.id).await.unwrap();
        assert_eq!(report, CascadeReport::default());
        assert_matches!(
            catalog.delete_project(&p.id).await,
            Err(CatalogError::Core(CoreError::NotFound { .. }))
        );
    }
}
