//! Project record model and DTOs.

use rioframe_core::image_ref::ImageRef;
use rioframe_core::ordering::CatalogEntry;
use rioframe_core::types::{RecordId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

pub const MAX_TITLE_LEN: u64 = 200;
pub const MAX_DESCRIPTION_LEN: u64 = 5000;
pub const MAX_ABOUT_TEXT_LEN: u64 = 20_000;
pub const MAX_SERVICES: usize = 50;
pub const MAX_SERVICE_LEN: usize = 200;
pub const MAX_GALLERY_LEN: u64 = 100;

/// A project record as stored in `projects.json`.
///
/// Field names are camelCase on disk and on the wire. Records written by
/// older versions may lack `isActive`, `order`, `updatedAt`, and the long
/// form fields; they load with those unset. Unrecognised keys are kept in
/// `extra` so a rewrite never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_text: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub gallery: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    /// Effective visibility (unset counts as active).
    pub fn active(&self) -> bool {
        rioframe_core::ordering::is_visible(self.is_active)
    }

    /// Every image attached to the project, main image first.
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.main_image.iter().chain(self.gallery.iter())
    }

    /// Merge `patch` into this record. `id` and `created_at` are never
    /// touched; `updated_at` is always stamped with `now`.
    pub fn apply(&mut self, patch: &ProjectPatch, now: Timestamp) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(category) = &patch.category {
            self.category.clone_from(category);
        }
        if let Some(client) = &patch.client {
            self.client.clone_from(client);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(about_text) = &patch.about_text {
            self.about_text.clone_from(about_text);
        }
        if let Some(services) = &patch.services {
            self.services.clone_from(services);
        }
        if let Some(main_image) = &patch.main_image {
            self.main_image.clone_from(main_image);
        }
        if let Some(gallery) = &patch.gallery {
            self.gallery.clone_from(gallery);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = Some(is_active);
        }
        if let Some(order) = patch.order {
            self.order = Some(order);
        }
        self.updated_at = Some(now);
    }
}

impl CatalogEntry for Project {
    fn order(&self) -> Option<i64> {
        self.order
    }

    fn is_active(&self) -> Option<bool> {
        self.is_active
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Field-level changes to a stored project.
///
/// `None` leaves a field alone. For the nullable fields the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub client: Option<String>,
    pub description: Option<String>,
    pub about_text: Option<Option<String>>,
    pub services: Option<Vec<String>>,
    pub main_image: Option<Option<ImageRef>>,
    pub gallery: Option<Vec<ImageRef>>,
    pub is_active: Option<bool>,
    pub order: Option<i64>,
}

/// DTO for creating a project. Every field is optional; text defaults to
/// empty.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[serde(default)]
    #[validate(length(max = MAX_TITLE_LEN))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = MAX_TITLE_LEN))]
    pub category: String,
    #[serde(default)]
    #[validate(length(max = MAX_TITLE_LEN))]
    pub client: String,
    #[serde(default)]
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = MAX_ABOUT_TEXT_LEN))]
    pub about_text: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_services"))]
    pub services: Vec<String>,
    #[serde(default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    #[validate(length(max = MAX_GALLERY_LEN))]
    pub gallery: Vec<ImageRef>,
}

/// DTO for updating a project. Absent fields are left unchanged; an
/// explicit `null` clears `aboutText` or `mainImage`. `id`, `createdAt`,
/// `order`, and `isActive` are not accepted here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[validate(length(max = MAX_TITLE_LEN))]
    pub title: Option<String>,
    #[validate(length(max = MAX_TITLE_LEN))]
    pub category: Option<String>,
    #[validate(length(max = MAX_TITLE_LEN))]
    pub client: Option<String>,
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = MAX_ABOUT_TEXT_LEN))]
    pub about_text: Option<Option<String>>,
    #[validate(custom(function = "validate_services"))]
    pub services: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub main_image: Option<Option<ImageRef>>,
    #[validate(length(max = MAX_GALLERY_LEN))]
    pub gallery: Option<Vec<ImageRef>>,
}

fn validate_services(services: &[String]) -> Result<(), ValidationError> {
    if services.len() > MAX_SERVICES {
        return Err(ValidationError::new("too_many_services"));
    }
    if services.iter().any(|s| s.chars().count() > MAX_SERVICE_LEN) {
        return Err(ValidationError::new("service_too_long"));
    }
    Ok(())
}

/// Distinguish an absent key (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
