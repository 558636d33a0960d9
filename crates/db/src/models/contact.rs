//! Contact message model and DTOs.

use rioframe_core::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// A contact form submission as stored in `contacts.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    pub message: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub is_read: bool,
}

/// DTO for a new contact submission. Fields are trimmed, validated, and
/// escaped by the caller before they reach the repository.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}
