//! Handlers for contact form submissions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rioframe_core::contact::validate_contact_fields;
use rioframe_core::error::CoreError;
use rioframe_core::sanitize::escape_text;
use rioframe_db::models::contact::{Contact, CreateContact};

use crate::error::{AppError, AppResult};
use crate::middleware::client::ClientKey;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contact
///
/// Public. One accepted submission per client per rate-limit window. The
/// slot is taken only once the fields validate, and given back if the
/// message cannot be stored.
pub async fn submit(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    Json(input): Json<CreateContact>,
) -> AppResult<(StatusCode, Json<DataResponse<Contact>>)> {
    let name = input.name.trim();
    let phone = input.phone.trim();
    let message = input.message.trim();
    validate_contact_fields(name, phone, message)?;

    state.contact_limiter.try_acquire(&client)?;

    let sanitized = CreateContact {
        name: escape_text(name),
        phone: escape_text(phone),
        message: escape_text(message),
    };
    let contact = match state.contacts.create(&sanitized).await {
        Ok(contact) => contact,
        Err(e) => {
            state.contact_limiter.release(&client);
            return Err(e.into());
        }
    };

    tracing::info!(contact_id = %contact.id, "Contact message received");
    Ok((StatusCode::CREATED, Json(DataResponse { data: contact })))
}

/// GET /api/v1/admin/contacts
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Contact>>>> {
    let contacts = state.contacts.list().await?;
    Ok(Json(DataResponse { data: contacts }))
}

/// PATCH /api/v1/admin/contacts/{id}/read
pub async fn mark_read(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Contact>>> {
    let contact = state
        .contacts
        .mark_read(&id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Contact", id)))?;
    Ok(Json(DataResponse { data: contact }))
}

/// DELETE /api/v1/admin/contacts/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if !state.contacts.delete(&id).await? {
        return Err(AppError::Core(CoreError::not_found("Contact", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
