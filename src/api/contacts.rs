//! Contact endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult, ErrorResponse, ValidationErrorResponse},
    models::contact::{Contact, ContactPatch, CreateContact, InsertAck, NewContact, UpdateContact},
    validation::{self, Violations},
    AppState,
};

use super::{ContactIdParam, JsonBody, MessageResponse};

/// List all contacts
#[utoipa::path(
    get,
    path = "/contacts",
    tag = "contacts",
    responses(
        (status = 200, description = "All contacts", body = Vec<Contact>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_contacts(State(state): State<AppState>) -> AppResult<Json<Vec<Contact>>> {
    let contacts = state.services.contacts.list().await?;
    Ok(Json(contacts))
}

/// Get a contact by ID
#[utoipa::path(
    get,
    path = "/contacts/{id}",
    tag = "contacts",
    params(("id" = String, Path, description = "Contact ID (24 hex characters)")),
    responses(
        (status = 200, description = "Contact details", body = Contact),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Contact not found", body = ErrorResponse)
    )
)]
pub async fn get_contact(
    State(state): State<AppState>,
    ContactIdParam(id): ContactIdParam,
) -> AppResult<Json<Contact>> {
    let contact = state.services.contacts.get_by_id(&id).await?;
    Ok(Json(contact))
}

/// Create a contact
#[utoipa::path(
    post,
    path = "/contacts",
    tag = "contacts",
    request_body = CreateContact,
    responses(
        (status = 201, description = "Contact created", body = InsertAck),
        (status = 400, description = "Invalid input", body = ValidationErrorResponse),
        (status = 500, description = "Insert not acknowledged", body = ErrorResponse)
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    JsonBody(data): JsonBody<CreateContact>,
) -> AppResult<(StatusCode, Json<InsertAck>)> {
    validation::validate_body(&data)?;

    let ack = state.services.contacts.create(&NewContact::from(data)).await?;
    Ok((StatusCode::CREATED, Json(ack)))
}

/// Update a contact; only fields present and non-empty are changed
#[utoipa::path(
    put,
    path = "/contacts/{id}",
    tag = "contacts",
    params(("id" = String, Path, description = "Contact ID (24 hex characters)")),
    request_body = UpdateContact,
    responses(
        (status = 200, description = "Contact updated", body = MessageResponse),
        (status = 400, description = "Invalid ID or input", body = ValidationErrorResponse),
        (status = 404, description = "Contact not found", body = ErrorResponse)
    )
)]
pub async fn update_contact(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(data): JsonBody<UpdateContact>,
) -> AppResult<Json<MessageResponse>> {
    let mut violations = Violations::new();
    let id = violations.contact_id(&raw_id);
    violations.body(&data);
    violations.finish()?;
    // finish() already failed for a malformed id
    let id = id.ok_or_else(|| AppError::BadRequest(validation::INVALID_CONTACT_ID.to_string()))?;

    state
        .services
        .contacts
        .update(&id, &ContactPatch::from(data))
        .await?;
    Ok(Json(MessageResponse::new("Contact updated successfully.")))
}

/// Delete a contact
#[utoipa::path(
    delete,
    path = "/contacts/{id}",
    tag = "contacts",
    params(("id" = String, Path, description = "Contact ID (24 hex characters)")),
    responses(
        (status = 200, description = "Contact deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Contact not found", body = ErrorResponse)
    )
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    ContactIdParam(id): ContactIdParam,
) -> AppResult<Json<MessageResponse>> {
    state.services.contacts.delete(&id).await?;
    Ok(Json(MessageResponse::new("Contact deleted successfully.")))
}
