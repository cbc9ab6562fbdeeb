//! API key management endpoints
//!
//! All operations are scoped to the session user. Admission for each
//! request runs in a fixed order: body shape, then path and field
//! validation, then the session check, then ownership and the per-user
//! cap inside the service.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::middleware::{SessionUser, session_user_id};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, SuccessResponse};
use crate::domain::api_key::{ApiKey, ApiKeyId};
use crate::domain::validation::{
    MAX_API_KEY_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, is_valid_api_key_format,
    sanitize_string,
};
use crate::infrastructure::api_key::{ApiKeyChanges, CreateApiKeyRequest};

/// Create the API key router
pub fn create_api_keys_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_api_keys).post(create_api_key))
        .route("/{id}", patch(update_api_key).delete(delete_api_key))
}

/// API key record as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub key: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<String>,
    pub is_active: bool,
}

impl ApiKeyResponse {
    pub fn from_api_key(key: &ApiKey) -> Self {
        Self {
            id: key.id().to_string(),
            name: key.name().to_string(),
            description: key.description().map(str::to_string),
            key: key.key().to_string(),
            created_at: key.created_at().to_rfc3339(),
            last_used: key.last_used().map(|t| t.to_rfc3339()),
            is_active: key.is_active(),
        }
    }
}

/// Create API key request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub key: Option<String>,
    pub is_active: Option<bool>,
}

/// Update API key request
///
/// Absent fields stay unchanged. `description` and `lastUsed` take an
/// explicit null to clear the stored value, which requires telling
/// "absent" apart from "null".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApiKeyBody {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub key: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_used: Option<Option<DateTime<Utc>>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_key_id(id: &str) -> Result<ApiKeyId, ApiError> {
    ApiKeyId::parse(id).map_err(|_| ApiError::bad_request("Invalid API key ID."))
}

/// List the current user's API keys
///
/// GET /api-keys
///
/// Keys are returned newest first.
pub async fn list_api_keys(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
) -> Result<Json<Vec<ApiKeyResponse>>, ApiError> {
    let keys = state.api_key_service.list(&user_id).await?;

    Ok(Json(keys.iter().map(ApiKeyResponse::from_api_key).collect()))
}

/// Create a new API key
///
/// POST /api-keys
pub async fn create_api_key(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CreateApiKeyBody>,
) -> Result<(StatusCode, Json<ApiKeyResponse>), ApiError> {
    let name = body.name.unwrap_or_default();
    let key = body.key.unwrap_or_default();

    if name.is_empty() || key.is_empty() {
        return Err(ApiError::bad_request("Name and key are required."));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::bad_request("Name must be 200 characters or less."));
    }
    if body
        .description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
    {
        return Err(ApiError::bad_request(
            "Description must be 1000 characters or less.",
        ));
    }
    if !is_valid_api_key_format(&key) {
        return Err(ApiError::bad_request("Invalid API key format."));
    }

    let user_id = session_user_id(&jar)?;

    let created = state
        .api_key_service
        .create(
            &user_id,
            CreateApiKeyRequest {
                name,
                description: body.description,
                key,
                is_active: body.is_active.unwrap_or(true),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiKeyResponse::from_api_key(&created)),
    ))
}

/// Update fields on an API key the user owns
///
/// PATCH /api-keys/{id}
pub async fn update_api_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
    Json(body): Json<UpdateApiKeyBody>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let key_id = parse_key_id(&id)?;

    let mut changes = ApiKeyChanges::default();

    if let Some(name) = body.name {
        let name = sanitize_string(&name, MAX_NAME_LENGTH);
        if name.is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty."));
        }
        changes.name = Some(name);
    }

    if let Some(description) = body.description {
        // An explicit null and an empty string both clear the field.
        changes.description = Some(match description {
            Some(d) if !d.is_empty() => Some(sanitize_string(&d, MAX_DESCRIPTION_LENGTH)),
            _ => None,
        });
    }

    if let Some(key) = body.key {
        let key = sanitize_string(&key, MAX_API_KEY_LENGTH);
        if !is_valid_api_key_format(&key) {
            return Err(ApiError::bad_request("Invalid API key format."));
        }
        changes.key = Some(key);
    }

    changes.is_active = body.is_active;
    changes.last_used = body.last_used;

    let user_id = session_user_id(&jar)?;

    let updated = state
        .api_key_service
        .update(&user_id, &key_id, changes)
        .await?;

    Ok(Json(ApiKeyResponse::from_api_key(&updated)))
}

/// Delete an API key the user owns
///
/// DELETE /api-keys/{id}
pub async fn delete_api_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<Json<SuccessResponse>, ApiError> {
    let key_id = parse_key_id(&id)?;
    let user_id = session_user_id(&jar)?;

    state.api_key_service.delete(&user_id, &key_id).await?;

    Ok(Json(SuccessResponse::ok()))
}
