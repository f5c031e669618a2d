//! API key management handlers.
//!
//! Every route except `/permissions` and `/me` requires `api_keys:manage`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use backoffice_auth::api_key::PermissionsCatalog;
use backoffice_core::error::{AppError, codes};
use backoffice_entity::api_key::{ApiKeyType, ApiKeyView};
use backoffice_entity::permission::Permission;

use crate::dto::request::CreateApiKeyRequest;
use crate::dto::response::{
    ApiKeyListResponse, ApiKeyResponse, ApiKeyStatsResponse, ApiResponse, CreatedApiKeyResponse,
    Empty,
};
use crate::error::ApiError;
use crate::extractors::{ApiKeyPrincipal, CurrentIdentity, ValidatedJson};
use crate::state::AppState;

const SHOWN_ONCE: &str = "Store this key securely. It will not be shown again.";

/// GET /api/api-keys/permissions
pub async fn permissions(State(state): State<AppState>) -> Json<ApiResponse<PermissionsCatalog>> {
    Json(ApiResponse::ok(state.api_keys.permissions_catalog()))
}

/// GET /api/api-keys
pub async fn list(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<ApiResponse<ApiKeyListResponse>>, ApiError> {
    state
        .enforcer
        .require_permission(&identity, Permission::ApiKeysManage)?;

    let api_keys: Vec<ApiKeyView> = state
        .api_keys
        .list_api_keys()
        .await?
        .iter()
        .map(|k| k.view())
        .collect();

    Ok(Json(ApiResponse::ok(ApiKeyListResponse {
        count: api_keys.len(),
        api_keys,
    })))
}

/// POST /api/api-keys
pub async fn create(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    ValidatedJson(req): ValidatedJson<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedApiKeyResponse>>), ApiError> {
    state
        .enforcer
        .require_permission(&identity, Permission::ApiKeysManage)?;

    let description = req.description.as_deref();
    let created = match (req.permissions.as_deref(), req.key_type.as_deref()) {
        (Some(permissions), None | Some("custom")) => {
            state
                .api_keys
                .create_custom_api_key(&req.name, permissions, description)
                .await?
        }
        (None, Some(raw)) => {
            let key_type = raw.parse::<ApiKeyType>().map_err(|_| {
                AppError::validation(format!("Unknown API key type '{raw}'"))
                    .with_code(codes::INVALID_PERMISSIONS)
                    .with_details(serde_json::json!({
                        "valid": ApiKeyType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
                    }))
            })?;
            state
                .api_keys
                .create_api_key(key_type, &req.name, description)
                .await?
        }
        (Some(_), Some(_)) => {
            return Err(AppError::validation(
                "Give either a preset type or an explicit permission list, not both",
            )
            .into());
        }
        (None, None) => {
            return Err(AppError::validation(
                "Either a preset type or a permission list is required",
            )
            .into());
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CreatedApiKeyResponse {
            key: created.secret,
            api_key: created.key.view(),
            warning: SHOWN_ONCE,
        })),
    ))
}

/// GET /api/api-keys/stats
pub async fn stats(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<ApiResponse<ApiKeyStatsResponse>>, ApiError> {
    state
        .enforcer
        .require_permission(&identity, Permission::ApiKeysManage)?;
    let stats = state.api_keys.get_stats().await?;
    Ok(Json(ApiResponse::ok(ApiKeyStatsResponse { stats })))
}

/// PATCH /api/api-keys/{key}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .enforcer
        .require_permission(&identity, Permission::ApiKeysManage)?;
    if !state.api_keys.deactivate_api_key(&key).await? {
        return Err(key_not_found());
    }
    Ok(Json(ApiResponse::empty()))
}

/// PATCH /api/api-keys/{key}/activate
pub async fn activate(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .enforcer
        .require_permission(&identity, Permission::ApiKeysManage)?;
    if !state.api_keys.activate_api_key(&key).await? {
        return Err(key_not_found());
    }
    Ok(Json(ApiResponse::empty()))
}

/// GET /api/api-keys/me
pub async fn me(ApiKeyPrincipal(key): ApiKeyPrincipal) -> Json<ApiResponse<ApiKeyResponse>> {
    Json(ApiResponse::ok(ApiKeyResponse {
        api_key: key.view(),
    }))
}

fn key_not_found() -> ApiError {
    AppError::not_found("API key not found")
        .with_code(codes::API_KEY_NOT_FOUND)
        .into()
}
