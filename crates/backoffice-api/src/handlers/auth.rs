//! Session handlers: login, registration, refresh, logout, password flows.

use axum::extract::State;
use axum::{Extension, Json};
use axum::http::{HeaderMap, StatusCode, header};

use backoffice_auth::session::RegisterInput;
use backoffice_entity::token::ClientMetadata;

use crate::dto::request::{
    ChangePasswordRequest, LoginRequest, PasswordResetRequest, RefreshRequest, RegisterRequest,
    ResetPasswordRequest, TokenRequest,
};
use crate::dto::response::{
    ApiResponse, Empty, LoginResponse, MessageResponse, RefreshResponse, RegisterResponse,
    ResetRequestResponse, TokenUser, UserResponse, ValidateResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::middleware::guard::ClientAddr;
use crate::state::AppState;

const TOKEN_TYPE: &str = "Bearer";
const RESET_REQUESTED: &str = "If the email is registered, a reset link has been sent";

fn client_metadata(headers: &HeaderMap, addr: ClientAddr) -> ClientMetadata {
    ClientMetadata {
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        ip_address: addr.0,
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Extension(addr): Extension<ClientAddr>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state
        .sessions
        .login(
            &req.email,
            &req.password,
            req.remember_me,
            &client_metadata(&headers, addr),
        )
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        access_token: result.access.token,
        refresh_token: result.refresh.token,
        expires_in: result.refresh.expires_in,
        access_expires_in: result.access.expires_in,
        token_type: TOKEN_TYPE,
        user: result.user,
    })))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let result = state
        .sessions
        .register(RegisterInput {
            email: req.email,
            password: req.password,
            name: req.name,
            role: req.role,
        })
        .await?;

    let verification_token = state
        .is_development()
        .then_some(result.verification_token);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(RegisterResponse {
            user: result.user,
            verification_token,
        })),
    ))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let outcome = state.sessions.refresh(&req.refresh_token).await?;

    Ok(Json(ApiResponse::ok(RefreshResponse {
        access_token: outcome.access.token,
        token_type: TOKEN_TYPE,
        expires_in: outcome.access.expires_in,
        refresh_token: outcome.rotated.map(|r| r.token),
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.sessions.logout(auth.user_id()).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.sessions.me(auth.user_id()).await?;
    Ok(Json(ApiResponse::ok(UserResponse { user })))
}

/// POST /api/auth/password/reset-request
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PasswordResetRequest>,
) -> Result<Json<ApiResponse<ResetRequestResponse>>, ApiError> {
    let token = state.sessions.request_password_reset(&req.email).await?;

    Ok(Json(ApiResponse::ok(ResetRequestResponse {
        message: RESET_REQUESTED.to_string(),
        reset_token: token.filter(|_| state.is_development()),
    })))
}

/// POST /api/auth/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .sessions
        .reset_password(&req.token, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::empty()))
}

/// POST /api/auth/password/change
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .sessions
        .change_password(auth.user_id(), &req.current_password, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::empty()))
}

/// POST /api/auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TokenRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.sessions.verify_email(&req.token).await?;
    Ok(Json(ApiResponse::empty()))
}

/// POST /api/auth/validate
pub async fn validate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TokenRequest>,
) -> Json<ApiResponse<ValidateResponse>> {
    let result = state.sessions.validate(&req.token);
    Json(ApiResponse::ok(ValidateResponse {
        valid: result.valid,
        user: result.claims.map(TokenUser::from),
        reason: result.reason,
    }))
}
