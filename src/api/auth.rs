//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::user::{PermissionSet, RegisterUser},
};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub user: UserInfo,
}

#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub login: String,
    /// Effective permission codes, the union over group memberships
    #[schema(value_type = Vec<String>)]
    pub permissions: PermissionSet,
}

#[derive(Serialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

/// Authenticate and receive a bearer token
#[utoipa::path(
    post,
    path = "/bookshelf/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user, permissions) = state
        .services
        .users
        .authenticate(&payload.login, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user: UserInfo {
            id: user.id,
            login: user.login,
            permissions,
        },
    }))
}

/// Register a new account (no group memberships)
#[utoipa::path(
    post,
    path = "/bookshelf/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = UserInfo),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Login already taken", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(payload): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.users.register(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserInfo {
            id: user.id,
            login: user.login,
            permissions: PermissionSet::new(),
        }),
    ))
}

/// End the session. Tokens are stateless, so this only acknowledges.
#[utoipa::path(
    post,
    path = "/bookshelf/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 303, description = "Not authenticated")
    )
)]
pub async fn logout(AuthenticatedUser(_claims): AuthenticatedUser) -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: "Logged out".to_string(),
    })
}
