//! Authentication endpoints: registration, login, current user

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        permission::Permission,
        profile::Role,
        user::{Register, User},
    },
};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub user: User,
}

/// Current user with role and effective permissions
#[derive(Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub user: User,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = Register,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(payload): Json<Register>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// Logout. The token scheme is stateless: clients discard the token.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Logged out")
    )
)]
pub async fn logout(AuthenticatedUser(principal): AuthenticatedUser) -> StatusCode {
    tracing::debug!("User '{}' logged out", principal.user.username);
    StatusCode::NO_CONTENT
}

/// Current user details, role, and effective permission set
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedUser(principal): AuthenticatedUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        role: principal.role,
        permissions: principal.permissions.to_vec(),
        user: principal.user,
    })
}
