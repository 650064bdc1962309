//! User administration endpoints (Admin role required)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        permission::{GrantPermission, Permission},
        profile::{Profile, Role, UpdateRole},
        user::{UpdateUser, User, UserQuery, UserShort},
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List users with search and pagination
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("name" = Option<String>, Query, description = "Search by username or name"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<UserShort>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<UserShort>>> {
    principal.require_role(Role::Admin)?;

    let (users, total) = state.services.users.search_users(&query).await?;

    Ok(Json(PaginatedResponse {
        items: users,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    principal.require_role(Role::Admin)?;

    let user = state.services.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Update an existing user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    principal.require_role(Role::Admin)?;

    let updated = state.services.users.update_user(id, payload).await?;
    Ok(Json(updated))
}

/// Delete a user permanently. The profile cascades.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    principal.require_role(Role::Admin)?;

    state.services.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reassign a user's role
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Role updated", body = Profile),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRole>,
) -> AppResult<Json<Profile>> {
    principal.require_role(Role::Admin)?;

    let profile = state.services.users.set_role(id, payload.role).await?;
    Ok(Json(profile))
}

/// Grant a permission directly to a user
#[utoipa::path(
    post,
    path = "/users/{id}/permissions",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = GrantPermission,
    responses(
        (status = 204, description = "Permission granted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn grant_permission(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<GrantPermission>,
) -> AppResult<StatusCode> {
    principal.require_role(Role::Admin)?;

    state
        .services
        .access
        .grant_to_user(id, payload.permission)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Revoke a direct permission from a user. Group grants are unaffected.
#[utoipa::path(
    delete,
    path = "/users/{id}/permissions/{permission}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        ("permission" = String, Path, description = "Permission slug, e.g. book.edit")
    ),
    responses(
        (status = 204, description = "Permission revoked"),
        (status = 400, description = "Unknown permission slug"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "No such direct grant")
    )
)]
pub async fn revoke_permission(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path((id, permission)): Path<(i32, String)>,
) -> AppResult<StatusCode> {
    principal.require_role(Role::Admin)?;

    let permission: Permission = permission
        .parse()
        .map_err(crate::error::AppError::Validation)?;

    state
        .services
        .access
        .revoke_from_user(id, permission)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
