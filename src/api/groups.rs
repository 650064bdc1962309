//! Group administration endpoints (Admin role required)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        permission::{AddGroupMember, GroupDetails},
        profile::Role,
    },
};

use super::AuthenticatedUser;

/// List all groups with their grants and member counts
#[utoipa::path(
    get,
    path = "/groups",
    tag = "groups",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of groups", body = [GroupDetails]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_groups(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<GroupDetails>>> {
    principal.require_role(Role::Admin)?;

    let groups = state.services.access.list_groups().await?;
    Ok(Json(groups))
}

/// Add a user to a group
#[utoipa::path(
    post,
    path = "/groups/{id}/members",
    tag = "groups",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Group ID")
    ),
    request_body = AddGroupMember,
    responses(
        (status = 204, description = "Member added"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Group or user not found"),
        (status = 409, description = "User already a member")
    )
)]
pub async fn add_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<AddGroupMember>,
) -> AppResult<StatusCode> {
    principal.require_role(Role::Admin)?;

    state
        .services
        .access
        .add_group_member(id, payload.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a user from a group
#[utoipa::path(
    delete,
    path = "/groups/{id}/members/{user_id}",
    tag = "groups",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Group ID"),
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Not a member")
    )
)]
pub async fn remove_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path((id, user_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    principal.require_role(Role::Admin)?;

    state.services.access.remove_group_member(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
