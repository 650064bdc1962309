//! Role-gated dashboard endpoints
//!
//! Each dashboard is reachable only with the matching profile role. The
//! fine-grained permission layer plays no part here.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{library::LibraryShort, profile::Role},
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct AdminDashboard {
    pub users: i64,
    pub books: i64,
    pub groups: i64,
}

#[derive(Serialize, ToSchema)]
pub struct LibrarianDashboard {
    pub libraries: Vec<LibraryShort>,
    pub books: i64,
}

#[derive(Serialize, ToSchema)]
pub struct MemberDashboard {
    pub username: String,
    pub books_available: i64,
}

/// Admin dashboard: site-wide counts
#[utoipa::path(
    get,
    path = "/dashboard/admin",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Admin dashboard", body = AdminDashboard),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn admin_dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<AdminDashboard>> {
    principal.require_role(Role::Admin)?;

    let services = &state.services;
    Ok(Json(AdminDashboard {
        users: services.users.count_users().await?,
        books: services.catalog.count_books().await?,
        groups: services.access.count_groups().await?,
    }))
}

/// Librarian dashboard: libraries under management
#[utoipa::path(
    get,
    path = "/dashboard/librarian",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Librarian dashboard", body = LibrarianDashboard),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn librarian_dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<LibrarianDashboard>> {
    principal.require_role(Role::Librarian)?;

    Ok(Json(LibrarianDashboard {
        libraries: state.services.catalog.list_libraries().await?,
        books: state.services.catalog.count_books().await?,
    }))
}

/// Member dashboard: the member's view of the catalog
#[utoipa::path(
    get,
    path = "/dashboard/member",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Member dashboard", body = MemberDashboard),
        (status = 403, description = "Member role required")
    )
)]
pub async fn member_dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<MemberDashboard>> {
    principal.require_role(Role::Member)?;

    Ok(Json(MemberDashboard {
        username: principal.user.username,
        books_available: state.services.catalog.count_books().await?,
    }))
}
