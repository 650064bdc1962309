//! Library endpoints: read-only listing and detail

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::library::{LibraryDetails, LibraryShort},
};

/// List all libraries with book counts
#[utoipa::path(
    get,
    path = "/libraries",
    tag = "libraries",
    responses(
        (status = 200, description = "List of libraries", body = [LibraryShort])
    )
)]
pub async fn list_libraries(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<LibraryShort>>> {
    let libraries = state.services.catalog.list_libraries().await?;
    Ok(Json(libraries))
}

/// Get a library with its books and librarian
#[utoipa::path(
    get,
    path = "/libraries/{id}",
    tag = "libraries",
    params(
        ("id" = i32, Path, description = "Library ID")
    ),
    responses(
        (status = 200, description = "Library details", body = LibraryDetails),
        (status = 404, description = "Library not found")
    )
)]
pub async fn get_library(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LibraryDetails>> {
    let library = state.services.catalog.get_library(id).await?;
    Ok(Json(library))
}
