//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, dashboards, groups, health, libraries, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Library Catalog Server REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::delete_author,
        // Libraries
        libraries::list_libraries,
        libraries::get_library,
        // Dashboards
        dashboards::admin_dashboard,
        dashboards::librarian_dashboard,
        dashboards::member_dashboard,
        // Users
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::update_role,
        users::grant_permission,
        users::revoke_permission,
        // Groups
        groups::list_groups,
        groups::add_member,
        groups::remove_member,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::CurrentUserResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::UserQuery,
            crate::models::user::Register,
            crate::models::user::UpdateUser,
            // Profiles
            crate::models::profile::Role,
            crate::models::profile::Profile,
            crate::models::profile::UpdateRole,
            // Permissions
            crate::models::permission::Permission,
            crate::models::permission::Group,
            crate::models::permission::GroupDetails,
            crate::models::permission::AddGroupMember,
            crate::models::permission::GrantPermission,
            // Catalog
            crate::models::book::Book,
            crate::models::book::BookQuery,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::author::Author,
            crate::models::author::AuthorWithBookCount,
            crate::models::author::CreateAuthor,
            crate::models::library::Library,
            crate::models::library::LibraryShort,
            crate::models::library::Librarian,
            crate::models::library::LibraryDetails,
            // Dashboards
            dashboards::AdminDashboard,
            dashboards::LibrarianDashboard,
            dashboards::MemberDashboard,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "authors", description = "Author catalog"),
        (name = "libraries", description = "Library listings"),
        (name = "dashboards", description = "Role-gated dashboards"),
        (name = "users", description = "User administration"),
        (name = "groups", description = "Permission group administration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
