//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Book Catalog Server",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::logout,
        // Books
        books::create_form,
        books::create_book,
        books::list_books,
        books::edit_form,
        books::update_book,
        books::delete_confirm,
        books::delete_book,
        books::book_detail,
        // Authors
        authors::list_authors,
        authors::create_author,
        authors::delete_author,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            auth::LogoutResponse,
            crate::models::user::RegisterUser,
            crate::models::user::Permission,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookStatus,
            crate::models::book::StatusChoice,
            books::BookFormContext,
            books::BookListResponse,
            books::DeleteResponse,
            // Authors
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
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
        (name = "authors", description = "Author maintenance")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
