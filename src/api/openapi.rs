//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Personal book catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::authenticate,
        auth::google_signin,
        auth::signout,
        auth::current_session,
        // Books
        books::list_books,
        books::create_book,
        books::delete_book,
    ),
    components(
        schemas(
            // Auth
            auth::AuthAction,
            auth::AuthRequest,
            auth::AuthResponse,
            auth::GoogleSigninRequest,
            auth::SessionResponse,
            crate::models::user::Identity,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            // Common
            crate::api::OkResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and session endpoints"),
        (name = "books", description = "Owner-scoped book catalog")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
