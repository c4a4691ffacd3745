//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, presenter, relations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstore API",
        version = "1.0.0",
        description = "Book catalog REST API with ratings, likes and bookmarks"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Relations
        relations::update_relation,
    ),
    components(
        schemas(
            presenter::BookView,
            crate::models::book::BookPayload,
            crate::models::book::BookQuery,
            crate::models::user::Reader,
            crate::models::relation::RelationPatch,
            crate::models::relation::RelationView,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "relations", description = "Likes, bookmarks and ratings")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_book_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/books/"));
        assert!(doc.paths.paths.contains_key("/books/{id}/"));
        assert!(doc.paths.paths.contains_key("/relations/{book_id}/"));
    }
}
