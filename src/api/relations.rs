//! Like / bookmark / rating endpoint

use axum::{
    extract::State,
    Json,
};

use crate::{
    error::AppResult,
    models::{RelationPatch, RelationView},
    AppState,
};

use super::{AuthenticatedUser, IdPath, JsonBody};

/// Update the requester's like, bookmark or rate for a book
#[utoipa::path(
    patch,
    path = "/relations/{book_id}/",
    tag = "relations",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    request_body = RelationPatch,
    responses(
        (status = 200, description = "Relation updated", body = RelationView),
        (status = 400, description = "Invalid choice for rate"),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_relation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    IdPath(book_id): IdPath<i32>,
    JsonBody(patch): JsonBody<RelationPatch>,
) -> AppResult<Json<RelationView>> {
    let relation = state
        .services
        .relations
        .patch(&claims, book_id, patch)
        .await?;
    Ok(Json(relation))
}
