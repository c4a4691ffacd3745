//! Book endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{BookFilter, BookPayload, BookQuery},
    AppState,
};

use super::{presenter::BookView, AuthenticatedUser, IdPath, JsonBody};

/// List books with filtering, search and ordering
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<BookView>),
        (status = 400, description = "Invalid filter value")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<BookView>>> {
    let filter = BookFilter::try_from(query)?;
    let books = state.services.books.list(&filter).await?;
    Ok(Json(books.into_iter().map(BookView::from).collect()))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}/",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookView),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> AppResult<Json<BookView>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book.into()))
}

/// Create a new book owned by the requester
#[utoipa::path(
    post,
    path = "/books/",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookView),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    JsonBody(data): JsonBody<BookPayload>,
) -> AppResult<(StatusCode, Json<BookView>)> {
    let created = state.services.books.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Replace a book's name, price and author
#[utoipa::path(
    put,
    path = "/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookView),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Neither owner nor staff", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    IdPath(id): IdPath<i32>,
    JsonBody(data): JsonBody<BookPayload>,
) -> AppResult<Json<BookView>> {
    let updated = state.services.books.update(&claims, id, data).await?;
    Ok(Json(updated.into()))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Neither owner nor staff", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    IdPath(id): IdPath<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
