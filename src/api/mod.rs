//! API handlers for the bookstore REST endpoints

pub mod books;
pub mod health;
pub mod openapi;
pub mod presenter;
pub mod relations;


use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, patch},
    Json, Router,
};
use serde::de::DeserializeOwned;

use crate::{error::AppError, models::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Authentication("Authentication credentials were not provided.".to_string())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Authentication("Invalid authorization header format.".to_string())
        })?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AppError::Authentication("Invalid token.".to_string())
        })?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body whose failures surface as `AppError`: syntax errors as a `detail`,
/// missing or mistyped fields keyed by the field path
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<serde_json::Value>::from_request(req, state).await?;
        let data = serde_path_to_error::deserialize(value)?;
        Ok(JsonBody(data))
    }
}

/// Path parameters; an id that does not parse is reported as 404
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct IdPath<T>(pub T);

/// Routes of the public API
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/books/", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id/",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/relations/:book_id/", patch(relations::update_relation))
        .with_state(state)
}
