//! Book catalog service

use std::sync::Arc;

use validator::Validate;

use super::annotation::annotate;
use crate::{
    error::{AppError, AppResult},
    models::{AnnotatedBook, BookFilter, BookPayload, BookRow, UserClaims},
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn CatalogStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Load relations for `rows` in one query and attach aggregates
    async fn annotate_rows(&self, rows: Vec<BookRow>) -> AppResult<Vec<AnnotatedBook>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = rows.iter().map(|b| b.id).collect();
        let relations = self.store.relations_for_books(&ids).await?;
        Ok(annotate(rows, relations))
    }

    async fn find_row(&self, id: i32) -> AppResult<BookRow> {
        self.store
            .books_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// List books matching `filter`
    pub async fn list(&self, filter: &BookFilter) -> AppResult<Vec<AnnotatedBook>> {
        let rows = self.store.books_list(filter).await?;
        tracing::debug!("Book list matched {} rows", rows.len());
        self.annotate_rows(rows).await
    }

    /// Get one annotated book
    pub async fn get(&self, id: i32) -> AppResult<AnnotatedBook> {
        let row = self.find_row(id).await?;
        self.annotate_rows(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Annotation dropped book {}", id)))
    }

    /// Create a book owned by the requester
    pub async fn create(&self, claims: &UserClaims, data: BookPayload) -> AppResult<AnnotatedBook> {
        data.validate()?;

        let row = self.store.books_create(claims.user_id, &data).await?;
        tracing::info!("Book {} created by user {}", row.id, claims.user_id);

        // a new book has no relations yet
        annotate(vec![row], Vec::new())
            .pop()
            .ok_or_else(|| AppError::Internal("Annotation dropped new book".to_string()))
    }

    /// Replace a book; owner or staff only
    pub async fn update(
        &self,
        claims: &UserClaims,
        id: i32,
        data: BookPayload,
    ) -> AppResult<AnnotatedBook> {
        let existing = self.find_row(id).await?;
        claims.require_owner_or_staff(existing.owner_id)?;
        data.validate()?;

        let row = self.store.books_update(id, &data).await?;
        tracing::info!("Book {} updated by user {}", id, claims.user_id);

        self.annotate_rows(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Annotation dropped book {}", id)))
    }

    /// Delete a book; owner or staff only
    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        let existing = self.find_row(id).await?;
        claims.require_owner_or_staff(existing.owner_id)?;

        self.store.books_delete(id).await?;
        tracing::info!("Book {} deleted by user {}", id, claims.user_id);
        Ok(())
    }
}
