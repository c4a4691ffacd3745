//! Repository layer for database operations

pub mod books;
pub mod relations;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{BookFilter, BookPayload, BookRow, ReaderRelation, Relation, RelationChanges},
};

/// Storage operations the services depend on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Check database connectivity
    async fn ping(&self) -> AppResult<()>;

    /// Filtered and ordered book rows
    async fn books_list(&self, filter: &BookFilter) -> AppResult<Vec<BookRow>>;

    async fn books_get(&self, id: i32) -> AppResult<Option<BookRow>>;

    async fn books_create(&self, owner_id: i32, data: &BookPayload) -> AppResult<BookRow>;

    async fn books_update(&self, id: i32, data: &BookPayload) -> AppResult<BookRow>;

    async fn books_delete(&self, id: i32) -> AppResult<()>;

    /// All relation rows for the given books, with reader names, in insertion order
    async fn relations_for_books(&self, book_ids: &[i32]) -> AppResult<Vec<ReaderRelation>>;

    /// Get-or-create the (user, book) relation, then merge `changes` into it
    async fn relations_upsert(
        &self,
        user_id: i32,
        book_id: i32,
        changes: &RelationChanges,
    ) -> AppResult<Relation>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Turn a foreign key violation into a not-found error for `entity`
fn map_missing_reference(e: sqlx::Error, entity: &str) -> AppError {
    let is_fk_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23503");
    if is_fk_violation {
        AppError::NotFound(format!("{} does not exist", entity))
    } else {
        AppError::Database(e)
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn books_list(&self, filter: &BookFilter) -> AppResult<Vec<BookRow>> {
        self.books_search(filter).await
    }

    async fn books_get(&self, id: i32) -> AppResult<Option<BookRow>> {
        self.books_get_by_id(id).await
    }

    async fn books_create(&self, owner_id: i32, data: &BookPayload) -> AppResult<BookRow> {
        self.books_insert(owner_id, data).await
    }

    async fn books_update(&self, id: i32, data: &BookPayload) -> AppResult<BookRow> {
        self.books_replace(id, data).await
    }

    async fn books_delete(&self, id: i32) -> AppResult<()> {
        self.books_remove(id).await
    }

    async fn relations_for_books(&self, book_ids: &[i32]) -> AppResult<Vec<ReaderRelation>> {
        self.relations_with_readers(book_ids).await
    }

    async fn relations_upsert(
        &self,
        user_id: i32,
        book_id: i32,
        changes: &RelationChanges,
    ) -> AppResult<Relation> {
        self.relations_get_or_create_and_merge(user_id, book_id, changes)
            .await
    }
}
