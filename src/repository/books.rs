//! Book domain methods on Repository

use sqlx::{Postgres, QueryBuilder};

use super::{map_missing_reference, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{BookFilter, BookPayload, BookRow},
};

const BOOK_COLUMNS: &str =
    "b.id, b.name, b.price, b.author_name, b.discount, b.owner_id, u.username AS owner_username";

/// Escape LIKE wildcards so the search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the list query: price filter, search over name/author_name, ordering
fn search_query(filter: &BookFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM books b LEFT JOIN users u ON u.id = b.owner_id WHERE 1=1",
        BOOK_COLUMNS
    ));

    if let Some(price) = filter.price {
        builder.push(" AND b.price = ").push_bind(price);
    }

    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (b.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.author_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    builder.push(" ORDER BY ");
    for ordering in &filter.ordering {
        builder
            .push(ordering.field.column())
            .push(if ordering.descending { " DESC, " } else { " ASC, " });
    }
    // insertion order breaks ties
    builder.push("b.id ASC");

    builder
}

impl Repository {
    /// Search books with filters and ordering
    pub async fn books_search(&self, filter: &BookFilter) -> AppResult<Vec<BookRow>> {
        let mut query = search_query(filter);
        let rows = query
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get book by ID
    pub async fn books_get_by_id(&self, id: i32) -> AppResult<Option<BookRow>> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books b LEFT JOIN users u ON u.id = b.owner_id WHERE b.id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Create a book owned by `owner_id`
    pub async fn books_insert(&self, owner_id: i32, data: &BookPayload) -> AppResult<BookRow> {
        sqlx::query_as::<_, BookRow>(&format!(
            r#"
            WITH b AS (
                INSERT INTO books (name, price, author_name, discount, owner_id)
                VALUES ($1, $2, $3, COALESCE($4, 0), $5)
                RETURNING *
            )
            SELECT {} FROM b LEFT JOIN users u ON u.id = b.owner_id
            "#,
            BOOK_COLUMNS
        ))
        .bind(&data.name)
        .bind(data.price)
        .bind(&data.author_name)
        .bind(data.discount)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_missing_reference(e, "Owner"))
    }

    /// Replace name, price and author_name; discount only when supplied
    pub async fn books_replace(&self, id: i32, data: &BookPayload) -> AppResult<BookRow> {
        sqlx::query_as::<_, BookRow>(&format!(
            r#"
            WITH b AS (
                UPDATE books
                SET name = $1, price = $2, author_name = $3, discount = COALESCE($4, discount)
                WHERE id = $5
                RETURNING *
            )
            SELECT {} FROM b LEFT JOIN users u ON u.id = b.owner_id
            "#,
            BOOK_COLUMNS
        ))
        .bind(&data.name)
        .bind(data.price)
        .bind(&data.author_name)
        .bind(data.discount)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Delete a book and, through the foreign key, its relations
    pub async fn books_remove(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
