//! User/book relation methods on Repository

use super::{map_missing_reference, Repository};
use crate::{
    error::AppResult,
    models::{ReaderRelation, Relation, RelationChanges},
};

impl Repository {
    /// Relations for a set of books joined with the reader's name
    pub async fn relations_with_readers(&self, book_ids: &[i32]) -> AppResult<Vec<ReaderRelation>> {
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ReaderRelation>(
            r#"
            SELECT r.book_id, r.user_id, u.first_name, u.last_name,
                   r.liked, r.in_bookmarks, r.rate
            FROM user_book_relations r
            JOIN users u ON u.id = r.user_id
            WHERE r.book_id = ANY($1)
            ORDER BY r.id
            "#,
        )
        .bind(book_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Locate or create the relation for (user, book) and overwrite the supplied fields.
    ///
    /// The insert is a no-op when the row exists; the row is then locked so concurrent
    /// updates from the same user apply one after the other.
    pub async fn relations_get_or_create_and_merge(
        &self,
        user_id: i32,
        book_id: i32,
        changes: &RelationChanges,
    ) -> AppResult<Relation> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO user_book_relations (user_id, book_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, book_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_missing_reference(e, "Book or user"))?;

        let mut relation = sqlx::query_as::<_, Relation>(
            r#"
            SELECT user_id, book_id, liked, in_bookmarks, rate
            FROM user_book_relations
            WHERE user_id = $1 AND book_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        changes.apply(&mut relation);

        sqlx::query(
            r#"
            UPDATE user_book_relations
            SET liked = $3, in_bookmarks = $4, rate = $5
            WHERE user_id = $1 AND book_id = $2
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(relation.like)
        .bind(relation.in_bookmarks)
        .bind(relation.rate)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            "Relation user={} book={} now like={} in_bookmarks={} rate={:?}",
            user_id,
            book_id,
            relation.like,
            relation.in_bookmarks,
            relation.rate
        );

        Ok(relation)
    }
}
