//! Like / bookmark / rating service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{RelationPatch, RelationView, UserClaims},
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct RelationService {
    store: Arc<dyn CatalogStore>,
}

impl RelationService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Partially update the requester's relation to a book, creating it on first use.
    /// The body is validated before anything is written.
    pub async fn patch(
        &self,
        claims: &UserClaims,
        book_id: i32,
        patch: RelationPatch,
    ) -> AppResult<RelationView> {
        let changes = patch.into_changes()?;

        if self.store.books_get(book_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Book {} not found", book_id)));
        }

        let relation = self
            .store
            .relations_upsert(claims.user_id, book_id, &changes)
            .await?;
        tracing::info!("User {} updated relation to book {}", claims.user_id, book_id);

        Ok(relation.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{BookRow, Relation},
        repository::MockCatalogStore,
    };
    use rust_decimal::Decimal;
    use serde_json::json;

    fn book(id: i32) -> BookRow {
        BookRow {
            id,
            name: "Test book".to_string(),
            price: Decimal::new(25, 0),
            author_name: "Author".to_string(),
            discount: 0,
            owner_id: None,
            owner_username: None,
        }
    }

    fn patch(body: serde_json::Value) -> RelationPatch {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_first_patch_creates_relation() {
        let mut store = MockCatalogStore::new();
        store.expect_books_get().returning(|id| Ok(Some(book(id))));
        store
            .expect_relations_upsert()
            .withf(|user_id, book_id, changes| {
                *user_id == 3 && *book_id == 8 && changes.like == Some(true) && changes.rate.is_none()
            })
            .times(1)
            .returning(|user_id, book_id, changes| {
                let mut relation = Relation::new(user_id, book_id);
                changes.apply(&mut relation);
                Ok(relation)
            });

        let service = RelationService::new(Arc::new(store));
        let claims = UserClaims::new(3, "reader", false, 1);
        let view = service
            .patch(&claims, 8, patch(json!({"like": true})))
            .await
            .unwrap();

        assert_eq!(
            view,
            RelationView {
                book: 8,
                like: true,
                in_bookmarks: false,
                rate: None
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_rate_writes_nothing() {
        let mut store = MockCatalogStore::new();
        store.expect_books_get().never();
        store.expect_relations_upsert().never();

        let service = RelationService::new(Arc::new(store));
        let claims = UserClaims::new(3, "reader", false, 1);
        let result = service.patch(&claims, 8, patch(json!({"rate": 6}))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_book() {
        let mut store = MockCatalogStore::new();
        store.expect_books_get().returning(|_| Ok(None));
        store.expect_relations_upsert().never();

        let service = RelationService::new(Arc::new(store));
        let claims = UserClaims::new(3, "reader", false, 1);
        let result = service.patch(&claims, 404, patch(json!({"like": true}))).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
