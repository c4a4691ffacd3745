//! Business logic services

pub mod annotation;
pub mod books;
pub mod relations;

use std::sync::Arc;

use crate::repository::CatalogStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BookService,
    pub relations: relations::RelationService,
    store: Arc<dyn CatalogStore>,
}

impl Services {
    /// Create all services on top of the given store
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            books: books::BookService::new(store.clone()),
            relations: relations::RelationService::new(store.clone()),
            store,
        }
    }

    /// Whether the backing database answers
    pub async fn is_ready(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Readiness check failed: {}", e);
                false
            }
        }
    }
}
