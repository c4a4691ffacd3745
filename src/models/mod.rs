//! Data models for the bookstore

pub mod book;
pub mod relation;
pub mod user;

// Re-export commonly used types
pub use book::{AnnotatedBook, BookFilter, BookPayload, BookQuery, BookRow};
pub use relation::{Relation, RelationChanges, RelationPatch, RelationView, ReaderRelation};
pub use user::{Reader, UserClaims};
